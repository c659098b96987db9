//! Error types exposed by the GitHub board layer.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced while loading input or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// The provided URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// A repository reference was not in `owner/name` form.
    #[error("repository must be written as owner/name: {0:?}")]
    InvalidRepository(String),

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication HTTP error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// GitHub throttled the request.
    ///
    /// The engine never retries on its own; callers decide whether to back
    /// off and resume or abort.
    #[error("GitHub rate limit exceeded: {message}")]
    RateLimited {
        /// Delay GitHub asked for before the next attempt, if it sent one.
        retry_after: Option<Duration>,
        /// Error detail from GitHub.
        message: String,
    },

    /// The GraphQL response carried an `errors` array.
    #[error("GraphQL errors: {message}")]
    GraphQl {
        /// Messages joined with `; `.
        message: String,
    },

    /// The GraphQL response did not match the expected shape.
    #[error("unexpected GraphQL response for {operation}: {message}")]
    Decode {
        /// Operation whose response failed to decode.
        operation: String,
        /// Deserialisation failure detail.
        message: String,
    },

    /// The destination board could neither be found nor created.
    #[error("could not resolve board {title:?} for {owner}: {message}")]
    BoardResolution {
        /// Board owner login.
        owner: String,
        /// Board title.
        title: String,
        /// Underlying failure.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The run manifest could not be read or parsed.
    #[error("manifest error: {message}")]
    Manifest {
        /// Details about the manifest failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

impl BoardError {
    /// Returns true when the error is the distinguished rate-limit signal.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns the retry delay carried by a rate-limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
