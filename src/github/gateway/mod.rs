//! GraphQL gateway for the GitHub Projects V2 API.
//!
//! The board engine only ever talks to GitHub through [`GraphQlGateway`], so
//! tests can substitute a mock or an in-memory board while the Octocrab
//! implementation handles real HTTP requests.

mod client;
mod error_mapping;
mod graphql;
mod http_utils;

pub use graphql::OctocrabGraphQlGateway;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::github::error::BoardError;

/// A GraphQL query or mutation with its variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    /// Short operation label used in logs and error messages.
    #[serde(skip)]
    pub operation: &'static str,
    /// GraphQL document.
    pub query: &'static str,
    /// Variables object.
    pub variables: Value,
}

impl GraphQlRequest {
    /// Creates a request for `query` with `variables`.
    #[must_use]
    pub const fn new(operation: &'static str, query: &'static str, variables: Value) -> Self {
        Self {
            operation,
            query,
            variables,
        }
    }
}

/// Gateway that can execute GraphQL documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphQlGateway: Send + Sync {
    /// Execute the request and return its `data` object.
    ///
    /// Implementations map throttling to [`BoardError::RateLimited`] and a
    /// non-empty `errors` array to [`BoardError::GraphQl`].
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value, BoardError>;
}
