//! Octocrab client construction for the GraphQL gateway.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::BoardError;
use crate::github::locator::{GraphQlEndpoint, PersonalAccessToken};

use super::error_mapping::map_octocrab_error;

/// Builds an Octocrab client authenticated with `token` and rooted at the
/// endpoint's origin.
///
/// # Errors
///
/// Returns `BoardError::InvalidUrl` when the origin cannot be parsed as a URI
/// or `BoardError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: &PersonalAccessToken,
    endpoint: &GraphQlEndpoint,
) -> Result<Octocrab, BoardError> {
    let base_uri: Uri = endpoint
        .origin()
        .as_str()
        .parse::<Uri>()
        .map_err(|error| BoardError::InvalidUrl(error.to_string()))?;

    Octocrab::builder()
        .personal_token(token.as_ref())
        .base_uri(base_uri)
        .map_err(|error| BoardError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}
