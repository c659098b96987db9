//! Octocrab implementation of the GraphQL gateway.

use async_trait::async_trait;
use chrono::Utc;
use http::Uri;
use http::header::RETRY_AFTER;
use octocrab::Octocrab;
use serde_json::Value;

use crate::github::error::BoardError;
use crate::github::locator::{GraphQlEndpoint, PersonalAccessToken};
use crate::github::rate_limit::throttle_delay;

use super::client::build_octocrab_client;
use super::error_mapping::{map_graphql_errors, map_http_error, map_octocrab_error};
use super::http_utils::{GraphQlEnvelope, extract_github_message, header_to_string};
use super::{GraphQlGateway, GraphQlRequest};

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Octocrab-backed GraphQL gateway.
pub struct OctocrabGraphQlGateway {
    client: Octocrab,
    endpoint: GraphQlEndpoint,
}

impl OctocrabGraphQlGateway {
    /// Creates a new gateway from an Octocrab client already rooted at the
    /// endpoint's origin.
    #[must_use]
    pub const fn new(client: Octocrab, endpoint: GraphQlEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Builds an authenticated gateway for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::InvalidUrl` when the endpoint origin cannot be
    /// parsed or `BoardError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &PersonalAccessToken,
        endpoint: GraphQlEndpoint,
    ) -> Result<Self, BoardError> {
        let octocrab = build_octocrab_client(token, &endpoint)?;
        Ok(Self::new(octocrab, endpoint))
    }
}

#[async_trait]
impl GraphQlGateway for OctocrabGraphQlGateway {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value, BoardError> {
        let operation = request.operation;
        let uri: Uri = self
            .endpoint
            .path()
            .parse::<Uri>()
            .map_err(|error| BoardError::InvalidUrl(error.to_string()))?;

        let response = self
            .client
            ._post(uri, Some(request))
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;

        let status = response.status();
        let headers = response.headers();
        let retry_after = throttle_delay(
            header_to_string(headers.get(RETRY_AFTER)).as_deref(),
            header_to_string(headers.get(RATE_LIMIT_REMAINING)).as_deref(),
            header_to_string(headers.get(RATE_LIMIT_RESET)).as_deref(),
            Utc::now(),
        );

        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(|error| BoardError::Network {
                message: format!("{operation} response read failed: {error}"),
            })?;

        if !status.is_success() {
            let message = extract_github_message(&body)
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_owned()));
            return Err(map_http_error(operation, status, retry_after, message));
        }

        let envelope: GraphQlEnvelope =
            serde_json::from_str(&body).map_err(|error| BoardError::Decode {
                operation: operation.to_owned(),
                message: error.to_string(),
            })?;

        if !envelope.errors.is_empty() {
            return Err(map_graphql_errors(operation, &envelope.errors, retry_after));
        }

        Ok(envelope.data.unwrap_or(Value::Null))
    }
}
