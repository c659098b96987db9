//! Error mapping helpers for the Octocrab GraphQL gateway.

use std::time::Duration;

use http::StatusCode;

use crate::github::error::BoardError;

use super::http_utils::GraphQlErrorEntry;

/// GraphQL error type GitHub uses for point-budget exhaustion.
const RATE_LIMITED_TYPE: &str = "RATE_LIMITED";

/// Checks if a GitHub error status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks if an octocrab error represents a network/transport issue.
pub(super) const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

/// Checks whether a status and message describe throttling.
///
/// 429 always does. A 403 does when GitHub mentions a rate limit, which is how
/// the secondary mutation limit is reported.
pub(super) fn is_rate_limit_response(status: StatusCode, message: &str) -> bool {
    match status {
        StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::FORBIDDEN => message.to_lowercase().contains("rate limit"),
        _ => false,
    }
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> BoardError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return map_http_error(operation, source.status_code, None, Some(source.message.clone()));
    }

    if is_network_error(error) {
        return BoardError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    BoardError::Api {
        message: format!("{operation} failed: {error}"),
    }
}

pub(super) fn map_http_error(
    operation: &str,
    status: StatusCode,
    retry_after: Option<Duration>,
    maybe_message: Option<String>,
) -> BoardError {
    let message = maybe_message.unwrap_or_else(|| "unknown error".to_owned());
    if is_rate_limit_response(status, &message) {
        BoardError::RateLimited {
            retry_after,
            message: format!("{operation} failed: GitHub returned {status} {message}"),
        }
    } else if is_auth_failure(status) {
        BoardError::Authentication {
            message: format!("{operation} failed: GitHub returned {status} {message}"),
        }
    } else {
        BoardError::Api {
            message: format!("{operation} failed with status {status}: {message}"),
        }
    }
}

pub(super) fn map_graphql_errors(
    operation: &str,
    errors: &[GraphQlErrorEntry],
    retry_after: Option<Duration>,
) -> BoardError {
    let message = errors
        .iter()
        .map(|entry| entry.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    if errors
        .iter()
        .any(|entry| entry.kind.as_deref() == Some(RATE_LIMITED_TYPE))
    {
        BoardError::RateLimited {
            retry_after,
            message: format!("{operation} failed: {message}"),
        }
    } else {
        BoardError::GraphQl {
            message: format!("{operation} failed: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::StatusCode;
    use rstest::rstest;

    use super::{map_graphql_errors, map_http_error};
    use crate::github::error::BoardError;
    use crate::github::gateway::http_utils::GraphQlErrorEntry;

    #[rstest]
    #[case::too_many_requests(StatusCode::TOO_MANY_REQUESTS, "slow down")]
    #[case::secondary_limit(
        StatusCode::FORBIDDEN,
        "You have exceeded a secondary rate limit"
    )]
    fn maps_throttling_statuses_to_rate_limited(#[case] status: StatusCode, #[case] body: &str) {
        let error = map_http_error(
            "add item",
            status,
            Some(Duration::from_secs(7)),
            Some(body.to_owned()),
        );
        assert_eq!(error.retry_after(), Some(Duration::from_secs(7)));
        assert!(error.is_rate_limited(), "expected RateLimited, got {error:?}");
    }

    #[rstest]
    fn maps_plain_forbidden_to_authentication() {
        let error = map_http_error(
            "add item",
            StatusCode::FORBIDDEN,
            None,
            Some("Resource not accessible by integration".to_owned()),
        );
        assert!(
            matches!(error, BoardError::Authentication { .. }),
            "expected Authentication, got {error:?}"
        );
    }

    #[rstest]
    fn maps_server_errors_to_api() {
        let error = map_http_error("add item", StatusCode::BAD_GATEWAY, None, None);
        match error {
            BoardError::Api { message } => assert!(
                message.contains("502") && message.contains("unknown error"),
                "unexpected message: {message}"
            ),
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[rstest]
    fn graphql_errors_join_messages() {
        let errors = vec![
            GraphQlErrorEntry {
                message: "first".to_owned(),
                kind: Some("NOT_FOUND".to_owned()),
            },
            GraphQlErrorEntry {
                message: "second".to_owned(),
                kind: None,
            },
        ];
        let error = map_graphql_errors("list fields", &errors, None);
        assert_eq!(
            error,
            BoardError::GraphQl {
                message: "list fields failed: first; second".to_owned()
            }
        );
    }

    #[rstest]
    fn graphql_rate_limited_type_is_distinguished() {
        let errors = vec![GraphQlErrorEntry {
            message: "API rate limit exceeded".to_owned(),
            kind: Some("RATE_LIMITED".to_owned()),
        }];
        let error = map_graphql_errors("list items", &errors, None);
        assert!(error.is_rate_limited(), "expected RateLimited, got {error:?}");
    }
}
