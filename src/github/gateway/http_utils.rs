//! Shared HTTP helpers for the GraphQL gateway.

use http::header::HeaderValue;
use serde::Deserialize;

pub(super) fn header_to_string(header_value: Option<&HeaderValue>) -> Option<String> {
    header_value
        .and_then(|raw| raw.to_str().ok())
        .map(ToOwned::to_owned)
}

pub(super) fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

/// Envelope of every GraphQL response.
#[derive(Debug, Deserialize)]
pub(super) struct GraphQlEnvelope {
    #[serde(default)]
    pub(super) data: Option<serde_json::Value>,
    #[serde(default)]
    pub(super) errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlErrorEntry {
    #[serde(default)]
    pub(super) message: String,
    #[serde(rename = "type", default)]
    pub(super) kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{GraphQlEnvelope, extract_github_message};

    #[rstest]
    #[case::message(r#"{"message":"Bad credentials"}"#, Some("Bad credentials"))]
    #[case::no_message(r#"{"errors":[]}"#, None)]
    #[case::not_json("<html>", None)]
    fn extracts_rest_style_message(#[case] body: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_github_message(body).as_deref(), expected);
    }

    #[rstest]
    fn envelope_decodes_typed_errors() {
        let envelope: GraphQlEnvelope = serde_json::from_str(
            r#"{"data":null,"errors":[{"type":"RATE_LIMITED","message":"slow down"}]}"#,
        )
        .expect("envelope should decode");

        assert!(envelope.data.is_none());
        let first = envelope.errors.first().expect("one error");
        assert_eq!(first.kind.as_deref(), Some("RATE_LIMITED"));
        assert_eq!(first.message, "slow down");
    }
}
