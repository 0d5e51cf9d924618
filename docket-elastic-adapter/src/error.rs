use docket::errors::{DocketError, ErrorKind, InfrastructureCause};
use thiserror::Error;

/// Error type `index_not_found_exception` the engine reports for a missing index.
pub const INDEX_NOT_FOUND: &str = "index_not_found_exception";

/// Failures of an exchange with the engine.
///
/// Kept inside the adapter and converted into a [DocketError] at the store
/// boundary, so repository callers only ever see Docket's error kinds.
#[derive(Error, Debug)]
pub enum ElasticError {
    /// The engine did not answer in time
    #[error("Request to {0} timed out")]
    Timeout(String),

    /// The engine could not be reached
    #[error("Could not reach the engine: {0}")]
    Connect(String),

    /// The request failed in transport
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The engine answered with a failure status
    #[error("Engine answered {status}: {reason}")]
    Status {
        status: u16,
        error_type: Option<String>,
        reason: String,
    },

    /// The engine's answer could not be understood
    #[error("Unexpected engine response: {0}")]
    Protocol(String),
}

impl ElasticError {
    /// Builds a status error from a failed response body.
    ///
    /// Understands both `{"error": {"type": .., "reason": ..}}` and the older
    /// `{"error": "reason"}` shapes; any other body becomes the reason verbatim.
    pub fn from_response(status: u16, body: &str) -> ElasticError {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
        let error = parsed.as_ref().and_then(|json| json.get("error"));

        let (error_type, reason) = match error {
            Some(serde_json::Value::Object(error)) => (
                error.get("type").and_then(|t| t.as_str()).map(str::to_string),
                error
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .unwrap_or(body)
                    .to_string(),
            ),
            Some(serde_json::Value::String(reason)) => (None, reason.clone()),
            _ => (None, body.to_string()),
        };

        ElasticError::Status {
            status,
            error_type,
            reason,
        }
    }

    /// Returns true for the engine's "no such index" answer.
    pub fn is_index_not_found(&self) -> bool {
        matches!(
            self,
            ElasticError::Status { status: 404, error_type: Some(error_type), .. }
                if error_type == INDEX_NOT_FOUND
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ElasticError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ElasticError {
    fn from(err: reqwest::Error) -> Self {
        let target = err
            .url()
            .map(|url| url.to_string())
            .unwrap_or_else(|| "engine".to_string());

        if err.is_timeout() {
            ElasticError::Timeout(target)
        } else if err.is_connect() {
            ElasticError::Connect(err.to_string())
        } else if err.is_decode() {
            ElasticError::Protocol(err.to_string())
        } else {
            ElasticError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ElasticError {
    fn from(err: serde_json::Error) -> Self {
        ElasticError::Protocol(err.to_string())
    }
}

impl From<ElasticError> for DocketError {
    fn from(err: ElasticError) -> Self {
        let kind = match &err {
            _ if err.is_index_not_found() => ErrorKind::CollectionAbsent,
            ElasticError::Timeout(_) => ErrorKind::InfrastructureError(InfrastructureCause::Timeout),
            ElasticError::Connect(_) | ElasticError::Request(_) => {
                ErrorKind::InfrastructureError(InfrastructureCause::Connection)
            }
            ElasticError::Status { status, .. } => {
                ErrorKind::InfrastructureError(InfrastructureCause::Status(*status))
            }
            ElasticError::Protocol(_) => ErrorKind::InfrastructureError(InfrastructureCause::Protocol),
        };
        DocketError::new(&err.to_string(), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_structured_error_body() {
        let body = r#"{"error":{"root_cause":[],"type":"index_not_found_exception","reason":"no such index [courses]","index":"courses"},"status":404}"#;
        let err = ElasticError::from_response(404, body);
        assert!(err.is_index_not_found());
        assert_eq!(err.to_string(), "Engine answered 404: no such index [courses]");
    }

    #[test]
    fn parses_legacy_and_plain_bodies() {
        let err = ElasticError::from_response(500, r#"{"error":"boom"}"#);
        assert_eq!(err.to_string(), "Engine answered 500: boom");
        let err = ElasticError::from_response(502, "Bad Gateway");
        assert_eq!(err.to_string(), "Engine answered 502: Bad Gateway");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn other_404s_are_not_index_not_found() {
        let err = ElasticError::from_response(404, r#"{"error":{"type":"resource_not_found_exception","reason":"x"}}"#);
        assert!(!err.is_index_not_found());
        let docket: DocketError = err.into();
        assert_eq!(docket.status(), Some(404));
    }

    #[test]
    fn converts_into_docket_kinds() {
        let cases = vec![
            (ElasticError::Timeout("x".into()), ErrorKind::InfrastructureError(InfrastructureCause::Timeout)),
            (ElasticError::Connect("x".into()), ErrorKind::InfrastructureError(InfrastructureCause::Connection)),
            (ElasticError::Request("x".into()), ErrorKind::InfrastructureError(InfrastructureCause::Connection)),
            (ElasticError::Protocol("x".into()), ErrorKind::InfrastructureError(InfrastructureCause::Protocol)),
            (ElasticError::from_response(503, "busy"), ErrorKind::InfrastructureError(InfrastructureCause::Status(503))),
            (
                ElasticError::from_response(404, r#"{"error":{"type":"index_not_found_exception","reason":"x"}}"#),
                ErrorKind::CollectionAbsent,
            ),
        ];
        for (err, kind) in cases {
            let docket: DocketError = err.into();
            assert_eq!(docket.kind(), &kind);
        }
    }
}
