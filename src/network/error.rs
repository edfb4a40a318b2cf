//! Failure taxonomy for the request wrapper.
//!
//! Every failed call is reported as a [`NetworkErrorReason`] together with the
//! underlying [`RequestError`]. Classification rules:
//!
//! | Response | Reason |
//! |---|---|
//! | status present, body is JSON | `FailureErrorCode(code, body["err"] or default message)` |
//! | status present, body not JSON | `FailureErrorCode(code, "")` |
//! | no status, timed out | `InternetNotReachable` |
//! | no status, anything else | `Other` |

use serde_json::Value;
use thiserror::Error;

/// Message used when a JSON error body has no string `err` field.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Description carried by timed-out transport errors.
pub const TIMEOUT_DESCRIPTION: &str = "The request timed out.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkErrorReason {
    /// The server answered with a status the caller has to handle.
    FailureErrorCode { code: u16, message: String },
    /// The request timed out before any response arrived.
    InternetNotReachable,
    /// Reserved for callers that map their own auth failures; never produced
    /// by classification.
    UnauthorizedAccess,
    Other,
}

impl std::fmt::Display for NetworkErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkErrorReason::FailureErrorCode { code, message } if message.is_empty() => {
                write!(f, "request failed with status {code}")
            }
            NetworkErrorReason::FailureErrorCode { code, message } => {
                write!(f, "request failed with status {code}: {message}")
            }
            NetworkErrorReason::InternetNotReachable => f.write_str("internet not reachable"),
            NetworkErrorReason::UnauthorizedAccess => f.write_str("unauthorized access"),
            NetworkErrorReason::Other => f.write_str("request failed"),
        }
    }
}

/// The underlying error passed to failure callbacks alongside the reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{description}")]
pub struct RequestError {
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    pub description: String,
}

impl RequestError {
    pub fn from_status(code: u16) -> Self {
        Self {
            status: Some(code),
            description: format!("Response status code was unacceptable: {code}."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// A call that produced no HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::new(TransportErrorKind::Timeout, TIMEOUT_DESCRIPTION)
    }

    /// Timed out, either by kind or by its description.
    pub fn timed_out(&self) -> bool {
        self.kind == TransportErrorKind::Timeout || self.message.contains("timed out")
    }
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        Self {
            status: None,
            description: err.message,
        }
    }
}

/// The request could not be built.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("invalid URL '{path}': {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// A classified failure: reason plus the raw error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} ({error})")]
pub struct RequestFailure {
    pub reason: NetworkErrorReason,
    pub error: RequestError,
}

impl RequestFailure {
    pub fn new(reason: NetworkErrorReason, error: RequestError) -> Self {
        Self { reason, error }
    }
}

impl From<EncodeError> for RequestFailure {
    fn from(err: EncodeError) -> Self {
        Self::new(
            NetworkErrorReason::Other,
            RequestError {
                status: None,
                description: err.to_string(),
            },
        )
    }
}

/// Classify a response that carries a status code.
pub fn classify_status(code: u16, body: &[u8]) -> NetworkErrorReason {
    let Ok(json) = serde_json::from_slice::<Value>(body) else {
        tracing::debug!(code, "couldn't read the error body as JSON");
        return NetworkErrorReason::FailureErrorCode {
            code,
            message: String::new(),
        };
    };
    let message = json
        .get("err")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_FAILURE_MESSAGE)
        .to_string();
    NetworkErrorReason::FailureErrorCode { code, message }
}

/// Classify a call that produced no response.
pub fn classify_transport(err: &TransportError) -> NetworkErrorReason {
    if err.timed_out() {
        NetworkErrorReason::InternetNotReachable
    } else {
        NetworkErrorReason::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // classify_status
    // =========================================================================

    #[test]
    fn status_with_err_field_uses_message() {
        assert_eq!(
            classify_status(422, br#"{"err":"bad input"}"#),
            NetworkErrorReason::FailureErrorCode {
                code: 422,
                message: "bad input".to_string()
            }
        );
    }

    #[test]
    fn status_with_unparseable_body_has_empty_message() {
        assert_eq!(
            classify_status(422, b"<html>oops</html>"),
            NetworkErrorReason::FailureErrorCode {
                code: 422,
                message: String::new()
            }
        );
    }

    #[test]
    fn status_with_empty_body_has_empty_message() {
        assert_eq!(
            classify_status(500, b""),
            NetworkErrorReason::FailureErrorCode {
                code: 500,
                message: String::new()
            }
        );
    }

    #[test]
    fn status_with_json_but_no_err_uses_default() {
        for body in [&br#"{"error":"nope"}"#[..], br#"{"err":42}"#, b"[1,2]", b"\"text\""] {
            assert_eq!(
                classify_status(400, body),
                NetworkErrorReason::FailureErrorCode {
                    code: 400,
                    message: DEFAULT_FAILURE_MESSAGE.to_string()
                }
            );
        }
    }

    // =========================================================================
    // classify_transport
    // =========================================================================

    #[test]
    fn timeout_is_internet_not_reachable() {
        assert_eq!(
            classify_transport(&TransportError::timeout()),
            NetworkErrorReason::InternetNotReachable
        );
    }

    #[test]
    fn timed_out_description_is_internet_not_reachable() {
        let err = TransportError::new(TransportErrorKind::Other, "operation timed out");
        assert_eq!(
            classify_transport(&err),
            NetworkErrorReason::InternetNotReachable
        );
    }

    #[test]
    fn connection_refused_is_other() {
        let err = TransportError::new(TransportErrorKind::Connect, "connection refused");
        assert_eq!(classify_transport(&err), NetworkErrorReason::Other);
    }

    #[test]
    fn transport_error_converts_without_status() {
        let err: RequestError = TransportError::timeout().into();
        assert_eq!(err.status, None);
        assert_eq!(err.description, TIMEOUT_DESCRIPTION);
    }

    #[test]
    fn encode_error_becomes_other() {
        let source = url::Url::parse("::").unwrap_err();
        let failure: RequestFailure = EncodeError::InvalidUrl {
            path: "::".to_string(),
            source,
        }
        .into();
        assert_eq!(failure.reason, NetworkErrorReason::Other);
        assert!(failure.error.description.contains("invalid URL"));
    }

    #[test]
    fn reason_display() {
        let reason = NetworkErrorReason::FailureErrorCode {
            code: 404,
            message: "missing".to_string(),
        };
        assert_eq!(reason.to_string(), "request failed with status 404: missing");
        let bare = NetworkErrorReason::FailureErrorCode {
            code: 404,
            message: String::new(),
        };
        assert_eq!(bare.to_string(), "request failed with status 404");
    }
}
