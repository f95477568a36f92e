//! Error taxonomy shared by every lookup

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Message returned when a lookup is called without a parcel identifier.
pub const MISSING_PNU: &str = "PNU 코드가 필요합니다.";

/// Message returned when an address search is called without a keyword.
pub const MISSING_ADDRESS: &str = "주소가 필요합니다.";

/// Message attached to diagnostics for envelopes none of the decoders know.
pub const UNRECOGNIZED_SHAPE: &str = "응답 형식 확인 필요";

/// Fallback text when an upstream rejects a call without saying why.
pub const REJECTED_WITHOUT_REASON: &str = "조회 실패";

/// Coarse classification callers and tests can assert on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input, detected before any network call
    Validation,
    /// Network, timeout, decode failure or an explicit upstream rejection
    Upstream,
    /// The upstream answered with an envelope no decoder recognizes
    Unrecognized,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Unrecognized => "unrecognized",
        }
    }
}

/// Lookup failures
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upstream(String),

    /// The upstream answered, but with an explicit error status.
    #[error("{message}")]
    Rejected { message: String, raw: Value },
}

impl LookupError {
    pub fn missing_pnu() -> Self {
        LookupError::Validation(MISSING_PNU.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::Validation(_) => ErrorKind::Validation,
            LookupError::Upstream(_) | LookupError::Rejected { .. } => ErrorKind::Upstream,
        }
    }

    /// Raw upstream payload, when the upstream produced one
    pub fn raw(&self) -> Option<&Value> {
        match self {
            LookupError::Rejected { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_is_an_upstream_failure() {
        let err = LookupError::Rejected {
            message: "INVALID_KEY".to_string(),
            raw: serde_json::json!({"response": {"status": "ERROR"}}),
        };
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.to_string(), "INVALID_KEY");
        assert!(err.raw().is_some());
    }

    #[test]
    fn test_missing_pnu_is_validation() {
        let err = LookupError::missing_pnu();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), MISSING_PNU);
        assert!(err.raw().is_none());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_value(ErrorKind::Unrecognized).unwrap();
        assert_eq!(json, "unrecognized");
        assert_eq!(ErrorKind::Validation.as_str(), "validation");
    }
}
