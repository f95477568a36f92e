//! Envelopes shared across upstream endpoints

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{LookupError, REJECTED_WITHOUT_REASON};
use crate::lenient;

/// Result of normalizing one upstream payload
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    /// A known shape with a usable record
    Found(T),
    /// A known shape that carried no items
    Empty,
    /// No decoder recognized the payload; carries it for diagnosis
    Unrecognized(Value),
}

impl<T> Normalized<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Normalized<U> {
        match self {
            Normalized::Found(record) => Normalized::Found(f(record)),
            Normalized::Empty => Normalized::Empty,
            Normalized::Unrecognized(raw) => Normalized::Unrecognized(raw),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Normalized::Found(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Normalized::Unrecognized(_))
    }
}

/// Generic VWorld envelope: `{"response": {"status", "result", "error"}}`
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "R: DeserializeOwned"))]
pub struct VworldResponse<R> {
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub result: Option<R>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub error: Option<VworldError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VworldError {
    #[serde(default, deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
}

impl<R> VworldResponse<R> {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("OK")
    }

    /// The result on `OK`, otherwise the upstream's own error text.
    pub fn into_result(self, raw: &Value) -> Result<Option<R>, LookupError> {
        if self.is_ok() {
            return Ok(self.result);
        }
        let message = self
            .error
            .map(|e| e.text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| REJECTED_WITHOUT_REASON.to_string());
        Err(LookupError::Rejected {
            message,
            raw: raw.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "lenient::string")]
        value: String,
    }

    #[test]
    fn test_ok_response_yields_result() {
        let raw = json!({"status": "OK", "result": {"value": 3}});
        let response: VworldResponse<Payload> = serde_json::from_value(raw.clone()).unwrap();
        let result = response.into_result(&raw).unwrap().unwrap();
        assert_eq!(result.value, "3");
    }

    #[test]
    fn test_error_response_carries_text_and_raw() {
        let raw = json!({"status": "ERROR", "error": {"code": "INVALID_KEY", "text": "인증키 오류"}});
        let response: VworldResponse<Payload> = serde_json::from_value(raw.clone()).unwrap();
        let err = response.into_result(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.to_string(), "인증키 오류");
        assert_eq!(err.raw(), Some(&raw));
    }

    #[test]
    fn test_error_without_text_uses_default() {
        let raw = json!({"status": "NOT_FOUND"});
        let response: VworldResponse<Payload> = serde_json::from_value(raw.clone()).unwrap();
        let err = response.into_result(&raw).unwrap_err();
        assert_eq!(err.to_string(), REJECTED_WITHOUT_REASON);
    }

    #[test]
    fn test_malformed_result_is_tolerated() {
        let raw = json!({"status": "OK", "result": "none"});
        let response: VworldResponse<Payload> = serde_json::from_value(raw.clone()).unwrap();
        assert!(response.into_result(&raw).unwrap().is_none());
    }

    #[test]
    fn test_normalized_map() {
        let n: Normalized<u32> = Normalized::Found(2);
        assert_eq!(n.map(|v| v * 2), Normalized::Found(4));
        let e: Normalized<u32> = Normalized::Empty;
        assert_eq!(e.map(|v| v * 2), Normalized::Empty);
    }
}
