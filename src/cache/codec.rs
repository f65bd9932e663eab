// Cache entry wire format
// Author: kelexine (https://github.com/kelexine)

use crate::error::{CacheError, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

/// A stored prediction response plus its metadata.
///
/// Serialized as `{"response": ..., "timestamp": <ms>, "windowHash": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheEntry<R> {
    /// Caller-defined payload, passed through unmodified
    pub response: R,
    /// Creation time, milliseconds since the Unix epoch
    #[serde(rename = "timestamp")]
    pub created_at: i64,
    /// Fingerprint of the window this response answers
    #[serde(rename = "windowHash")]
    pub fingerprint: String,
}

impl<R> CacheEntry<R> {
    pub fn new(response: R, created_at: i64, fingerprint: impl Into<String>) -> Self {
        Self {
            response,
            created_at,
            fingerprint: fingerprint.into(),
        }
    }

    /// Milliseconds elapsed since creation at time `now`.
    pub fn age_ms(&self, now: i64) -> i64 {
        now.saturating_sub(self.created_at)
    }

    /// Whether the entry is older than `ttl_ms` at time `now`.
    pub fn is_expired(&self, now: i64, ttl_ms: i64) -> bool {
        self.age_ms(now) > ttl_ms
    }
}

/// Entry whose payload was validated but not materialized.
pub type EntryHeader = CacheEntry<IgnoredAny>;

pub fn encode<R: Serialize>(entry: &CacheEntry<R>) -> Result<String> {
    serde_json::to_string(entry).map_err(CacheError::Encode)
}

pub fn decode<R: DeserializeOwned>(raw: &str) -> Result<CacheEntry<R>> {
    serde_json::from_str(raw).map_err(CacheError::Decode)
}

/// Decode only the metadata, for sweeps that never look at the payload.
pub fn decode_header(raw: &str) -> Result<EntryHeader> {
    decode(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_encode_field_names() {
        let entry = CacheEntry::new(json!({"risk": 0.42}), 1_700_000_000_000, "abc");
        let encoded = encode(&entry).unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();

        assert_eq!(value["response"], json!({"risk": 0.42}));
        assert_eq!(value["timestamp"], json!(1_700_000_000_000i64));
        assert_eq!(value["windowHash"], json!("abc"));
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_decode_truncated_payload() {
        let entry = CacheEntry::new(json!([1, 2, 3]), 5, "fp");
        let encoded = encode(&entry).unwrap();
        let truncated = &encoded[..encoded.len() / 2];

        assert!(matches!(decode::<Value>(truncated), Err(CacheError::Decode(_))));
        assert!(decode_header(truncated).is_err());
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        assert!(decode::<Value>(r#"{"response": 1, "timestamp": 2}"#).is_err());
        assert!(decode::<Value>("null").is_err());
        assert!(decode::<Value>("").is_err());
    }

    #[test]
    fn test_decode_header_skips_payload() {
        let raw = r#"{"response": {"deep": [1, {"x": null}]}, "timestamp": 10, "windowHash": "q"}"#;
        let header = decode_header(raw).unwrap();
        assert_eq!(header.created_at, 10);
        assert_eq!(header.fingerprint, "q");
    }

    #[test]
    fn test_expiry_boundary() {
        let entry = CacheEntry::new((), 1_000, "fp");
        assert!(!entry.is_expired(1_000 + 500, 500));
        assert!(entry.is_expired(1_000 + 501, 500));
        // Clock skew backwards never counts as expired
        assert!(!entry.is_expired(0, 500));
    }
}
