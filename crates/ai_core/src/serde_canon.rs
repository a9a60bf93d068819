//! Canonical JSON and artifact fingerprints
//!
//! Artifacts are identified by the SHA-256 of their canonical JSON form:
//! object keys sorted recursively, no whitespace. The same bytes can be
//! produced by the offline training tooling (`sort_keys=True`, compact
//! separators), so fingerprints written into one artifact can be checked
//! against another at load time.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanonicalError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let json_value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&canonicalize_value(json_value))?)
}

fn canonicalize_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<String, serde_json::Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize_value(v)))
                .collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(canonicalize_value).collect())
        }
        other => other,
    }
}

/// Lowercase hex SHA-256 of the canonical JSON form.
pub fn fingerprint<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let json = to_canonical_json(value)?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Inner {
        z: i64,
        a: i64,
    }

    #[derive(Serialize)]
    struct Outer {
        b: Vec<Inner>,
        a: String,
    }

    fn sample() -> Outer {
        Outer {
            b: vec![Inner { z: 1, a: 2 }],
            a: "x".to_string(),
        }
    }

    #[test]
    fn keys_are_sorted_recursively() {
        let json = to_canonical_json(&sample()).unwrap();
        assert_eq!(json, r#"{"a":"x","b":[{"a":2,"z":1}]}"#);
    }

    #[test]
    fn fingerprint_matches_offline_tooling() {
        // sha256 of json.dumps(..., sort_keys=True, separators=(",", ":"))
        assert_eq!(
            fingerprint(&sample()).unwrap(),
            "02d3245e62cd745c06a1fc4bd86a89df6c56023c75fb78b6c1fa57d44e1fbd7a"
        );
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let mut other = sample();
        other.a = "y".to_string();
        assert_ne!(fingerprint(&sample()).unwrap(), fingerprint(&other).unwrap());
        assert_eq!(fingerprint(&other).unwrap().len(), 64);
    }
}
