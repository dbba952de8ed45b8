//! Hashing - SHA-256 fingerprints for generated documents
//!
//! Identical records give identical `form_hash` values regardless of key
//! order in the caller's JSON.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

use crate::record::FormRecord;

/// SHA-256 of bytes as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Canonical JSON (sorted keys, no whitespace).
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    // Without `preserve_order`, `Value::Object` is a BTreeMap, so every
    // nested object comes back out with its keys sorted.
    let v: Value = serde_json::to_value(value)?;
    to_string(&v)
}

/// Fingerprint of a form record's content.
pub fn compute_form_hash(form: &FormRecord) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(form)?.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": {"y": 1, "b": 2}});
        assert_eq!(canonical_json(&obj).unwrap(), r#"{"a":2,"m":{"b":2,"y":1},"z":1}"#);
    }

    #[test]
    fn test_canonical_json_sorts_struct_fields() {
        #[derive(Serialize)]
        struct Unsorted {
            zeta: u8,
            alpha: Vec<Unsorted>,
        }
        let value = Unsorted {
            zeta: 1,
            alpha: vec![Unsorted { zeta: 2, alpha: vec![] }],
        };
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"alpha":[{"alpha":[],"zeta":2}],"zeta":1}"#
        );
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_form_hash_tracks_content() {
        let a: FormRecord = serde_json::from_value(json!({
            "client_name": "Acme", "items": []
        }))
        .unwrap();
        let b: FormRecord = serde_json::from_value(json!({
            "items": [], "client_name": "Acme"
        }))
        .unwrap();
        let c = FormRecord {
            client_name: Some("Other".to_string()),
            ..Default::default()
        };
        assert_eq!(compute_form_hash(&a).unwrap(), compute_form_hash(&b).unwrap());
        assert_ne!(compute_form_hash(&a).unwrap(), compute_form_hash(&c).unwrap());
    }
}
