//! # Canonical Hashing
//!
//! Logically identical payloads must hash identically no matter how their
//! fields were ordered at construction time: request ids and signature
//! digests are hashes over this canonical form, and two participants
//! computing them independently must agree byte-for-byte.
//!
//! Canonical form: compact JSON with object keys deep-sorted bytewise;
//! array element order is preserved. The *normalized* hash additionally
//! lowercases every string (keys and values), so addresses and topics
//! hash the same regardless of checksum casing.

use serde_json::Value;
use sha3::{Digest, Keccak256};

/// Keccak-256 hash output (256-bit).
pub type Hash = [u8; 32];

/// Hash raw bytes with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Serialize a JSON value canonically: compact, object keys deep-sorted.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Keccak-256 of the canonical serialization of the lowercased value.
pub fn normalized_hash(value: &Value) -> Hash {
    let lowered = lowercase_strings(value);
    keccak256(canonical_json(&lowered).as_bytes())
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (index, key) in keys.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                // Key escaping goes through serde_json so the canonical
                // form stays valid JSON for any key content.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn lowercase_strings(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_ascii_lowercase()),
        Value::Array(items) => Value::Array(items.iter().map(lowercase_strings).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.to_ascii_lowercase(), lowercase_strings(item)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}
