//! Record hashing for the ledger
//!
//! This module provides:
//! - Canonical JSON rendering (recursive key-sorted serialization)
//! - SHA-256 content digests over an entry's fields, as lowercase hex
//!
//! The digest input is a deterministic concatenation of the entry fields:
//! `index ++ previous_digest ++ timestamp ++ canonical_json(payload) ++ nonce`.
//! Same inputs produce the same bytes forever, across process restarts.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::types::Payload;

/// Compute the content digest of an entry from its fields.
///
/// Pure function of its inputs; no side effects.
pub fn entry_digest(
    index: u64,
    previous_digest: &str,
    timestamp: &DateTime<Utc>,
    payload: &Payload,
    nonce: u64,
) -> String {
    let mut input = String::new();
    input.push_str(&index.to_string());
    input.push_str(previous_digest);
    input.push_str(&format_timestamp(timestamp));
    input.push_str(&canonical_payload(payload));
    input.push_str(&nonce.to_string());

    sha256_hex(input.as_bytes())
}

/// Render a timestamp for hashing.
///
/// Fixed millisecond precision: the rendering must not depend on whether the
/// wall clock happened to produce sub-millisecond digits.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Hash arbitrary bytes using SHA-256, rendered as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Render a payload as canonical JSON.
pub fn canonical_payload(payload: &Payload) -> String {
    let mut out = String::new();
    write_canonical_object(payload, &mut out);
    out
}

/// Render any JSON value canonically: object keys sorted ascending by
/// ordinal comparison, recursively, arrays kept in element order.
///
/// Sorting is explicit rather than delegated to the map's backing store, so
/// the digest stays stable even if a map implementation preserves insertion
/// order.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => write_canonical_object(map, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_canonical_object(map: &Payload, out: &mut String) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_unstable();

    out.push('{');
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let quoted = serde_json::to_string(key).expect("string serialization cannot fail");
        out.push_str(&quoted);
        out.push(':');
        write_canonical(&map[key.as_str()], out);
    }
    out.push('}');
}
