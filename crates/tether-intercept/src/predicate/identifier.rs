//! Canonical, process-independent predicate identifiers.
//!
//! Fields are written one per line in a fixed order as `name=value`, where
//! the value is either `~` for an unset field or its JSON encoding. Header
//! maps are `BTreeMap`s, so their JSON keys are always sorted.

use super::request::RequestMatch;
use serde::Serialize;
use sha2::{Digest, Sha256};

const ABSENT: &str = "~";

/// Canonical text form of a predicate.
pub fn canonical_encoding(predicate: &RequestMatch) -> String {
    let mut out = String::new();
    push_field(&mut out, "url", &predicate.url);
    push_field(&mut out, "query", &predicate.query);
    push_field(&mut out, "method", &predicate.method);
    push_field(&mut out, "body", &predicate.body);
    push_field(&mut out, "requestHeaders", &predicate.request_headers);
    push_field(&mut out, "responseHeaders", &predicate.response_headers);
    out
}

fn push_field<T: Serialize>(out: &mut String, name: &str, value: &Option<T>) {
    out.push_str(name);
    out.push('=');
    match value {
        // Strings, string lists and string maps always serialize.
        Some(v) => out.push_str(&serde_json::to_string(v).unwrap_or_default()),
        None => out.push_str(ABSENT),
    }
    out.push('\n');
}

/// Hex SHA-256 of the canonical encoding.
pub fn canonical_identifier(predicate: &RequestMatch) -> String {
    let digest = Sha256::digest(canonical_encoding(predicate).as_bytes());
    hex::encode(digest)
}
