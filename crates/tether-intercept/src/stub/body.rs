//! Stub body payload shapes.

use crate::config::StubDefaults;
use crate::error::{InterceptError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The three accepted body shapes.
///
/// On the wire: `{"bytes": "<base64>"}`, `{"text": "..."}` or
/// `{"json": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StubBody {
    Bytes(#[serde(with = "crate::encoding::base64_bytes")] Bytes),
    Text(String),
    /// Must be a JSON object or array
    Json(serde_json::Value),
}

impl StubBody {
    /// Canonical bytes plus the default content type for this shape.
    pub fn resolve(&self, defaults: &StubDefaults) -> Result<(Bytes, String)> {
        match self {
            StubBody::Bytes(bytes) => Ok((bytes.clone(), defaults.data_content_type.clone())),
            StubBody::Text(text) => Ok((
                Bytes::from(text.clone().into_bytes()),
                defaults.text_content_type.clone(),
            )),
            StubBody::Json(value) => {
                if !(value.is_object() || value.is_array()) {
                    return Err(InterceptError::UnsupportedPayload(format!(
                        "JSON stub body must be an object or array, got {}",
                        json_kind(value)
                    )));
                }
                let encoded = serde_json::to_vec(value)
                    .map_err(|e| InterceptError::UnsupportedPayload(e.to_string()))?;
                Ok((Bytes::from(encoded), defaults.json_content_type.clone()))
            }
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl From<&str> for StubBody {
    fn from(text: &str) -> Self {
        StubBody::Text(text.to_string())
    }
}

impl From<String> for StubBody {
    fn from(text: String) -> Self {
        StubBody::Text(text)
    }
}

impl From<Vec<u8>> for StubBody {
    fn from(bytes: Vec<u8>) -> Self {
        StubBody::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for StubBody {
    fn from(bytes: Bytes) -> Self {
        StubBody::Bytes(bytes)
    }
}

impl From<serde_json::Value> for StubBody {
    fn from(value: serde_json::Value) -> Self {
        StubBody::Json(value)
    }
}
