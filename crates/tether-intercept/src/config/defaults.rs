//! Defaults applied to stub responses that leave fields unspecified.

use serde::{Deserialize, Serialize};

/// Mutable defaults used whenever a stub is built without explicit
/// overrides. Owned by the engine; there is no hidden global copy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StubDefaults {
    /// Seconds to deliver the whole response, or a negative KB/s rate
    #[serde(default = "default_response_time")]
    pub response_time: f64,

    #[serde(default = "default_status_code")]
    pub status_code: u16,

    /// Content type for structured (JSON) bodies
    #[serde(default = "default_json_content_type")]
    pub json_content_type: String,

    /// Content type for raw byte bodies
    #[serde(default = "default_data_content_type")]
    pub data_content_type: String,

    /// Content type for text bodies
    #[serde(default = "default_text_content_type")]
    pub text_content_type: String,
}

impl Default for StubDefaults {
    fn default() -> Self {
        Self {
            response_time: default_response_time(),
            status_code: default_status_code(),
            json_content_type: default_json_content_type(),
            data_content_type: default_data_content_type(),
            text_content_type: default_text_content_type(),
        }
    }
}

impl StubDefaults {
    /// Restore every field to its built-in value.
    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }
}

fn default_response_time() -> f64 {
    0.0
}

fn default_status_code() -> u16 {
    200
}

fn default_json_content_type() -> String {
    "application/json".to_string()
}

fn default_data_content_type() -> String {
    "application/octet-stream".to_string()
}

fn default_text_content_type() -> String {
    "text/plain".to_string()
}
