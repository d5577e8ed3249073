//! Stub response construction and the result envelope.

use super::body::StubBody;
use super::timing::ResponseTime;
use crate::config::StubDefaults;
use crate::error::{InterceptError, Result};
use crate::exchange::{self, Headers, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Stub definition as submitted by the test side. Unset fields fall back to
/// the engine's [`StubDefaults`] when the stub is resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<StubBody>,
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Seconds, or a negative KB/s rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    /// Non-zero requests a synthetic connection failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<i64>,
}

impl StubSpec {
    pub fn new(body: impl Into<StubBody>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }

    pub fn failure(code: i64) -> Self {
        Self {
            failure_code: Some(code),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_response_time(mut self, response_time: f64) -> Self {
        self.response_time = Some(response_time);
        self
    }
}

/// Fully resolved stub response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubResponse {
    #[serde(with = "crate::encoding::base64_bytes")]
    pub body: Bytes,
    pub content_type: String,
    pub headers: Headers,
    pub status_code: u16,
    pub response_time: ResponseTime,
    /// 0 for a normal response
    #[serde(default)]
    pub failure_code: i64,
}

impl StubResponse {
    /// Resolve a submitted stub against the current defaults.
    pub fn from_spec(spec: StubSpec, defaults: &StubDefaults) -> Result<Self> {
        if let Some(code) = spec.failure_code.filter(|c| *c != 0) {
            return Ok(Self::failure(code, spec.response_time, defaults));
        }

        let (body, default_content_type) = match &spec.body {
            Some(body) => body.resolve(defaults)?,
            None => (Bytes::new(), defaults.data_content_type.clone()),
        };

        if let Some(status) = spec.status_code {
            validate_status(status)?;
        }

        // Explicit content type, then a Content-Type header, then the shape default.
        let content_type = spec
            .content_type
            .clone()
            .or_else(|| exchange::header(&spec.headers, "Content-Type").map(str::to_string))
            .unwrap_or(default_content_type);

        let mut headers = spec.headers;
        exchange::set_header(&mut headers, "Content-Type", &content_type);

        Ok(Self {
            body,
            content_type,
            headers,
            status_code: spec.status_code.unwrap_or(defaults.status_code),
            response_time: ResponseTime::from(
                spec.response_time.unwrap_or(defaults.response_time),
            ),
            failure_code: 0,
        })
    }

    /// Synthetic connection failure with no body.
    pub fn failure(code: i64, response_time: Option<f64>, defaults: &StubDefaults) -> Self {
        Self {
            body: Bytes::new(),
            content_type: String::new(),
            headers: Headers::new(),
            status_code: defaults.status_code,
            response_time: ResponseTime::from(response_time.unwrap_or(defaults.response_time)),
            failure_code: code,
        }
    }

    /// Load a stub body from disk, deriving the content type from the file
    /// extension unless `headers` already carries one.
    pub fn from_file(
        path: &Path,
        headers: Headers,
        status_code: Option<u16>,
        response_time: Option<f64>,
        defaults: &StubDefaults,
    ) -> Result<Self> {
        let data = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = data.len(), "Loaded stub body from file");

        let content_type = exchange::header(&headers, "Content-Type")
            .map(str::to_string)
            .unwrap_or_else(|| content_type_for_path(path, defaults));

        Self::from_spec(
            StubSpec {
                body: Some(StubBody::Bytes(Bytes::from(data))),
                headers,
                content_type: Some(content_type),
                status_code,
                response_time,
                failure_code: None,
            },
            defaults,
        )
    }

    pub fn is_failure(&self) -> bool {
        self.failure_code != 0
    }

    /// The response delivered in place of the real one.
    pub fn to_http_response(&self) -> HttpResponse {
        HttpResponse {
            status: self.status_code,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    pub fn to_envelope(&self) -> ResultEnvelope {
        ResultEnvelope::new(self.status_code, self.headers.clone(), &self.body)
    }
}

fn validate_status(status: u16) -> Result<()> {
    if (100..=999).contains(&status) {
        Ok(())
    } else {
        Err(InterceptError::InvalidStatusCode(status as i64))
    }
}

fn content_type_for_path(path: &Path, defaults: &StubDefaults) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "json" => "application/json".to_string(),
        "xml" => "application/xml".to_string(),
        "txt" => "text/plain".to_string(),
        "pdf" => "application/pdf".to_string(),
        e if e.starts_with("htm") => "text/html".to_string(),
        _ => defaults.data_content_type.clone(),
    }
}

/// Generic result envelope exchanged with collaborators:
/// `{ responseCode, responseHeaders, data: base64 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub response_code: u16,
    #[serde(default)]
    pub response_headers: Headers,
    pub data: String,
}

impl ResultEnvelope {
    pub fn new(response_code: u16, response_headers: Headers, data: &[u8]) -> Self {
        Self {
            response_code,
            response_headers,
            data: STANDARD.encode(data),
        }
    }

    /// Decode `data` back into bytes.
    pub fn decoded_data(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| InterceptError::UnsupportedPayload(format!("invalid base64 data: {e}")))
    }
}
