//! Captured HTTP exchange types.
//!
//! The interception layer hands the engine already-decoded requests and
//! responses; nothing here touches the network or parses raw HTTP.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Header map keyed by header name. Lookups through the helpers below are
/// case-insensitive; iteration order is the sorted key order.
pub type Headers = BTreeMap<String, String>;

/// Outgoing request as observed by the host process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, with = "crate::encoding::base64_bytes")]
    pub body: Bytes,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Request body decoded as UTF-8, replacing invalid sequences.
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header(&self.headers, name)
    }
}

/// Response as delivered (or about to be delivered) to the host process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status: u16,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, with = "crate::encoding::base64_bytes")]
    pub body: Bytes,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header(&self.headers, name)
    }
}

/// A `(request, pending-response)` pair captured by the interception layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub request: HttpRequest,
    #[serde(default)]
    pub response: HttpResponse,
    /// Round-trip time measured by the interception layer.
    #[serde(default, with = "crate::encoding::duration_secs")]
    pub elapsed: Duration,
}

impl Exchange {
    pub fn new(request: HttpRequest, response: HttpResponse) -> Self {
        Self {
            request,
            response,
            elapsed: Duration::ZERO,
        }
    }

    /// Exchange whose response has not been received yet.
    pub fn pending(request: HttpRequest) -> Self {
        Self::new(request, HttpResponse::default())
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }
}

/// Case-insensitive header lookup.
pub fn header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Remove every header whose name equals `name` ignoring case.
/// Returns whether anything was removed.
pub fn remove_header(headers: &mut Headers, name: &str) -> bool {
    let before = headers.len();
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.len() != before
}

/// Insert a header, replacing any existing entry that differs only in case.
pub fn set_header(headers: &mut Headers, name: &str, value: &str) {
    remove_header(headers, name);
    headers.insert(name.to_string(), value.to_string());
}
