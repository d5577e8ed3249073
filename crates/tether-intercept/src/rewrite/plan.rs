//! Rewrite plans applied to in-flight requests and responses.

use super::replacement::{apply_chain, RewriteReplacement};
use crate::error::{InterceptError, Result};
use crate::exchange::{self, Headers};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

/// Status override value meaning "leave the status alone".
pub const NO_STATUS_OVERRIDE: i32 = -1;

/// Ordered transformations of one exchange.
///
/// Replacement lists are chained: every replacement operates on the output
/// of the one before it. In the header maps an empty value removes the
/// header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewritePlan {
    #[serde(default)]
    pub url_replacements: Vec<RewriteReplacement>,
    #[serde(default)]
    pub request_replacements: Vec<RewriteReplacement>,
    #[serde(default)]
    pub request_headers_replacement: Headers,
    #[serde(default)]
    pub response_replacements: Vec<RewriteReplacement>,
    #[serde(default)]
    pub response_headers_replacement: Headers,
    #[serde(default = "default_status_code")]
    pub response_status_code: i32,
}

fn default_status_code() -> i32 {
    NO_STATUS_OVERRIDE
}

impl Default for RewritePlan {
    fn default() -> Self {
        Self {
            url_replacements: Vec::new(),
            request_replacements: Vec::new(),
            request_headers_replacement: Headers::new(),
            response_replacements: Vec::new(),
            response_headers_replacement: Headers::new(),
            response_status_code: NO_STATUS_OVERRIDE,
        }
    }
}

impl RewritePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url_replacement(mut self, find: impl Into<String>, replace: impl Into<String>) -> Self {
        self.url_replacements.push(RewriteReplacement::new(find, replace));
        self
    }

    pub fn with_request_replacement(
        mut self,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        self.request_replacements.push(RewriteReplacement::new(find, replace));
        self
    }

    pub fn with_request_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers_replacement.insert(name.into(), value.into());
        self
    }

    pub fn with_response_replacement(
        mut self,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        self.response_replacements.push(RewriteReplacement::new(find, replace));
        self
    }

    pub fn with_response_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.response_headers_replacement.insert(name.into(), value.into());
        self
    }

    pub fn with_status_code(mut self, status: i32) -> Self {
        self.response_status_code = status;
        self
    }

    /// Reject status overrides that cannot be delivered.
    pub fn validate(&self) -> Result<()> {
        let status = self.response_status_code;
        if status == NO_STATUS_OVERRIDE || (100..=999).contains(&status) {
            Ok(())
        } else {
            Err(InterceptError::InvalidStatusCode(status as i64))
        }
    }

    /// Whether the plan touches anything sent before the request leaves.
    pub fn rewrites_request(&self) -> bool {
        !self.url_replacements.is_empty()
            || !self.request_replacements.is_empty()
            || !self.request_headers_replacement.is_empty()
    }

    /// Chain the URL replacements. A result that is not an absolute URL is
    /// discarded and the original returned.
    pub fn rewrite_url(&self, url: &str) -> String {
        if self.url_replacements.is_empty() {
            return url.to_string();
        }

        let rewritten = apply_chain(&self.url_replacements, url);
        match Url::parse(&rewritten) {
            Ok(_) => rewritten,
            Err(e) => {
                warn!(original = %url, rewritten = %rewritten, error = %e,
                    "Rewritten URL does not parse, keeping original");
                url.to_string()
            }
        }
    }

    pub fn rewrite_request_headers(&self, headers: &Headers) -> Headers {
        replace_headers(headers, &self.request_headers_replacement)
    }

    pub fn rewrite_response_headers(&self, headers: &Headers) -> Headers {
        replace_headers(headers, &self.response_headers_replacement)
    }

    pub fn rewrite_request_body(&self, body: &Bytes) -> Bytes {
        rewrite_body(&self.request_replacements, body)
    }

    pub fn rewrite_response_body(&self, body: &Bytes) -> Bytes {
        rewrite_body(&self.response_replacements, body)
    }

    pub fn rewrite_status(&self, status: u16) -> u16 {
        if self.response_status_code >= 0 {
            u16::try_from(self.response_status_code).unwrap_or(status)
        } else {
            status
        }
    }
}

fn replace_headers(headers: &Headers, replacements: &Headers) -> Headers {
    let mut out = headers.clone();
    for (name, value) in replacements {
        if value.is_empty() {
            exchange::remove_header(&mut out, name);
        } else {
            exchange::set_header(&mut out, name, value);
        }
    }
    out
}

fn rewrite_body(replacements: &[RewriteReplacement], body: &Bytes) -> Bytes {
    if replacements.is_empty() {
        return body.clone();
    }
    let text = String::from_utf8_lossy(body);
    Bytes::from(apply_chain(replacements, &text).into_bytes())
}
