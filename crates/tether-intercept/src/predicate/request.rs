//! Composite request predicate over URL, method, query, body and headers.

use super::headers::CompiledHeaderMatcher;
use super::identifier::canonical_identifier;
use super::pattern::PatternMatcher;
use super::query::CompiledQueryMatcher;
use crate::error::Result;
use crate::exchange::Exchange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Request predicate as configured by the test side.
///
/// Unset fields are trivially satisfied. Two predicates with identical field
/// values share the same [`identifier`](RequestMatch::identifier) but can
/// still be registered as distinct rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMatch {
    /// Regex matched (ignoring case) against the absolute request URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Regex terms matched against `&` + the decoded query; `!` inverts a term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Vec<String>>,

    /// Exact, case-sensitive HTTP method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Regex matched against the UTF-8 request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Header-name regex to header-value regex, all required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<BTreeMap<String, String>>,

    /// Header-name regex to header-value regex, all required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<BTreeMap<String, String>>,
}

impl RequestMatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(pattern: impl Into<String>) -> Self {
        Self::new().with_url(pattern)
    }

    pub fn with_url(mut self, pattern: impl Into<String>) -> Self {
        self.url = Some(pattern.into());
        self
    }

    pub fn with_query<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query = Some(terms.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_body(mut self, pattern: impl Into<String>) -> Self {
        self.body = Some(pattern.into());
        self
    }

    pub fn with_request_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_response_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.response_headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Compile every pattern. Invalid regex syntax is a configuration error.
    pub fn compile(&self) -> Result<CompiledRequestMatch> {
        CompiledRequestMatch::compile(self)
    }

    /// Deterministic hex identifier derived from the canonical encoding of
    /// all fields. Stable across processes and builds.
    pub fn identifier(&self) -> String {
        canonical_identifier(self)
    }
}

impl fmt::Display for RequestMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_na<T: fmt::Debug>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(|v| format!("{v:?}"))
                .unwrap_or_else(|| "N/A".to_string())
        }

        write!(
            f,
            "URL: {}, Query: {}, Method: {}, Body: {}, Request headers: {}, Response headers: {}",
            self.url.as_deref().unwrap_or("N/A"),
            or_na(&self.query),
            self.method.as_deref().unwrap_or("N/A"),
            self.body.as_deref().unwrap_or("N/A"),
            or_na(&self.request_headers),
            or_na(&self.response_headers),
        )
    }
}

/// Compiled request predicate for efficient runtime evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRequestMatch {
    pub method: Option<String>,
    pub url: Option<PatternMatcher>,
    pub query: Option<CompiledQueryMatcher>,
    pub body: Option<PatternMatcher>,
    pub request_headers: Option<CompiledHeaderMatcher>,
    pub response_headers: Option<CompiledHeaderMatcher>,
}

impl CompiledRequestMatch {
    pub fn compile(predicate: &RequestMatch) -> Result<Self> {
        let url = predicate
            .url
            .as_deref()
            .map(PatternMatcher::case_insensitive)
            .transpose()?;

        let query = predicate
            .query
            .as_deref()
            .map(CompiledQueryMatcher::compile)
            .transpose()?;

        let body = predicate
            .body
            .as_deref()
            .map(PatternMatcher::new)
            .transpose()?;

        let request_headers = predicate
            .request_headers
            .as_ref()
            .map(CompiledHeaderMatcher::compile)
            .transpose()?;

        let response_headers = predicate
            .response_headers
            .as_ref()
            .map(CompiledHeaderMatcher::compile)
            .transpose()?;

        Ok(CompiledRequestMatch {
            method: predicate.method.clone(),
            url,
            query,
            body,
            request_headers,
            response_headers,
        })
    }

    /// Evaluate the predicate against a captured exchange.
    pub fn matches(&self, exchange: &Exchange) -> bool {
        let request = &exchange.request;

        self.method.iter().all(|m| *m == request.method)
            && self.url.iter().all(|u| u.matches(&request.url))
            && self.query.iter().all(|q| q.matches(&request.url))
            && self.body.iter().all(|b| b.matches(&request.body_string()))
            && self
                .request_headers
                .iter()
                .all(|h| h.matches(&request.headers))
            && self
                .response_headers
                .iter()
                .all(|h| h.matches(&exchange.response.headers))
    }
}
