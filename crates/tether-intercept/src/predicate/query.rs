//! Query-string matching.
//!
//! The query component is rebuilt with a leading `&` so that configured
//! terms, which conventionally start with `&` (or `!&`), line up with the
//! first parameter as well as the later ones.

use super::pattern::PatternMatcher;
use crate::error::Result;
use url::Url;

/// Compiled list of query terms, all of which must match.
#[derive(Debug, Clone)]
pub struct CompiledQueryMatcher {
    terms: Vec<PatternMatcher>,
}

impl CompiledQueryMatcher {
    pub fn compile(terms: &[String]) -> Result<Self> {
        let terms = terms
            .iter()
            .map(|t| PatternMatcher::new(t))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { terms })
    }

    pub fn matches(&self, url: &str) -> bool {
        let query = reconstructed_query(url);
        self.terms.iter().all(|t| t.matches(&query))
    }
}

/// The percent-decoded query of `url` prefixed with `&`.
///
/// A URL without a query, or one that does not parse, yields `"&"`.
pub fn reconstructed_query(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return "&".to_string(),
    };
    let raw = parsed.query().unwrap_or("");

    let decoded = urlencoding::decode(raw)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    format!("&{decoded}")
}
