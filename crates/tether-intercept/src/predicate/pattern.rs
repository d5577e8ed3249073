//! Regex pattern matching with an optional `!` inversion prefix.

use crate::error::{InterceptError, Result};
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// Compiled pattern used by every predicate field.
///
/// A raw pattern starting with `!` matches when the remaining regex does
/// *not* find a match in the candidate.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    raw: String,
    regex: Arc<Regex>,
    invert: bool,
}

impl PatternMatcher {
    /// Compile a pattern, failing fast on invalid regex syntax.
    pub fn new(raw: &str) -> Result<Self> {
        Self::build(raw, false)
    }

    /// Compile a pattern that ignores ASCII and Unicode case.
    pub fn case_insensitive(raw: &str) -> Result<Self> {
        Self::build(raw, true)
    }

    fn build(raw: &str, case_insensitive: bool) -> Result<Self> {
        let (invert, pattern) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| InterceptError::invalid_pattern(raw, e))?;

        Ok(Self {
            raw: raw.to_string(),
            regex: Arc::new(regex),
            invert,
        })
    }

    /// `true` when the regex finds a match, flipped for inverted patterns.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate) != self.invert
    }

    /// The regex without the inversion prefix.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// The pattern exactly as configured, including any `!` prefix.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}
