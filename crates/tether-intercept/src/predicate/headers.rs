//! Header map matching for request and response headers.

use super::pattern::PatternMatcher;
use crate::error::Result;
use crate::exchange::Headers;
use std::collections::BTreeMap;

/// Compiled `(name-pattern, value-pattern)` requirements.
///
/// Every entry must be satisfied by at least one header whose name matches
/// the name pattern and whose value matches the value pattern. Entries are
/// checked independently, so two entries may be satisfied by the same header.
#[derive(Debug, Clone)]
pub struct CompiledHeaderMatcher {
    entries: Vec<(PatternMatcher, PatternMatcher)>,
}

impl CompiledHeaderMatcher {
    pub fn compile(config: &BTreeMap<String, String>) -> Result<Self> {
        let entries = config
            .iter()
            .map(|(name, value)| Ok((PatternMatcher::new(name)?, PatternMatcher::new(value)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn matches(&self, headers: &Headers) -> bool {
        self.entries.iter().all(|(name, value)| {
            headers
                .iter()
                .any(|(k, v)| name.matches(k) && value.matches(v))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
