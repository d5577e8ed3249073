//! Single regex find/replace operation.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Output substituted for the whole string when the find pattern does not
/// compile.
pub const INVALID_REGEX_SENTINEL: &str = "invalid-regex";

/// Case-insensitive regex find/replace. `replace` is a template and may
/// reference capture groups as `$1` or `${name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewriteReplacement {
    pub find: String,
    pub replace: String,
}

impl RewriteReplacement {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }

    /// Replace every match of `find` in `input`.
    ///
    /// An uncompilable pattern yields [`INVALID_REGEX_SENTINEL`] instead of
    /// an error so that one bad rule never aborts the exchange.
    pub fn apply(&self, input: &str) -> String {
        match RegexBuilder::new(&self.find).case_insensitive(true).build() {
            Ok(re) => re.replace_all(input, self.replace.as_str()).into_owned(),
            Err(e) => {
                warn!(pattern = %self.find, error = %e, "Rewrite pattern failed to compile");
                INVALID_REGEX_SENTINEL.to_string()
            }
        }
    }
}

/// Apply `replacements` in order, each one to the output of the previous.
pub fn apply_chain(replacements: &[RewriteReplacement], input: &str) -> String {
    replacements
        .iter()
        .fold(input.to_string(), |acc, r| r.apply(&acc))
}
