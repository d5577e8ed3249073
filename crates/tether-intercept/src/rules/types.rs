//! Rule value types.

use crate::exchange::Exchange;
use crate::predicate::{CompiledRequestMatch, RequestMatch};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Handle returned when a rule is added.
///
/// Formed from the predicate identifier and the rule's insertion sequence,
/// so two rules sharing a predicate still get distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(predicate_identifier: &str, sequence: u64) -> Self {
        Self(format!("{predicate_identifier}-{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RuleId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for RuleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Remaining-iteration budget: `None` is unlimited, `Some(0)` is inert,
/// `Some(n)` applies `n` more times before the rule retires.
pub type Iterations = Option<u32>;

/// A predicate bound to a kind-specific payload.
#[derive(Debug, Clone)]
pub struct Rule<P> {
    pub id: RuleId,
    pub predicate: RequestMatch,
    pub compiled: CompiledRequestMatch,
    pub payload: P,
    pub remaining: Iterations,
    pub sequence: u64,
}

impl<P> Rule<P> {
    pub fn is_inert(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn matches(&self, exchange: &Exchange) -> bool {
        !self.is_inert() && self.compiled.matches(exchange)
    }

    /// Finite budget with iterations left, whether or not it was applied.
    pub fn is_unused_finite(&self) -> bool {
        matches!(self.remaining, Some(n) if n > 0)
    }
}

/// Snapshot of a rule taken at the moment it was applied.
#[derive(Debug, Clone)]
pub struct Applied<P> {
    pub id: RuleId,
    pub predicate: RequestMatch,
    pub payload: P,
    /// Budget left after this application
    pub remaining: Iterations,
    /// Whether this application exhausted the rule and removed it
    pub retired: bool,
}
