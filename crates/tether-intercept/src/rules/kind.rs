use serde::{Deserialize, Serialize};
use std::fmt;

/// The five rule kinds. Each kind has its own store and insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    Stub,
    Rewrite,
    Throttle,
    CookieBlock,
    Monitor,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::Stub,
        RuleKind::Rewrite,
        RuleKind::Throttle,
        RuleKind::CookieBlock,
        RuleKind::Monitor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Stub => "stub",
            RuleKind::Rewrite => "rewrite",
            RuleKind::Throttle => "throttle",
            RuleKind::CookieBlock => "cookie-block",
            RuleKind::Monitor => "monitor",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
