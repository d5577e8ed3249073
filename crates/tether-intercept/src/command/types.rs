//! Command and reply types.

use crate::config::StubDefaults;
use crate::error::{InterceptError, Result};
use crate::exchange::Headers;
use crate::predicate::RequestMatch;
use crate::rewrite::RewritePlan;
use crate::rules::RuleId;
use crate::stub::{ResultEnvelope, StubSpec};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Control-plane command, tagged by its `command` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    StubMatching {
        #[serde(rename = "match", default)]
        predicate: RequestMatch,
        #[serde(default)]
        response: StubSpec,
        #[serde(default)]
        iterations: Option<u32>,
    },
    StubRequestsRemove {
        #[serde(alias = "id")]
        ids: RuleIds,
    },
    /// Remove every stub registered with exactly this predicate
    StubRequestsRemoveMatching {
        #[serde(rename = "match")]
        predicate: RequestMatch,
    },
    StubRequestsRemoveAll,
    StubRequestsUnused,
    StubRequestsAll,

    RewriteMatching {
        #[serde(rename = "match", default)]
        predicate: RequestMatch,
        #[serde(default)]
        rewrite: RewritePlan,
        #[serde(default)]
        iterations: Option<u32>,
    },
    RewriteRequestsRemove {
        #[serde(alias = "id")]
        ids: RuleIds,
    },
    RewriteRequestsRemoveAll,

    ThrottleMatching {
        #[serde(rename = "match", default)]
        predicate: RequestMatch,
        /// Seconds
        delay: f64,
    },
    ThrottleRemove {
        #[serde(alias = "id")]
        ids: RuleIds,
    },
    ThrottleRemoveAll,

    CookieBlockMatching {
        #[serde(rename = "match", default)]
        predicate: RequestMatch,
        #[serde(default)]
        iterations: Option<u32>,
    },
    CookieBlockRemove {
        #[serde(alias = "id")]
        ids: RuleIds,
    },
    CookieBlockRemoveAll,

    MonitorMatching {
        #[serde(rename = "match", default)]
        predicate: RequestMatch,
    },
    MonitorRemove {
        #[serde(alias = "id")]
        ids: RuleIds,
    },
    MonitorRemoveAll,
    MonitorPeek,
    MonitorFlush,

    DefaultsSet {
        defaults: StubDefaults,
    },
    DefaultsReset,

    /// Drop all rules and the monitor log
    Reset,
}

impl Command {
    /// Every accepted value of the `command` tag.
    pub const NAMES: &'static [&'static str] = &[
        "stubMatching",
        "stubRequestsRemove",
        "stubRequestsRemoveMatching",
        "stubRequestsRemoveAll",
        "stubRequestsUnused",
        "stubRequestsAll",
        "rewriteMatching",
        "rewriteRequestsRemove",
        "rewriteRequestsRemoveAll",
        "throttleMatching",
        "throttleRemove",
        "throttleRemoveAll",
        "cookieBlockMatching",
        "cookieBlockRemove",
        "cookieBlockRemoveAll",
        "monitorMatching",
        "monitorRemove",
        "monitorRemoveAll",
        "monitorPeek",
        "monitorFlush",
        "defaultsSet",
        "defaultsReset",
        "reset",
    ];

    /// Parse a JSON command, distinguishing an unknown command name from a
    /// malformed payload.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let name = value
            .get("command")
            .and_then(|c| c.as_str())
            .ok_or_else(|| InterceptError::UnknownCommand("<missing>".to_string()))?;
        if !Self::NAMES.contains(&name) {
            return Err(InterceptError::UnknownCommand(name.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// One id or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleIds {
    One(RuleId),
    Many(Vec<RuleId>),
}

impl RuleIds {
    pub fn into_vec(self) -> Vec<RuleId> {
        match self {
            RuleIds::One(id) => vec![id],
            RuleIds::Many(ids) => ids,
        }
    }
}

/// Entry of an unused-rules reply. Predicates cannot be JSON object keys,
/// so the map is sent as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedRule {
    #[serde(rename = "match")]
    pub predicate: RequestMatch,
    pub remaining: u32,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Reply to a command, encoded as the result envelope with a JSON payload
/// in `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandReply {
    envelope: ResultEnvelope,
}

impl CommandReply {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const INTERNAL_ERROR: u16 = 500;

    fn json(status: u16, payload: &[u8]) -> Self {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            envelope: ResultEnvelope::new(status, headers, payload),
        }
    }

    pub fn ok<T: Serialize>(result: &T) -> Self {
        match serde_json::to_vec(result) {
            Ok(payload) => Self::json(Self::OK, &payload),
            Err(e) => Self::error(Self::INTERNAL_ERROR, &format!("Failed to encode result: {e}")),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        let body = ErrorBody {
            errors: vec![ErrorDetail {
                code: status.to_string(),
                message: message.to_string(),
            }],
        };
        let payload = serde_json::to_vec(&body).unwrap_or_else(|_| b"{}".to_vec());
        Self::json(status, &payload)
    }

    pub fn status(&self) -> u16 {
        self.envelope.response_code
    }

    pub fn is_success(&self) -> bool {
        self.status() == Self::OK
    }

    pub fn envelope(&self) -> &ResultEnvelope {
        &self.envelope
    }

    /// Decode the JSON payload carried in `data`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let payload = self.envelope.decoded_data()?;
        Ok(serde_json::from_slice(&payload)?)
    }
}

impl From<ResultEnvelope> for CommandReply {
    fn from(envelope: ResultEnvelope) -> Self {
        Self { envelope }
    }
}
