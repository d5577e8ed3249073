//! Preloaded rule entries.

use crate::predicate::RequestMatch;
use crate::rewrite::RewritePlan;
use crate::stub::StubSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StubRuleConfig {
    #[serde(rename = "match", default)]
    pub predicate: RequestMatch,
    #[serde(default)]
    pub response: StubSpec,
    /// Body loaded from this file instead of `response.body`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRuleConfig {
    #[serde(rename = "match", default)]
    pub predicate: RequestMatch,
    #[serde(default)]
    pub rewrite: RewritePlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleRuleConfig {
    #[serde(rename = "match", default)]
    pub predicate: RequestMatch,
    /// Delay in seconds
    pub delay: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieBlockRuleConfig {
    #[serde(rename = "match", default)]
    pub predicate: RequestMatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRuleConfig {
    #[serde(rename = "match", default)]
    pub predicate: RequestMatch,
}
