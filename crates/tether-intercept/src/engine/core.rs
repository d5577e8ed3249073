//! Core engine struct and the control-plane command surface.

use crate::config::{Config, StubDefaults};
use crate::error::Result;
use crate::exchange;
use crate::monitor::{MonitorLog, MonitoredRequest};
use crate::predicate::RequestMatch;
use crate::rewrite::RewritePlan;
use crate::rules::{Iterations, RuleId, RuleKind, RuleStore};
use crate::stub::{StubResponse, StubSpec};
use crate::throttle::Throttle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// An installed stub as reported to the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStub {
    pub id: RuleId,
    #[serde(rename = "match")]
    pub predicate: RequestMatch,
    pub response: StubResponse,
    /// `None` when unlimited
    pub remaining: Iterations,
}

/// Rule engine shared by the control plane (rule mutations) and the data
/// plane (one [`evaluate`](InterceptEngine::evaluate) call per exchange).
///
/// Every method takes `&self`; wrap the engine in an `Arc` to share it.
pub struct InterceptEngine {
    pub(super) stubs: RuleStore<StubResponse>,
    pub(super) rewrites: RuleStore<RewritePlan>,
    pub(super) throttles: RuleStore<Throttle>,
    pub(super) cookie_blocks: RuleStore<()>,
    pub(super) monitors: RuleStore<()>,
    pub(super) monitor_log: MonitorLog,
    defaults: RwLock<StubDefaults>,
}

impl Default for InterceptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InterceptEngine {
    pub fn new() -> Self {
        Self::with_defaults(StubDefaults::default())
    }

    pub fn with_defaults(defaults: StubDefaults) -> Self {
        Self {
            stubs: RuleStore::new(RuleKind::Stub),
            rewrites: RuleStore::new(RuleKind::Rewrite),
            throttles: RuleStore::new(RuleKind::Throttle),
            cookie_blocks: RuleStore::new(RuleKind::CookieBlock),
            monitors: RuleStore::new(RuleKind::Monitor),
            monitor_log: MonitorLog::new(),
            defaults: RwLock::new(defaults),
        }
    }

    /// Build an engine with the configured defaults and every preloaded
    /// rule installed in file order.
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = Self::with_defaults(config.defaults.clone());

        for entry in &config.stubs {
            match &entry.file {
                Some(path) => {
                    let mut headers = entry.response.headers.clone();
                    if let Some(content_type) = &entry.response.content_type {
                        exchange::set_header(&mut headers, "Content-Type", content_type);
                    }
                    engine.add_stub_file(
                        entry.predicate.clone(),
                        path,
                        headers,
                        entry.response.status_code,
                        entry.response.response_time,
                        entry.iterations,
                    )?;
                }
                None => {
                    engine.add_stub_spec(
                        entry.predicate.clone(),
                        entry.response.clone(),
                        entry.iterations,
                    )?;
                }
            }
        }
        for entry in &config.rewrites {
            engine.add_rewrite(entry.predicate.clone(), entry.rewrite.clone(), entry.iterations)?;
        }
        for entry in &config.throttles {
            engine.add_throttle(entry.predicate.clone(), entry.delay)?;
        }
        for entry in &config.cookie_blocks {
            engine.add_cookie_block(entry.predicate.clone(), entry.iterations)?;
        }
        for entry in &config.monitors {
            engine.add_monitor(entry.predicate.clone())?;
        }

        info!(rules = config.rule_count(), "Engine initialized from configuration");
        Ok(engine)
    }

    // ===== Stubs =====

    pub fn add_stub(
        &self,
        predicate: RequestMatch,
        response: StubResponse,
        iterations: Iterations,
    ) -> Result<RuleId> {
        self.stubs.add(predicate, response, iterations)
    }

    /// Resolve `spec` against the current defaults and register it.
    pub fn add_stub_spec(
        &self,
        predicate: RequestMatch,
        spec: StubSpec,
        iterations: Iterations,
    ) -> Result<RuleId> {
        let response = StubResponse::from_spec(spec, &self.defaults.read())?;
        self.add_stub(predicate, response, iterations)
    }

    pub fn add_stub_file(
        &self,
        predicate: RequestMatch,
        path: &Path,
        headers: exchange::Headers,
        status_code: Option<u16>,
        response_time: Option<f64>,
        iterations: Iterations,
    ) -> Result<RuleId> {
        let response = StubResponse::from_file(
            path,
            headers,
            status_code,
            response_time,
            &self.defaults.read(),
        )?;
        self.add_stub(predicate, response, iterations)
    }

    pub fn remove_stub(&self, id: &RuleId) -> bool {
        self.stubs.remove(id)
    }

    pub fn remove_stubs(&self, ids: &[RuleId]) -> bool {
        self.stubs.remove_many(ids)
    }

    /// Remove every stub registered with exactly this predicate.
    pub fn remove_stubs_matching(&self, predicate: &RequestMatch) -> bool {
        self.stubs.remove_matching(predicate)
    }

    pub fn remove_all_stubs(&self) -> bool {
        self.stubs.remove_all()
    }

    /// Installed stubs in registration order.
    pub fn active_stubs(&self) -> Vec<ActiveStub> {
        self.stubs
            .snapshot()
            .into_iter()
            .map(|rule| ActiveStub {
                id: rule.id,
                predicate: rule.predicate,
                response: rule.payload,
                remaining: rule.remaining,
            })
            .collect()
    }

    pub fn unused_finite_stubs(&self) -> BTreeMap<RequestMatch, u32> {
        self.stubs.unused_finite_rules()
    }

    // ===== Rewrites =====

    pub fn add_rewrite(
        &self,
        predicate: RequestMatch,
        plan: RewritePlan,
        iterations: Iterations,
    ) -> Result<RuleId> {
        plan.validate()?;
        self.rewrites.add(predicate, plan, iterations)
    }

    pub fn remove_rewrite(&self, id: &RuleId) -> bool {
        self.rewrites.remove(id)
    }

    pub fn remove_rewrites(&self, ids: &[RuleId]) -> bool {
        self.rewrites.remove_many(ids)
    }

    pub fn remove_all_rewrites(&self) -> bool {
        self.rewrites.remove_all()
    }

    pub fn unused_finite_rewrites(&self) -> BTreeMap<RequestMatch, u32> {
        self.rewrites.unused_finite_rules()
    }

    // ===== Throttles =====

    pub fn add_throttle(&self, predicate: RequestMatch, delay_seconds: f64) -> Result<RuleId> {
        let throttle = Throttle::from_secs(delay_seconds)?;
        self.throttles.add(predicate, throttle, None)
    }

    pub fn remove_throttle(&self, id: &RuleId) -> bool {
        self.throttles.remove(id)
    }

    pub fn remove_throttles(&self, ids: &[RuleId]) -> bool {
        self.throttles.remove_many(ids)
    }

    pub fn remove_all_throttles(&self) -> bool {
        self.throttles.remove_all()
    }

    // ===== Cookie blocks =====

    pub fn add_cookie_block(&self, predicate: RequestMatch, iterations: Iterations) -> Result<RuleId> {
        self.cookie_blocks.add(predicate, (), iterations)
    }

    pub fn remove_cookie_block(&self, id: &RuleId) -> bool {
        self.cookie_blocks.remove(id)
    }

    pub fn remove_cookie_blocks(&self, ids: &[RuleId]) -> bool {
        self.cookie_blocks.remove_many(ids)
    }

    pub fn remove_all_cookie_blocks(&self) -> bool {
        self.cookie_blocks.remove_all()
    }

    pub fn unused_finite_cookie_blocks(&self) -> BTreeMap<RequestMatch, u32> {
        self.cookie_blocks.unused_finite_rules()
    }

    // ===== Monitors =====

    pub fn add_monitor(&self, predicate: RequestMatch) -> Result<RuleId> {
        self.monitors.add(predicate, (), None)
    }

    pub fn remove_monitor(&self, id: &RuleId) -> bool {
        self.monitors.remove(id)
    }

    pub fn remove_monitors(&self, ids: &[RuleId]) -> bool {
        self.monitors.remove_many(ids)
    }

    pub fn remove_all_monitors(&self) -> bool {
        self.monitors.remove_all()
    }

    pub fn peek_monitored(&self) -> Vec<MonitoredRequest> {
        self.monitor_log.peek_all()
    }

    pub fn flush_monitored(&self) -> Vec<MonitoredRequest> {
        self.monitor_log.flush_all()
    }

    // ===== Engine-wide =====

    /// Drop every rule of every kind and the monitor log. Stub defaults are
    /// left as they are.
    pub fn reset(&self) {
        self.stubs.remove_all();
        self.rewrites.remove_all();
        self.throttles.remove_all();
        self.cookie_blocks.remove_all();
        self.monitors.remove_all();
        let flushed = self.monitor_log.flush_all().len();
        info!(flushed, "Engine reset");
    }

    // ===== Defaults =====

    pub fn defaults(&self) -> StubDefaults {
        self.defaults.read().clone()
    }

    /// Replace the defaults used for stubs registered from now on.
    pub fn set_defaults(&self, defaults: StubDefaults) {
        *self.defaults.write() = defaults;
    }

    pub fn reset_defaults(&self) {
        self.defaults.write().reset_to_defaults();
    }

    /// Number of active rules of `kind`, inert ones included.
    pub fn rule_count(&self, kind: RuleKind) -> usize {
        match kind {
            RuleKind::Stub => self.stubs.len(),
            RuleKind::Rewrite => self.rewrites.len(),
            RuleKind::Throttle => self.throttles.len(),
            RuleKind::CookieBlock => self.cookie_blocks.len(),
            RuleKind::Monitor => self.monitors.len(),
        }
    }
}
