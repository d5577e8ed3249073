//! Request interception rule engine.
//!
//! Decides, for every outgoing request observed in an instrumented process,
//! whether it is stubbed, rewritten, throttled, cookie-blocked or recorded,
//! and manages the lifecycle of the rules producing those decisions.

// ===== Matching =====
pub mod exchange;
pub mod predicate;

// ===== Effects =====
pub mod rewrite;
pub mod stub;
pub mod throttle;

// ===== Rule lifecycle and evaluation =====
pub mod delivery;
pub mod engine;
pub mod monitor;
pub mod rules;

// ===== Control plane and configuration =====
pub mod command;
pub mod config;
pub mod error;

mod encoding;

pub use command::{Command, CommandHandler, CommandReply};
pub use config::{Config, StubDefaults};
pub use delivery::{deliver, Delivery, DeliveryPlan};
pub use engine::{ActiveStub, Decision, InterceptEngine};
pub use error::{InterceptError, Result};
pub use exchange::{Exchange, Headers, HttpRequest, HttpResponse};
pub use monitor::{MonitorLog, MonitoredRequest};
pub use predicate::{PatternMatcher, RequestMatch};
pub use rewrite::{RewritePlan, RewriteReplacement};
pub use rules::{RuleId, RuleKind, RuleStore};
pub use stub::{ResponseTime, ResultEnvelope, StubBody, StubResponse, StubSpec};
pub use throttle::Throttle;
