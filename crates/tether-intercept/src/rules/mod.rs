//! Rules and the per-kind rule store.

mod kind;
mod store;
mod types;

pub use kind::RuleKind;
pub use store::RuleStore;
pub use types::{Applied, Iterations, Rule, RuleId};
