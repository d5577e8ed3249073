//! Transport-agnostic command dispatch.
//!
//! The transport connecting the test process to the instrumented process
//! hands over JSON command bodies; replies come back in the result envelope
//! (`responseCode`, `responseHeaders`, base64 `data`).

mod handler;
mod types;

pub use handler::CommandHandler;
pub use types::{Command, CommandReply, RuleIds, UnusedRule};
