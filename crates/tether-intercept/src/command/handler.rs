//! Command execution against a shared engine.

use super::types::{Command, CommandReply, UnusedRule};
use crate::engine::InterceptEngine;
use crate::error::{InterceptError, Result};
use crate::predicate::RequestMatch;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes control-plane commands. Cheap to clone; all clones drive the
/// same engine.
#[derive(Clone)]
pub struct CommandHandler {
    engine: Arc<InterceptEngine>,
}

impl CommandHandler {
    pub fn new(engine: Arc<InterceptEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<InterceptEngine> {
        &self.engine
    }

    /// Decode and execute a JSON command. Failures become error replies.
    pub fn handle_json(&self, bytes: &[u8]) -> CommandReply {
        match Command::from_json(bytes) {
            Ok(command) => self.handle(command),
            Err(e) => {
                warn!(error = %e, "Rejected command");
                CommandReply::error(CommandReply::BAD_REQUEST, &e.to_string())
            }
        }
    }

    pub fn handle(&self, command: Command) -> CommandReply {
        match self.execute(command) {
            Ok(result) => CommandReply::ok(&result),
            Err(e) => {
                warn!(error = %e, "Command failed");
                CommandReply::error(status_for(&e), &e.to_string())
            }
        }
    }

    fn execute(&self, command: Command) -> Result<Value> {
        let engine = &self.engine;
        debug!(command = ?command, "Executing command");

        let result = match command {
            Command::StubMatching {
                predicate,
                response,
                iterations,
            } => to_json(engine.add_stub_spec(predicate, response, iterations)?)?,
            Command::StubRequestsRemove { ids } => Value::Bool(engine.remove_stubs(&ids.into_vec())),
            Command::StubRequestsRemoveMatching { predicate } => {
                Value::Bool(engine.remove_stubs_matching(&predicate))
            }
            Command::StubRequestsRemoveAll => Value::Bool(engine.remove_all_stubs()),
            Command::StubRequestsUnused => to_json(unused_list(engine.unused_finite_stubs()))?,
            Command::StubRequestsAll => to_json(engine.active_stubs())?,

            Command::RewriteMatching {
                predicate,
                rewrite,
                iterations,
            } => to_json(engine.add_rewrite(predicate, rewrite, iterations)?)?,
            Command::RewriteRequestsRemove { ids } => {
                Value::Bool(engine.remove_rewrites(&ids.into_vec()))
            }
            Command::RewriteRequestsRemoveAll => Value::Bool(engine.remove_all_rewrites()),

            Command::ThrottleMatching { predicate, delay } => {
                to_json(engine.add_throttle(predicate, delay)?)?
            }
            Command::ThrottleRemove { ids } => Value::Bool(engine.remove_throttles(&ids.into_vec())),
            Command::ThrottleRemoveAll => Value::Bool(engine.remove_all_throttles()),

            Command::CookieBlockMatching {
                predicate,
                iterations,
            } => to_json(engine.add_cookie_block(predicate, iterations)?)?,
            Command::CookieBlockRemove { ids } => {
                Value::Bool(engine.remove_cookie_blocks(&ids.into_vec()))
            }
            Command::CookieBlockRemoveAll => Value::Bool(engine.remove_all_cookie_blocks()),

            Command::MonitorMatching { predicate } => to_json(engine.add_monitor(predicate)?)?,
            Command::MonitorRemove { ids } => Value::Bool(engine.remove_monitors(&ids.into_vec())),
            Command::MonitorRemoveAll => Value::Bool(engine.remove_all_monitors()),
            Command::MonitorPeek => to_json(engine.peek_monitored())?,
            Command::MonitorFlush => to_json(engine.flush_monitored())?,

            Command::DefaultsSet { defaults } => {
                engine.set_defaults(defaults);
                to_json(engine.defaults())?
            }
            Command::DefaultsReset => {
                engine.reset_defaults();
                to_json(engine.defaults())?
            }

            Command::Reset => {
                engine.reset();
                Value::Bool(true)
            }
        };
        Ok(result)
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn unused_list(unused: BTreeMap<RequestMatch, u32>) -> Vec<UnusedRule> {
    unused
        .into_iter()
        .map(|(predicate, remaining)| UnusedRule {
            predicate,
            remaining,
        })
        .collect()
}

fn status_for(error: &InterceptError) -> u16 {
    match error {
        InterceptError::Io(_) => CommandReply::INTERNAL_ERROR,
        _ => CommandReply::BAD_REQUEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{Exchange, HttpRequest};
    use crate::monitor::MonitoredRequest;
    use crate::rules::RuleId;

    fn handler() -> CommandHandler {
        CommandHandler::new(Arc::new(InterceptEngine::new()))
    }

    #[test]
    fn test_stub_lifecycle_over_json() {
        let handler = handler();

        let reply = handler.handle_json(
            br#"{"command": "stubMatching", "match": {"url": "example"},
                 "response": {"body": {"json": {"ok": true}}}, "iterations": 1}"#,
        );
        assert!(reply.is_success());
        let id: RuleId = reply.decode().unwrap();

        let unused: Vec<UnusedRule> = handler
            .handle_json(br#"{"command": "stubRequestsUnused"}"#)
            .decode()
            .unwrap();
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].remaining, 1);

        let decision = handler
            .engine()
            .evaluate(&Exchange::pending(HttpRequest::new("GET", "https://example.com")));
        assert_eq!(decision.final_response.body_string(), r#"{"ok":true}"#);

        // Already retired by its single iteration.
        let command = serde_json::json!({"command": "stubRequestsRemove", "id": id});
        let removed: bool = handler
            .handle_json(command.to_string().as_bytes())
            .decode()
            .unwrap();
        assert!(!removed);
    }

    #[test]
    fn test_active_stubs_and_remove_by_match() {
        let handler = handler();
        handler.handle_json(
            br#"{"command": "stubMatching", "match": {"url": "a"}, "response": {"body": {"text": "a"}}, "iterations": 2}"#,
        );
        handler.handle_json(
            br#"{"command": "stubMatching", "match": {"url": "b"}, "response": {"body": {"text": "b"}}}"#,
        );
        handler
            .engine()
            .evaluate(&Exchange::pending(HttpRequest::new("GET", "https://a.test")));

        let active: Vec<crate::engine::ActiveStub> = handler
            .handle_json(br#"{"command": "stubRequestsAll"}"#)
            .decode()
            .unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].predicate, RequestMatch::url("a"));
        assert_eq!(active[0].remaining, Some(1));
        assert_eq!(active[0].response.body.as_ref(), b"a");
        assert_eq!(active[1].remaining, None);

        let removed: bool = handler
            .handle_json(br#"{"command": "stubRequestsRemoveMatching", "match": {"url": "a"}}"#)
            .decode()
            .unwrap();
        assert!(removed);
        assert_eq!(handler.engine().active_stubs().len(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let handler = handler();
        handler.handle_json(br#"{"command": "monitorMatching", "match": {}}"#);
        handler.handle_json(br#"{"command": "throttleMatching", "match": {}, "delay": 1}"#);
        handler.handle_json(
            br#"{"command": "stubMatching", "match": {}, "response": {"body": {"text": "x"}}}"#,
        );
        handler
            .engine()
            .evaluate(&Exchange::pending(HttpRequest::new("GET", "https://a.test")));

        assert!(handler.handle_json(br#"{"command": "reset"}"#).is_success());
        let engine = handler.engine();
        assert!(engine.active_stubs().is_empty());
        assert!(engine.peek_monitored().is_empty());
        assert_eq!(engine.rule_count(crate::rules::RuleKind::Throttle), 0);
        assert_eq!(engine.rule_count(crate::rules::RuleKind::Monitor), 0);
    }

    #[test]
    fn test_monitor_peek_and_flush() {
        let handler = handler();
        handler.handle_json(br#"{"command": "monitorMatching", "match": {}}"#);
        handler
            .engine()
            .evaluate(&Exchange::pending(HttpRequest::new("GET", "https://a.test")));

        let peek = || -> Vec<MonitoredRequest> {
            handler
                .handle_json(br#"{"command": "monitorPeek"}"#)
                .decode()
                .unwrap()
        };
        assert_eq!(peek().len(), 1);
        assert_eq!(peek().len(), 1);

        let flushed: Vec<MonitoredRequest> = handler
            .handle_json(br#"{"command": "monitorFlush"}"#)
            .decode()
            .unwrap();
        assert_eq!(flushed.len(), 1);
        assert!(peek().is_empty());
    }

    #[test]
    fn test_errors_become_bad_request() {
        let handler = handler();

        let reply = handler.handle_json(b"{");
        assert_eq!(reply.status(), 400);

        let reply = handler.handle_json(br#"{"command": "nope"}"#);
        assert_eq!(reply.status(), 400);

        let reply = handler.handle_json(
            br#"{"command": "stubMatching", "match": {"url": "("}, "response": {}}"#,
        );
        assert_eq!(reply.status(), 400);
        let body: Value = reply.decode().unwrap();
        assert!(body["errors"][0]["message"]
            .as_str()
            .unwrap()
            .contains("Invalid pattern"));

        let reply = handler.handle_json(br#"{"command": "throttleMatching", "delay": -1}"#);
        assert_eq!(reply.status(), 400);
    }

    #[test]
    fn test_defaults_commands() {
        let handler = handler();
        let reply = handler.handle_json(br#"{"command": "defaultsSet", "defaults": {"statusCode": 418}}"#);
        let defaults: crate::config::StubDefaults = reply.decode().unwrap();
        assert_eq!(defaults.status_code, 418);

        let reply = handler.handle_json(br#"{"command": "defaultsReset"}"#);
        let defaults: crate::config::StubDefaults = reply.decode().unwrap();
        assert_eq!(defaults.status_code, 200);
    }
}
