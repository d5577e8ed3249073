//! Tests for the engine module.
//!
//! Scenario coverage for:
//! - Stub stacking and iteration budgets
//! - Rewrite pre-flight and post-flight ordering
//! - Throttle and stub timing interplay
//! - Cookie blocking and monitoring
//! - Engine construction from configuration

use super::*;
use crate::config::{Config, StubDefaults};
use crate::exchange::{Exchange, HttpRequest, HttpResponse};
use crate::predicate::RequestMatch;
use crate::rewrite::RewritePlan;
use crate::rules::RuleKind;
use crate::stub::{StubSpec, DOWNLOAD_SPEED_EDGE};
use std::time::Duration;

fn get(url: &str) -> Exchange {
    Exchange::pending(HttpRequest::new("GET", url))
}

fn stubbed_body(decision: &Decision) -> String {
    decision.final_response.body_string()
}

#[test]
fn test_lifo_stacking_with_iterations() {
    let engine = InterceptEngine::new();
    let predicate = RequestMatch::url("example.com");

    engine
        .add_stub_spec(predicate.clone(), StubSpec::new("A"), None)
        .unwrap();
    engine
        .add_stub_spec(predicate.clone(), StubSpec::new("B"), Some(1))
        .unwrap();
    engine
        .add_stub_spec(predicate, StubSpec::new("C"), Some(2))
        .unwrap();

    let bodies: Vec<String> = (0..5)
        .map(|_| stubbed_body(&engine.evaluate(&get("https://example.com/x"))))
        .collect();
    assert_eq!(bodies, vec!["C", "C", "B", "A", "A"]);
    assert_eq!(engine.rule_count(RuleKind::Stub), 1);
}

#[test]
fn test_finite_stub_exhausts() {
    let engine = InterceptEngine::new();
    engine
        .add_stub_spec(RequestMatch::url("example"), StubSpec::new("stub"), Some(2))
        .unwrap();

    let ex = get("https://example.com");
    assert!(engine.evaluate(&ex).was_stubbed);
    assert!(engine.evaluate(&ex).was_stubbed);

    let third = engine.evaluate(&ex);
    assert!(!third.was_stubbed);
    assert_eq!(third.final_response, ex.response);
}

#[test]
fn test_zero_iterations_never_stubs() {
    let engine = InterceptEngine::new();
    engine
        .add_stub_spec(RequestMatch::url("example"), StubSpec::new("never"), Some(0))
        .unwrap();

    for _ in 0..3 {
        assert!(!engine.evaluate(&get("https://example.com")).was_stubbed);
    }
    assert!(engine.unused_finite_stubs().is_empty());
}

#[test]
fn test_unused_finite_stubs_reports_remaining_budget() {
    let engine = InterceptEngine::new();
    let hit = RequestMatch::url("hit");
    let miss = RequestMatch::url("miss");
    engine.add_stub_spec(hit.clone(), StubSpec::new("h"), Some(3)).unwrap();
    engine.add_stub_spec(miss.clone(), StubSpec::new("m"), Some(2)).unwrap();
    engine
        .add_stub_spec(RequestMatch::url("forever"), StubSpec::new("f"), None)
        .unwrap();

    engine.evaluate(&get("https://hit.test"));

    let unused = engine.unused_finite_stubs();
    assert_eq!(unused.len(), 2);
    assert_eq!(unused.get(&hit), Some(&2));
    assert_eq!(unused.get(&miss), Some(&2));
}

#[test]
fn test_remove_stubs_matching_leaves_other_predicates() {
    let engine = InterceptEngine::new();
    let target = RequestMatch::url("example.com");
    engine.add_stub_spec(target.clone(), StubSpec::new("a"), None).unwrap();
    engine.add_stub_spec(target.clone(), StubSpec::new("b"), Some(1)).unwrap();
    engine
        .add_stub_spec(RequestMatch::url("example"), StubSpec::new("fallback"), None)
        .unwrap();

    assert!(engine.remove_stubs_matching(&target));
    assert!(!engine.remove_stubs_matching(&target));

    let decision = engine.evaluate(&get("https://example.com"));
    assert_eq!(decision.final_response.body_string(), "fallback");
}

#[test]
fn test_reset_keeps_defaults() {
    let engine = InterceptEngine::new();
    let mut defaults = engine.defaults();
    defaults.status_code = 404;
    engine.set_defaults(defaults);
    engine.add_monitor(RequestMatch::new()).unwrap();
    engine.add_cookie_block(RequestMatch::new(), None).unwrap();
    engine.add_rewrite(RequestMatch::new(), RewritePlan::new(), None).unwrap();
    engine.evaluate(&get("https://example.com"));

    engine.reset();

    for kind in RuleKind::ALL {
        assert_eq!(engine.rule_count(kind), 0);
    }
    assert!(engine.flush_monitored().is_empty());
    assert_eq!(engine.defaults().status_code, 404);
}

#[test]
fn test_rewrite_url_before_dispatch() {
    let engine = InterceptEngine::new();
    engine
        .add_rewrite(
            RequestMatch::url("example.com"),
            RewritePlan::new()
                .with_url_replacement("param2=val2", "param2a=val2a")
                .with_url_replacement("param1=val1", "param1a=val1a")
                .with_request_header("Authorization", "")
                .with_request_replacement("secret", "redacted"),
            None,
        )
        .unwrap();

    let exchange = Exchange::pending(
        HttpRequest::new("POST", "https://example.com/?param1=val1&param2=val2")
            .with_header("Authorization", "Bearer x")
            .with_body("secret=1"),
    );
    let decision = engine.evaluate(&exchange);

    assert!(decision.was_rewritten);
    assert_eq!(
        decision.final_request.url,
        "https://example.com/?param1a=val1a&param2a=val2a"
    );
    assert!(decision.final_request.header("authorization").is_none());
    assert_eq!(decision.final_request.body_string(), "redacted=1");
}

#[test]
fn test_rewrite_alters_stubbed_response() {
    let engine = InterceptEngine::new();
    let predicate = RequestMatch::url("example.com");
    engine
        .add_stub_spec(predicate.clone(), StubSpec::new("hello world").with_status(200), None)
        .unwrap();
    engine
        .add_rewrite(
            predicate,
            RewritePlan::new()
                .with_response_replacement("world", "tether")
                .with_response_header("X-Rewritten", "yes")
                .with_status_code(202),
            None,
        )
        .unwrap();

    let decision = engine.evaluate(&get("https://example.com"));
    assert!(decision.was_stubbed);
    assert!(decision.was_rewritten);
    assert_eq!(stubbed_body(&decision), "hello tether");
    assert_eq!(decision.final_response.status, 202);
    assert_eq!(decision.final_response.header("x-rewritten"), Some("yes"));
}

#[test]
fn test_rules_select_against_original_request() {
    let engine = InterceptEngine::new();
    engine
        .add_rewrite(
            RequestMatch::url("old-host"),
            RewritePlan::new().with_url_replacement("old-host", "new-host"),
            None,
        )
        .unwrap();
    engine
        .add_stub_spec(RequestMatch::url("new-host"), StubSpec::new("x"), None)
        .unwrap();

    let decision = engine.evaluate(&get("https://old-host.test/a"));
    assert_eq!(decision.final_request.url, "https://new-host.test/a");
    assert!(!decision.was_stubbed);
}

#[test]
fn test_throttle_overrides_stub_timing_in_either_order() {
    for throttle_first in [true, false] {
        let engine = InterceptEngine::new();
        let predicate = RequestMatch::url("example");
        if throttle_first {
            engine.add_throttle(predicate.clone(), 5.0).unwrap();
        }
        engine
            .add_stub_spec(predicate.clone(), StubSpec::new("x"), None)
            .unwrap();
        if !throttle_first {
            engine.add_throttle(predicate, 5.0).unwrap();
        }

        let decision = engine.evaluate(&get("https://example.com"));
        assert!(decision.was_stubbed);
        assert!(decision.was_throttled);
        assert!(decision.extra_delay_seconds >= 5.0);
    }
}

#[test]
fn test_stub_throughput_timing() {
    let engine = InterceptEngine::new();
    engine
        .add_stub_spec(
            RequestMatch::new(),
            StubSpec::new(vec![0u8; 32 * 1024]).with_response_time(DOWNLOAD_SPEED_EDGE),
            None,
        )
        .unwrap();

    // 32 KB at 16 KB/s
    let decision = engine.evaluate(&get("https://example.com"));
    assert_eq!(decision.extra_delay_seconds, 2.0);
    assert!(!decision.was_throttled);
}

#[test]
fn test_failure_stub() {
    let engine = InterceptEngine::new();
    engine
        .add_stub_spec(RequestMatch::url("offline"), StubSpec::failure(-1009), None)
        .unwrap();

    let decision = engine.evaluate(&get("https://offline.test"));
    assert!(decision.was_stubbed);
    assert_eq!(decision.failure_code, Some(-1009));

    let normal = engine.evaluate(&get("https://online.test"));
    assert_eq!(normal.failure_code, None);
}

#[test]
fn test_cookie_block_strips_cookies() {
    let engine = InterceptEngine::new();
    engine
        .add_cookie_block(RequestMatch::url("tracker"), Some(1))
        .unwrap();

    let exchange = Exchange::new(
        HttpRequest::new("GET", "https://tracker.test").with_header("Cookie", "id=1"),
        HttpResponse::new(200).with_header("set-cookie", "id=2"),
    );

    let decision = engine.evaluate(&exchange);
    assert!(decision.block_cookies);
    assert!(decision.final_request.header("cookie").is_none());
    assert!(decision.final_response.header("Set-Cookie").is_none());

    // Single iteration consumed.
    let again = engine.evaluate(&exchange);
    assert!(!again.block_cookies);
    assert_eq!(again.final_request.header("Cookie"), Some("id=1"));
}

#[test]
fn test_composability_single_monitor_entry() {
    let engine = InterceptEngine::new();
    let predicate = RequestMatch::url("example.com");
    engine
        .add_stub_spec(predicate.clone(), StubSpec::new("stubbed"), None)
        .unwrap();
    engine
        .add_rewrite(
            predicate.clone(),
            RewritePlan::new().with_url_replacement("/v1/", "/v2/"),
            None,
        )
        .unwrap();
    engine.add_monitor(predicate).unwrap();

    engine.evaluate(&get("https://example.com/v1/users"));

    let entries = engine.flush_monitored();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.original_request.url, "https://example.com/v1/users");
    assert_eq!(entry.final_request.url, "https://example.com/v2/users");
    assert!(entry.was_stubbed);
    assert!(entry.was_rewritten);
    assert_eq!(entry.response_string(), "stubbed");
}

#[test]
fn test_monitor_duration_includes_scheduled_delay() {
    let engine = InterceptEngine::new();
    engine.add_monitor(RequestMatch::new()).unwrap();
    engine.add_throttle(RequestMatch::new(), 1.5).unwrap();

    let exchange = get("https://example.com").with_elapsed(Duration::from_millis(250));
    engine.evaluate(&exchange);

    let entries = engine.peek_monitored();
    assert_eq!(entries[0].request_duration_seconds, 1.75);
    assert_eq!(entries[0].original_response_status, 200);
}

#[test]
fn test_unmonitored_exchange_not_logged() {
    let engine = InterceptEngine::new();
    engine.add_monitor(RequestMatch::url("watched")).unwrap();

    let decision = engine.evaluate(&get("https://other.test"));
    assert!(!decision.was_monitored);
    assert!(engine.peek_monitored().is_empty());
}

#[test]
fn test_defaults_apply_at_registration() {
    let engine = InterceptEngine::new();
    engine.set_defaults(StubDefaults {
        status_code: 503,
        ..Default::default()
    });
    engine
        .add_stub_spec(RequestMatch::url("first"), StubSpec::new("x"), None)
        .unwrap();

    engine.reset_defaults();
    assert_eq!(engine.defaults(), StubDefaults::default());
    engine
        .add_stub_spec(RequestMatch::url("second"), StubSpec::new("x"), None)
        .unwrap();

    assert_eq!(engine.evaluate(&get("https://first.test")).final_response.status, 503);
    assert_eq!(engine.evaluate(&get("https://second.test")).final_response.status, 200);
}

#[test]
fn test_remove_and_remove_all() {
    let engine = InterceptEngine::new();
    let a = engine
        .add_stub_spec(RequestMatch::url("a"), StubSpec::new("a"), None)
        .unwrap();
    let b = engine
        .add_rewrite(RequestMatch::url("b"), RewritePlan::new(), None)
        .unwrap();

    assert!(engine.remove_stub(&a));
    assert!(!engine.remove_stub(&a));
    assert!(!engine.evaluate(&get("https://a.test")).was_stubbed);

    assert!(engine.remove_rewrites(&[b]));
    assert!(!engine.remove_all_rewrites());

    engine.add_throttle(RequestMatch::new(), 1.0).unwrap();
    engine.add_cookie_block(RequestMatch::new(), None).unwrap();
    assert!(engine.remove_all_throttles());
    assert!(engine.remove_all_cookie_blocks());
    assert!(!engine.remove_all_monitors());
}

#[test]
fn test_invalid_inputs_rejected() {
    let engine = InterceptEngine::new();
    assert!(engine
        .add_stub_spec(RequestMatch::url("("), StubSpec::new("x"), None)
        .is_err());
    assert!(engine
        .add_stub_spec(RequestMatch::new(), StubSpec::new(serde_json::json!("scalar")), None)
        .is_err());
    assert!(engine.add_throttle(RequestMatch::new(), -2.0).is_err());
    assert!(engine
        .add_rewrite(RequestMatch::new(), RewritePlan::new().with_status_code(5), None)
        .is_err());
    assert_eq!(engine.rule_count(RuleKind::Stub), 0);
}

#[test]
fn test_from_config() {
    let yaml = r#"
defaults:
  statusCode: 201
stubs:
  - match:
      url: "users"
    response:
      body:
        text: "from config"
rewrites:
  - match:
      url: "users"
    rewrite:
      responseHeadersReplacement:
        X-Source: config
throttles:
  - match:
      url: "users"
    delay: 0.5
monitors:
  - match: {}
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    let engine = InterceptEngine::from_config(&config).unwrap();

    let decision = engine.evaluate(&get("https://api.test/users"));
    assert_eq!(stubbed_body(&decision), "from config");
    assert_eq!(decision.final_response.status, 201);
    assert_eq!(decision.final_response.header("X-Source"), Some("config"));
    assert_eq!(decision.extra_delay_seconds, 0.5);
    assert_eq!(engine.peek_monitored().len(), 1);
}
