//! Per-exchange evaluation.
//!
//! Every kind selects its rule against the captured exchange as it arrived,
//! before any modification. Effects are then applied in a fixed order:
//! rewrite pre-flight, stub substitution, rewrite post-flight, throttle,
//! cookie block, monitor append.

use super::core::InterceptEngine;
use crate::delivery::scheduled_delay;
use crate::exchange::{self, Exchange, HttpRequest, HttpResponse};
use crate::monitor::MonitoredRequest;
use crate::stub::ResponseTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the interception layer should do with an exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub final_request: HttpRequest,
    pub final_response: HttpResponse,
    /// Delay before the response is delivered
    pub extra_delay_seconds: f64,
    /// Response time carried by the applied stub, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<ResponseTime>,
    /// Set when the applied stub is a synthetic connection failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<i64>,
    pub block_cookies: bool,
    pub was_stubbed: bool,
    pub was_rewritten: bool,
    pub was_throttled: bool,
    pub was_monitored: bool,
}

impl InterceptEngine {
    /// Decide the fate of one captured exchange.
    ///
    /// Never fails: a kind without a matching rule leaves the exchange
    /// untouched for that kind. Matching finite rules are consumed.
    pub fn evaluate(&self, exchange: &Exchange) -> Decision {
        let monitor = self.monitors.take_best_match(exchange);
        let rewrite = self.rewrites.take_best_match(exchange);

        let mut final_request = exchange.request.clone();
        if let Some(applied) = &rewrite {
            let plan = &applied.payload;
            final_request.url = plan.rewrite_url(&final_request.url);
            final_request.headers = plan.rewrite_request_headers(&final_request.headers);
            final_request.body = plan.rewrite_request_body(&final_request.body);
        }

        let stub = self.stubs.take_best_match(exchange);
        let mut final_response = match &stub {
            Some(applied) => applied.payload.to_http_response(),
            None => exchange.response.clone(),
        };

        if let Some(applied) = &rewrite {
            let plan = &applied.payload;
            final_response.body = plan.rewrite_response_body(&final_response.body);
            final_response.headers = plan.rewrite_response_headers(&final_response.headers);
            final_response.status = plan.rewrite_status(final_response.status);
        }

        let throttle = self.throttles.take_best_match(exchange);
        let response_time = stub.as_ref().map(|s| s.payload.response_time);
        let failure_code = stub
            .as_ref()
            .filter(|s| s.payload.is_failure())
            .map(|s| s.payload.failure_code);
        let delay = scheduled_delay(
            throttle.as_ref().map(|t| t.payload.delay),
            response_time,
            final_response.body.len(),
        );

        let block_cookies = self.cookie_blocks.take_best_match(exchange).is_some();
        if block_cookies {
            exchange::remove_header(&mut final_request.headers, "Cookie");
            exchange::remove_header(&mut final_response.headers, "Set-Cookie");
        }

        let decision = Decision {
            final_request,
            final_response,
            extra_delay_seconds: delay.as_secs_f64(),
            response_time,
            failure_code,
            block_cookies,
            was_stubbed: stub.is_some(),
            was_rewritten: rewrite.is_some(),
            was_throttled: throttle.is_some(),
            was_monitored: monitor.is_some(),
        };

        debug!(
            url = %exchange.request.url,
            method = %exchange.request.method,
            stubbed = decision.was_stubbed,
            rewritten = decision.was_rewritten,
            throttled = decision.was_throttled,
            block_cookies = decision.block_cookies,
            monitored = decision.was_monitored,
            delay_ms = delay.as_millis() as u64,
            "Exchange evaluated"
        );

        if decision.was_monitored {
            self.monitor_log.append(MonitoredRequest {
                original_request: exchange.request.clone(),
                final_request: decision.final_request.clone(),
                response: decision.final_response.clone(),
                original_response_status: exchange.response.status,
                timestamp: Utc::now(),
                request_duration_seconds: exchange.elapsed.as_secs_f64() + decision.extra_delay_seconds,
                was_stubbed: decision.was_stubbed,
                was_rewritten: decision.was_rewritten,
            });
        }

        decision
    }
}
