//! Scheduled delivery of an evaluated exchange.
//!
//! Delays are awaited with `tokio::time::sleep` after evaluation has
//! finished, so no rule-store or monitor-log lock is held while a response
//! is pending.

use crate::engine::Decision;
use crate::exchange::HttpResponse;
use crate::stub::ResponseTime;
use std::time::Duration;
use tracing::debug;

/// Outcome handed back to the interception layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Response(HttpResponse),
    /// Synthetic connection failure with the stub's failure code
    Failed { code: i64 },
}

/// Delivery delay for an exchange.
///
/// A throttle delay wins outright; otherwise the stub's response time is
/// applied to the body about to be delivered.
pub fn scheduled_delay(
    throttle: Option<Duration>,
    response_time: Option<ResponseTime>,
    body_len: usize,
) -> Duration {
    match (throttle, response_time) {
        (Some(delay), _) => delay,
        (None, Some(time)) => time.delay_for(body_len),
        (None, None) => Duration::ZERO,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryPlan {
    pub delay: Duration,
    pub outcome: Delivery,
}

impl DeliveryPlan {
    pub fn from_decision(decision: &Decision) -> Self {
        let delay = Duration::try_from_secs_f64(decision.extra_delay_seconds).unwrap_or_default();
        let outcome = match decision.failure_code {
            Some(code) => Delivery::Failed { code },
            None => Delivery::Response(decision.final_response.clone()),
        };
        Self { delay, outcome }
    }

    pub async fn run(self) -> Delivery {
        if !self.delay.is_zero() {
            debug!(delay_ms = self.delay.as_millis() as u64, "Delaying delivery");
            tokio::time::sleep(self.delay).await;
        }
        self.outcome
    }
}

/// Wait out the decision's delay, then yield its outcome.
pub async fn deliver(decision: &Decision) -> Delivery {
    DeliveryPlan::from_decision(decision).run().await
}
