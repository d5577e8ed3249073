use crate::exchange::{Exchange, HttpRequest, HttpResponse};
use crate::predicate::CompiledRequestMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed exchange recorded by a monitor rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredRequest {
    pub original_request: HttpRequest,
    /// Request after rewrites
    pub final_request: HttpRequest,
    /// Response actually delivered
    pub response: HttpResponse,
    pub original_response_status: u16,
    pub timestamp: DateTime<Utc>,
    pub request_duration_seconds: f64,
    pub was_stubbed: bool,
    pub was_rewritten: bool,
}

impl MonitoredRequest {
    pub fn request_string(&self) -> String {
        self.final_request.body_string()
    }

    pub fn response_string(&self) -> String {
        self.response.body_string()
    }

    /// Request body parsed as JSON, if it is JSON.
    pub fn request_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.final_request.body).ok()
    }

    /// Response body parsed as JSON, if it is JSON.
    pub fn response_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.response.body).ok()
    }

    /// Evaluate `predicate` against the original request and the delivered
    /// response.
    pub fn matches(&self, predicate: &CompiledRequestMatch) -> bool {
        let exchange = Exchange::new(self.original_request.clone(), self.response.clone());
        predicate.matches(&exchange)
    }
}
