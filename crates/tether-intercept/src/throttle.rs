//! Throttle payload - fixed delay before response delivery.

use crate::encoding::duration_secs;
use crate::error::{InterceptError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed delivery delay. Overrides any response time carried by a stub for
/// the same exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Throttle {
    #[serde(with = "duration_secs")]
    pub delay: Duration,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Build from a delay in seconds. Negative or non-finite values are
    /// rejected.
    pub fn from_secs(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(InterceptError::InvalidConfig(format!(
                "throttle delay must be a non-negative number of seconds, got {seconds}"
            )));
        }
        Duration::try_from_secs_f64(seconds)
            .map(Self::new)
            .map_err(|e| InterceptError::InvalidConfig(format!("throttle delay: {e}")))
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.delay.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_secs() {
        let throttle = Throttle::from_secs(2.5).unwrap();
        assert_eq!(throttle.delay, Duration::from_millis(2500));
        assert_eq!(throttle.as_secs_f64(), 2.5);
        assert_eq!(Throttle::from_secs(0.0).unwrap().delay, Duration::ZERO);
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        assert!(matches!(
            Throttle::from_secs(-1.0),
            Err(InterceptError::InvalidConfig(_))
        ));
        assert!(Throttle::from_secs(f64::NAN).is_err());
        assert!(Throttle::from_secs(f64::INFINITY).is_err());
    }

    #[test]
    fn test_serde_seconds() {
        let throttle: Throttle = serde_json::from_str(r#"{"delay": 5}"#).unwrap();
        assert_eq!(throttle.delay, Duration::from_secs(5));
    }
}
