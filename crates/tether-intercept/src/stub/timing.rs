//! Stub response timing.
//!
//! Timing travels as a single number: a non-negative value is the time in
//! seconds to deliver the whole response, a negative value is a transfer
//! rate in KB/s.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// GPRS download speed (56 kbit/s).
pub const DOWNLOAD_SPEED_GPRS: f64 = -56.0 / 8.0;
/// EDGE download speed (128 kbit/s).
pub const DOWNLOAD_SPEED_EDGE: f64 = -128.0 / 8.0;
/// 3G download speed (3200 kbit/s).
pub const DOWNLOAD_SPEED_3G: f64 = -3200.0 / 8.0;
/// 3G+ download speed (7200 kbit/s).
pub const DOWNLOAD_SPEED_3G_PLUS: f64 = -7200.0 / 8.0;
/// Wi-Fi download speed (12000 kbit/s).
pub const DOWNLOAD_SPEED_WIFI: f64 = -12000.0 / 8.0;

/// Decoded response timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum ResponseTime {
    /// Deliver the whole response after this long
    Fixed(Duration),
    /// Deliver at this many kilobytes per second
    Throughput { kbps: f64 },
}

impl Default for ResponseTime {
    fn default() -> Self {
        ResponseTime::Fixed(Duration::ZERO)
    }
}

impl From<f64> for ResponseTime {
    fn from(value: f64) -> Self {
        if value < 0.0 {
            ResponseTime::Throughput { kbps: -value }
        } else {
            // NaN and overflow collapse to an immediate response.
            ResponseTime::Fixed(Duration::try_from_secs_f64(value).unwrap_or_default())
        }
    }
}

impl From<ResponseTime> for f64 {
    fn from(value: ResponseTime) -> Self {
        match value {
            ResponseTime::Fixed(d) => d.as_secs_f64(),
            ResponseTime::Throughput { kbps } => -kbps,
        }
    }
}

impl ResponseTime {
    /// Delivery delay for a body of `len` bytes.
    pub fn delay_for(&self, len: usize) -> Duration {
        match *self {
            ResponseTime::Fixed(d) => d,
            ResponseTime::Throughput { kbps } => {
                let secs = len as f64 / (kbps * 1024.0);
                Duration::try_from_secs_f64(secs).unwrap_or_default()
            }
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, ResponseTime::Fixed(d) if d.is_zero())
    }
}
