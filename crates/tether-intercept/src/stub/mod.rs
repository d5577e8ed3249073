//! Stub responses.
//!
//! A stub replaces the real response wholesale. Callers submit a
//! [`StubSpec`]; it is resolved against the engine's
//! [`StubDefaults`](crate::config::StubDefaults) into a [`StubResponse`] at
//! registration time, so later changes to the defaults never alter an
//! already-registered stub.

mod body;
mod response;
mod timing;

pub use body::StubBody;
pub use response::{ResultEnvelope, StubResponse, StubSpec};
pub use timing::{
    ResponseTime, DOWNLOAD_SPEED_3G, DOWNLOAD_SPEED_3G_PLUS, DOWNLOAD_SPEED_EDGE,
    DOWNLOAD_SPEED_GPRS, DOWNLOAD_SPEED_WIFI,
};
