//! Monitored exchanges and the log that buffers them until flushed.

mod log;
mod types;

pub use log::MonitorLog;
pub use types::MonitoredRequest;
