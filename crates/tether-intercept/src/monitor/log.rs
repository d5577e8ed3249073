use super::types::MonitoredRequest;
use parking_lot::Mutex;
use tracing::debug;

/// Append-only buffer of monitored exchanges, drained by `flush_all`.
///
/// Append, peek and flush share one lock, so no entry can slip in between
/// a peek and the flush that follows it.
#[derive(Debug, Default)]
pub struct MonitorLog {
    entries: Mutex<Vec<MonitoredRequest>>,
}

impl MonitorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entry: MonitoredRequest) {
        self.entries.lock().push(entry);
    }

    /// Snapshot in append order. Does not modify the log.
    pub fn peek_all(&self) -> Vec<MonitoredRequest> {
        self.entries.lock().clone()
    }

    /// Drain the log, returning entries in append order.
    pub fn flush_all(&self) -> Vec<MonitoredRequest> {
        let drained = std::mem::take(&mut *self.entries.lock());
        debug!(count = drained.len(), "Monitor log flushed");
        drained
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
