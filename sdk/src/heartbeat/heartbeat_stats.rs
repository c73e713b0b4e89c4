use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by the heartbeat loop. Shared with the caller so failures
/// that never stop the loop still stay observable.
#[derive(Debug, Default)]
pub struct HeartbeatStats {
    signals_written: AtomicU64,
    write_failures: AtomicU64,
    check_timeouts: AtomicU64,
    check_faults: AtomicU64,
    unhealthy_answers: AtomicU64,
}

impl HeartbeatStats {
    pub fn new() -> Self {
        return HeartbeatStats::default();
    }

    pub(crate) fn record_signal_written(&self) {
        self.signals_written.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_check_timeout(&self) {
        self.check_timeouts.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_check_fault(&self) {
        self.check_faults.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_unhealthy_answer(&self) {
        self.unhealthy_answers.fetch_add(1, Ordering::SeqCst);
    }

    pub fn signals_written(&self) -> u64 {
        return self.signals_written.load(Ordering::SeqCst);
    }

    pub fn write_failures(&self) -> u64 {
        return self.write_failures.load(Ordering::SeqCst);
    }

    pub fn check_timeouts(&self) -> u64 {
        return self.check_timeouts.load(Ordering::SeqCst);
    }

    pub fn check_faults(&self) -> u64 {
        return self.check_faults.load(Ordering::SeqCst);
    }

    pub fn unhealthy_answers(&self) -> u64 {
        return self.unhealthy_answers.load(Ordering::SeqCst);
    }
}
