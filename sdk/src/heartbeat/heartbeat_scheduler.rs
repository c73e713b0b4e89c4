use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::error::{SdkError, SdkResult};
use crate::health::bounded_invoker::{BoundedInvoker, InvocationOutcome};
use crate::health::health_check::HealthCheckType;
use crate::heartbeat::health_channel::HealthChannelType;
use crate::heartbeat::heartbeat_stats::HeartbeatStats;

/// Drives the heartbeat: once per period it runs the health check through a
/// [`BoundedInvoker`], writes one liveness signal and sleeps for whatever is
/// left of the period.
///
/// The loop only ever ends through [`HeartbeatScheduler::stop`] (or drop);
/// a scheduler can be started once.
pub struct HeartbeatScheduler {
    invoker: Arc<BoundedInvoker>,
    channel: HealthChannelType,
    stats: Arc<HeartbeatStats>,
    gate_on_health_outcome: bool,
    keep_running: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl HeartbeatScheduler {
    pub fn new(health_check: HealthCheckType,
               channel: HealthChannelType,
               period: Duration,
               gate_on_health_outcome: bool,
               stats: Arc<HeartbeatStats>) -> Self {

        return HeartbeatScheduler {
            invoker: Arc::new(BoundedInvoker::new(health_check, period)),
            channel,
            stats,
            gate_on_health_outcome,
            keep_running: Arc::new(AtomicBool::new(true)),
            stop_signal: Arc::new(Notify::new()),
            handle: None,
        };
    }

    pub fn start(&mut self) -> SdkResult<()> {
        if self.handle.is_some() {
            return Err(SdkError::HeartbeatAlreadyStarted);
        }

        let heartbeat = Heartbeat {
            invoker: self.invoker.clone(),
            channel: self.channel.clone(),
            stats: self.stats.clone(),
            gate_on_health_outcome: self.gate_on_health_outcome,
            keep_running: self.keep_running.clone(),
            stop_signal: self.stop_signal.clone(),
        };
        self.handle = Some(tokio::spawn(heartbeat.run()));
        return Ok(());
    }

    pub fn stop(&self) {
        self.keep_running.store(false, Ordering::SeqCst);
        self.stop_signal.notify_one();
    }

    /// Stops the loop and waits until it has exited, so nothing writes to the
    /// health channel afterwards.
    pub async fn stop_and_wait(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "heartbeat loop did not exit cleanly");
            }
        }
    }

    pub fn is_started(&self) -> bool {
        return self.handle.is_some();
    }

    pub fn is_running(&self) -> bool {
        return match &self.handle {
            Some(handle) => !handle.is_finished(),
            None => false,
        };
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Heartbeat {
    invoker: Arc<BoundedInvoker>,
    channel: HealthChannelType,
    stats: Arc<HeartbeatStats>,
    gate_on_health_outcome: bool,
    keep_running: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
}

impl Heartbeat {
    async fn run(self) {
        info!(period = ?self.invoker.get_timeout(), "heartbeat started");
        loop {
            if !self.keep_running.load(Ordering::SeqCst) {
                info!("heartbeat stopped");
                return;
            }

            let invocation = self.invoker.invoke().await;
            if self.should_signal(invocation.get_outcome()) {
                self.signal().await;
            }

            let pause = invocation.get_remaining_budget();
            if pause.is_zero() {
                // back-to-back cycles still give other tasks a turn
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    _ = time::sleep(pause) => {}
                    _ = self.stop_signal.notified() => {}
                }
            }
        }
    }

    fn should_signal(&self, outcome: InvocationOutcome) -> bool {
        return match outcome {
            InvocationOutcome::Answered(true) => true,
            InvocationOutcome::Answered(false) => {
                self.stats.record_unhealthy_answer();
                !self.gate_on_health_outcome
            }
            InvocationOutcome::TimedOut => {
                self.stats.record_check_timeout();
                true
            }
            InvocationOutcome::Faulted => {
                self.stats.record_check_fault();
                true
            }
        };
    }

    async fn signal(&self) {
        match self.channel.write().await {
            Ok(()) => {
                self.stats.record_signal_written();
                debug!("liveness signal written");
            }
            Err(err) => {
                self.stats.record_write_failure();
                warn!(error = %err, "could not write liveness signal");
            }
        }
    }
}
