use std::time::Duration;

use tokio::time;
use tokio::time::Instant;
use tracing::warn;

use crate::health::health_check::HealthCheckType;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InvocationOutcome {
    Answered(bool),
    TimedOut,
    Faulted,
}

/// Result of one bounded invocation: what the check said, and how much of
/// the period is left to sleep before the next cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BoundedInvocation {
    outcome: InvocationOutcome,
    remaining_budget: Duration,
}

impl BoundedInvocation {
    pub fn get_outcome(&self) -> InvocationOutcome {
        return self.outcome;
    }

    pub fn get_remaining_budget(&self) -> Duration {
        return self.remaining_budget;
    }
}

/// Runs a health check on its own task, waiting at most `timeout` for it.
///
/// A check that misses the deadline is aborted and the remaining budget is
/// zero, so the next cycle starts immediately. A check that panics is
/// contained in its task and keeps the regular cadence.
pub struct BoundedInvoker {
    health_check: HealthCheckType,
    timeout: Duration,
}

impl BoundedInvoker {
    pub fn new(health_check: HealthCheckType, timeout: Duration) -> Self {
        return BoundedInvoker { health_check, timeout };
    }

    pub async fn invoke(&self) -> BoundedInvocation {
        let started_at = Instant::now();
        let health_check = self.health_check.clone();
        let mut check = tokio::spawn(async move {
            return health_check.is_healthy().await;
        });

        let outcome = match time::timeout(self.timeout, &mut check).await {
            Ok(Ok(healthy)) => InvocationOutcome::Answered(healthy),
            Ok(Err(err)) => {
                warn!(error = %err, "health check faulted");
                InvocationOutcome::Faulted
            }
            Err(_) => {
                check.abort();
                warn!(timeout = ?self.timeout, "health check did not answer in time");
                InvocationOutcome::TimedOut
            }
        };

        let remaining_budget = match outcome {
            InvocationOutcome::TimedOut => Duration::ZERO,
            _ => self.timeout.saturating_sub(started_at.elapsed()),
        };
        return BoundedInvocation { outcome, remaining_budget };
    }

    pub fn get_timeout(&self) -> Duration {
        return self.timeout;
    }
}
