use std::sync::Arc;

use async_trait::async_trait;

/// Answers whether the game server is healthy right now.
///
/// Implementations may be slow, may never return and may panic; the
/// heartbeat only ever runs them through a
/// [`BoundedInvoker`](crate::health::bounded_invoker::BoundedInvoker).
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn is_healthy(&self) -> bool;
}

pub type HealthCheckType = Arc<dyn HealthCheck>;

/// Used when the caller supplies no health check.
pub struct AlwaysHealthy {}

#[async_trait]
impl HealthCheck for AlwaysHealthy {
    async fn is_healthy(&self) -> bool {
        return true;
    }
}

impl AlwaysHealthy {
    pub fn new() -> AlwaysHealthy {
        return AlwaysHealthy {};
    }
}

/// Adapts a plain blocking closure into a [`HealthCheck`].
///
/// The closure runs on tokio's blocking pool. A closure that never returns
/// cannot be reclaimed when its invocation times out; it keeps its blocking
/// thread until it finishes.
pub struct BlockingHealthCheck<F>
    where F: Fn() -> bool + Send + Sync + 'static {
    check: Arc<F>,
}

impl<F> BlockingHealthCheck<F>
    where F: Fn() -> bool + Send + Sync + 'static {
    pub fn new(check: F) -> BlockingHealthCheck<F> {
        return BlockingHealthCheck { check: Arc::new(check) };
    }
}

#[async_trait]
impl<F> HealthCheck for BlockingHealthCheck<F>
    where F: Fn() -> bool + Send + Sync + 'static {
    async fn is_healthy(&self) -> bool {
        let check = self.check.clone();
        return match tokio::task::spawn_blocking(move || check()).await {
            Ok(healthy) => healthy,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => false,
        };
    }
}
