use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tonic::{Code, Request, Response, Status, Streaming};
use tracing::{debug, info};

use crate::net::rpc::grpc::Empty;
use crate::net::rpc::grpc::sdk_server::Sdk as SdkService;

/// What the local sidecar has been told so far.
#[derive(Debug, Default)]
pub struct SidecarRecord {
    ready_calls: AtomicU64,
    shutdown_calls: AtomicU64,
    health_streams: AtomicU64,
    health_messages: AtomicU64,
}

impl SidecarRecord {
    pub fn ready_calls(&self) -> u64 {
        return self.ready_calls.load(Ordering::SeqCst);
    }

    pub fn shutdown_calls(&self) -> u64 {
        return self.shutdown_calls.load(Ordering::SeqCst);
    }

    pub fn health_streams(&self) -> u64 {
        return self.health_streams.load(Ordering::SeqCst);
    }

    pub fn health_messages(&self) -> u64 {
        return self.health_messages.load(Ordering::SeqCst);
    }
}

/// Serves the sidecar's `SDK` service, recording every call. Can be told to
/// reject `Ready` and `Shutdown` with a fixed status code.
#[derive(Clone)]
pub struct LocalSidecar {
    record: Arc<SidecarRecord>,
    rejection: Option<Code>,
}

impl LocalSidecar {
    pub fn new() -> Self {
        return LocalSidecar { record: Arc::new(SidecarRecord::default()), rejection: None };
    }

    pub fn rejecting_with(code: Code) -> Self {
        return LocalSidecar { record: Arc::new(SidecarRecord::default()), rejection: Some(code) };
    }

    pub fn record(&self) -> Arc<SidecarRecord> {
        return self.record.clone();
    }

    fn reject_if_configured(&self, call: &str) -> Result<(), Status> {
        return match self.rejection {
            Some(code) => Err(Status::new(code, format!("{} rejected by local sidecar", call))),
            None => Ok(()),
        };
    }
}

#[tonic::async_trait]
impl SdkService for LocalSidecar {
    async fn ready(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        self.record.ready_calls.fetch_add(1, Ordering::SeqCst);
        self.reject_if_configured("Ready")?;

        info!("game server reported ready");
        return Ok(Response::new(Empty {}));
    }

    async fn shutdown(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        self.record.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.reject_if_configured("Shutdown")?;

        info!("game server reported shutdown");
        return Ok(Response::new(Empty {}));
    }

    async fn health(&self, request: Request<Streaming<Empty>>) -> Result<Response<Empty>, Status> {
        self.record.health_streams.fetch_add(1, Ordering::SeqCst);
        let mut stream = request.into_inner();

        while stream.message().await?.is_some() {
            let total = self.record.health_messages.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(total, "liveness signal received");
        }

        debug!("health stream closed by the game server");
        return Ok(Response::new(Empty {}));
    }
}
