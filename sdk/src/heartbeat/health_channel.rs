use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::mpsc::Sender;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::Channel;
use tracing::{debug, warn};

use crate::error::{SdkError, SdkResult};
use crate::net::rpc::grpc::Empty;
use crate::net::rpc::grpc::sdk_client::SdkClient;

/// Where liveness signals go. Each `write` is one "still alive" message.
#[async_trait]
pub trait HealthChannel: Send + Sync {
    async fn write(&self) -> SdkResult<()>;
}

pub type HealthChannelType = Arc<dyn HealthChannel>;

/// The long-lived `Health` client stream to the sidecar.
///
/// Messages are handed to the stream through a bounded queue, so writes
/// keep their order. A write waits at most `write_timeout` for room in the
/// queue and fails with [`SdkError::HealthStreamStalled`] otherwise. Once the
/// stream ends (sidecar gone, transport error) every later write fails with
/// [`SdkError::HealthStreamClosed`]. Dropping the channel ends the stream.
pub struct GrpcHealthChannel {
    sender: Sender<Empty>,
    write_timeout: Duration,
}

impl GrpcHealthChannel {
    const PENDING_SIGNALS: usize = 1;

    pub fn open(mut client: SdkClient<Channel>, write_timeout: Duration) -> GrpcHealthChannel {
        let (sender, receiver) = mpsc::channel(Self::PENDING_SIGNALS);

        tokio::spawn(async move {
            match client.health(ReceiverStream::new(receiver)).await {
                Ok(_) => debug!("health stream completed"),
                Err(status) => warn!(%status, "health stream ended with an error"),
            }
        });
        return Self::new(sender, write_timeout);
    }

    fn new(sender: Sender<Empty>, write_timeout: Duration) -> GrpcHealthChannel {
        return GrpcHealthChannel { sender, write_timeout };
    }
}

#[async_trait]
impl HealthChannel for GrpcHealthChannel {
    async fn write(&self) -> SdkResult<()> {
        return match self.sender.send_timeout(Empty {}, self.write_timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => Err(SdkError::HealthStreamStalled { waited: self.write_timeout }),
            Err(SendTimeoutError::Closed(_)) => Err(SdkError::HealthStreamClosed),
        };
    }
}
