use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tonic::{Request, Response, Status};
use tonic::transport::Channel;
use tracing::info;

use crate::error::{SdkError, SdkResult};
use crate::health::health_check::{AlwaysHealthy, HealthCheckType};
use crate::heartbeat::health_channel::{GrpcHealthChannel, HealthChannelType};
use crate::heartbeat::heartbeat_scheduler::HeartbeatScheduler;
use crate::heartbeat::heartbeat_stats::HeartbeatStats;
use crate::net::connect::connector::Connector;
use crate::net::rpc::grpc::Empty;
use crate::net::rpc::grpc::sdk_client::SdkClient;
use crate::sdk_config::SdkConfig;

struct Connection {
    client: SdkClient<Channel>,
    health_channel: HealthChannelType,
}

/// Client handle a game server uses to talk to its sidecar.
///
/// Typical use: [`connect`](Sdk::connect), [`start_heartbeat`](Sdk::start_heartbeat),
/// [`ready`](Sdk::ready) once players can join, [`shutdown`](Sdk::shutdown)
/// when done, then [`close`](Sdk::close).
pub struct Sdk {
    config: SdkConfig,
    health_check: HealthCheckType,
    stats: Arc<HeartbeatStats>,
    connection: Option<Connection>,
    heartbeat: Option<HeartbeatScheduler>,
}

impl Sdk {
    pub fn new(config: SdkConfig) -> Self {
        return Self::with_health_check(config, Arc::new(AlwaysHealthy::new()));
    }

    pub fn with_health_check(config: SdkConfig, health_check: HealthCheckType) -> Self {
        return Sdk {
            config,
            health_check,
            stats: Arc::new(HeartbeatStats::new()),
            connection: None,
            heartbeat: None,
        };
    }

    /// Waits up to the configured connect timeout for the sidecar, then opens
    /// the health stream. A client connects once; a second call fails with
    /// [`SdkError::AlreadyConnected`] and leaves the open stream in place.
    pub async fn connect(&mut self) -> SdkResult<()> {
        if self.connection.is_some() {
            return Err(SdkError::AlreadyConnected);
        }

        let connector = Connector::new(
            self.config.get_address(),
            self.config.get_connect_timeout(),
            self.config.get_connect_poll_interval(),
        );
        let channel = connector.connect().await?;

        let client = SdkClient::new(channel);
        let health_channel: HealthChannelType = Arc::new(GrpcHealthChannel::open(
            client.clone(),
            self.config.get_health_check_period(),
        ));
        self.connection = Some(Connection { client, health_channel });
        return Ok(());
    }

    pub fn is_connected(&self) -> bool {
        return self.connection.is_some();
    }

    /// Marks the game server ready. Does not start the heartbeat.
    pub async fn ready(&self) -> SdkResult<()> {
        let mut client = self.client()?;
        let deadline = self.config.get_rpc_deadline();
        within_deadline(deadline, client.ready(request_with_deadline(deadline))).await?;

        info!("game server marked ready");
        return Ok(());
    }

    pub async fn shutdown(&self) -> SdkResult<()> {
        let mut client = self.client()?;
        let deadline = self.config.get_rpc_deadline();
        within_deadline(deadline, client.shutdown(request_with_deadline(deadline))).await?;

        info!("game server marked for shutdown");
        return Ok(());
    }

    /// Writes a single liveness signal on the health stream, waiting at most
    /// one health check period for the stream to take it.
    pub async fn health(&self) -> SdkResult<()> {
        let connection = self.connection.as_ref().ok_or(SdkError::NotConnected)?;
        return connection.health_channel.write().await;
    }

    pub fn start_heartbeat(&mut self) -> SdkResult<()> {
        if let Some(heartbeat) = self.heartbeat.as_mut() {
            return heartbeat.start();
        }

        let connection = self.connection.as_ref().ok_or(SdkError::NotConnected)?;
        let mut heartbeat = HeartbeatScheduler::new(
            self.health_check.clone(),
            connection.health_channel.clone(),
            self.config.get_health_check_period(),
            self.config.is_gated_on_health_outcome(),
            self.stats.clone(),
        );
        heartbeat.start()?;
        self.heartbeat = Some(heartbeat);
        return Ok(());
    }

    /// Asks the heartbeat to stop; it exits at the top of its next cycle.
    pub fn stop(&self) {
        if let Some(heartbeat) = &self.heartbeat {
            heartbeat.stop();
        }
    }

    /// Stops the heartbeat, waits for it to exit and then closes the health
    /// stream and the connection.
    pub async fn close(mut self) {
        if let Some(heartbeat) = self.heartbeat.as_mut() {
            heartbeat.stop_and_wait().await;
        }
        self.connection = None;
    }

    pub fn heartbeat_stats(&self) -> Arc<HeartbeatStats> {
        return self.stats.clone();
    }

    pub fn get_config(&self) -> &SdkConfig {
        return &self.config;
    }

    fn client(&self) -> SdkResult<SdkClient<Channel>> {
        return match &self.connection {
            Some(connection) => Ok(connection.client.clone()),
            None => Err(SdkError::NotConnected),
        };
    }
}

fn request_with_deadline(deadline: Duration) -> Request<Empty> {
    let mut request = Request::new(Empty {});
    request.set_timeout(deadline);
    return request;
}

async fn within_deadline<F>(deadline: Duration, call: F) -> SdkResult<Response<Empty>>
    where F: Future<Output=Result<Response<Empty>, Status>> {
    return match time::timeout(deadline, call).await {
        Ok(response) => Ok(response?),
        Err(_) => Err(SdkError::Rpc(
            Status::deadline_exceeded(format!("sidecar did not answer within {:?}", deadline))
        )),
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tonic::Code;

    use crate::error::SdkError;
    use crate::health::health_check::AlwaysHealthy;
    use crate::net::connect::host_and_port::HostAndPort;
    use crate::sdk::{request_with_deadline, Sdk, within_deadline};
    use crate::sdk_config::SdkConfig;

    #[tokio::test]
    async fn calls_before_connect_are_rejected() {
        let mut sdk = Sdk::with_health_check(SdkConfig::default(), Arc::new(AlwaysHealthy::new()));

        assert!(!sdk.is_connected());
        assert!(matches!(sdk.ready().await, Err(SdkError::NotConnected)));
        assert!(matches!(sdk.shutdown().await, Err(SdkError::NotConnected)));
        assert!(matches!(sdk.health().await, Err(SdkError::NotConnected)));
        assert!(matches!(sdk.start_heartbeat(), Err(SdkError::NotConnected)));
    }

    #[tokio::test]
    async fn stop_and_close_without_heartbeat() {
        let sdk = Sdk::new(SdkConfig::default());

        sdk.stop();
        sdk.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn connect_to_unreachable_sidecar_fails() {
        let config = SdkConfig::default()
            .with_address(HostAndPort::localhost(59391))
            .with_connect_timeout(Duration::from_millis(200))
            .with_connect_poll_interval(Duration::from_millis(50));
        let mut sdk = Sdk::new(config);

        let result = sdk.connect().await;

        assert!(matches!(result, Err(SdkError::Connection { .. })));
        assert!(!sdk.is_connected());
    }

    #[test]
    fn request_carries_the_deadline() {
        let request = request_with_deadline(Duration::from_secs(30));

        assert!(request.metadata().get("grpc-timeout").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn call_exceeding_the_deadline_is_deadline_exceeded() {
        let call = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, tonic::Status>(tonic::Response::new(crate::net::rpc::grpc::Empty {}))
        };

        let result = within_deadline(Duration::from_secs(30), call).await;

        assert!(matches!(result, Err(SdkError::Rpc(status)) if status.code() == Code::DeadlineExceeded));
    }
}
