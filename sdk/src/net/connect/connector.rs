use std::time::Duration;

use tokio::time;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};

use crate::error::{SdkError, SdkResult};
use crate::net::connect::host_and_port::HostAndPort;

/// Establishes the transport channel to the sidecar, waiting for it to
/// become reachable for at most `wait_for_connected`.
pub struct Connector {
    address: HostAndPort,
    wait_for_connected: Duration,
    poll_interval: Duration,
}

impl Connector {
    pub fn new(address: HostAndPort, wait_for_connected: Duration, poll_interval: Duration) -> Self {
        return Connector {
            address,
            wait_for_connected,
            poll_interval,
        };
    }

    pub async fn connect(&self) -> SdkResult<Channel> {
        let endpoint = Endpoint::from_shared(self.address.as_string_with_http())
            .map_err(|source| SdkError::InvalidAddress { address: self.address, source })?;

        let address = self.address;
        let poll_interval = self.poll_interval;
        let attempts = async move {
            loop {
                match endpoint.connect().await {
                    Ok(channel) => return channel,
                    Err(err) => {
                        debug!(%address, error = %err, "sidecar is not reachable yet");
                        time::sleep(poll_interval).await;
                    }
                }
            }
        };

        return match time::timeout(self.wait_for_connected, attempts).await {
            Ok(channel) => {
                info!(%address, "connected to the sidecar");
                Ok(channel)
            }
            Err(_) => Err(SdkError::Connection {
                address,
                waited: self.wait_for_connected,
            }),
        };
    }
}
