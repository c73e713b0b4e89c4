//! Errors surfaced by the sidecar client.

use std::time::Duration;

use thiserror::Error;
use tonic::Status;

use crate::net::connect::host_and_port::HostAndPort;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("could not connect to the sidecar at {address} within {waited:?}")]
    Connection { address: HostAndPort, waited: Duration },

    #[error("invalid sidecar address {address}")]
    InvalidAddress {
        address: HostAndPort,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("sidecar call failed: {0}")]
    Rpc(#[from] Status),

    #[error("not connected to the sidecar, connect must succeed first")]
    NotConnected,

    #[error("health stream to the sidecar is closed")]
    HealthStreamClosed,

    #[error("health stream to the sidecar did not take a signal within {waited:?}")]
    HealthStreamStalled { waited: Duration },

    #[error("already connected to the sidecar")]
    AlreadyConnected,

    #[error("heartbeat has already been started for this client")]
    HeartbeatAlreadyStarted,
}

pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use std::error::Error;

    use tonic::{Code, Status};
    use tonic::transport::Endpoint;

    use crate::error::SdkError;
    use crate::net::connect::host_and_port::HostAndPort;

    #[test]
    fn connection_error_names_the_address() {
        let error = SdkError::Connection {
            address: HostAndPort::localhost(59357),
            waited: Duration::from_secs(30),
        };

        assert!(error.to_string().contains("127.0.0.1:59357"));
    }

    #[test]
    fn rpc_error_from_status() {
        let error = SdkError::from(Status::unavailable("sidecar is gone"));

        assert!(matches!(&error, SdkError::Rpc(status) if status.code() == Code::Unavailable));
        assert!(error.to_string().contains("sidecar is gone"));
    }

    #[test]
    fn invalid_address_keeps_the_transport_error_as_source() {
        let address = HostAndPort::localhost(59357);
        let source = match Endpoint::from_shared("http://not a host:59357".to_string()) {
            Ok(_) => panic!("a host with spaces must not form a uri"),
            Err(err) => err,
        };

        let error = SdkError::InvalidAddress { address, source };

        assert!(error.to_string().contains("127.0.0.1:59357"));
        assert!(error.source().is_some());
    }
}
