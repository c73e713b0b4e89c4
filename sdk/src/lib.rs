//! Client library a game server process uses to report its lifecycle to the
//! local sidecar: ready, healthy (a periodic heartbeat) and shutting down.

pub mod error;
pub mod health;
pub mod heartbeat;
pub mod net;
pub mod sdk;
pub mod sdk_config;
pub mod sidecar;

pub use error::{SdkError, SdkResult};
pub use health::health_check::{AlwaysHealthy, BlockingHealthCheck, HealthCheck, HealthCheckType};
pub use heartbeat::heartbeat_stats::HeartbeatStats;
pub use net::connect::host_and_port::HostAndPort;
pub use sdk::Sdk;
pub use sdk_config::SdkConfig;
