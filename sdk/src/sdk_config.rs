use std::time::Duration;

use tracing::warn;

use crate::net::connect::host_and_port::HostAndPort;

pub const SIDECAR_HOST_ENV: &str = "AGONES_SDK_GRPC_HOST";
pub const SIDECAR_PORT_ENV: &str = "AGONES_SDK_GRPC_PORT";
pub const CONNECT_TIMEOUT_ENV: &str = "AGONES_SDK_CONNECT_TIMEOUT_SECONDS";
pub const RPC_DEADLINE_ENV: &str = "AGONES_SDK_RPC_DEADLINE_SECONDS";
pub const HEALTH_CHECK_PERIOD_ENV: &str = "AGONES_SDK_HEALTH_PERIOD_SECONDS";

/// Settings for talking to the sidecar.
///
/// `health_check_period` is both the nominal interval between liveness
/// signals and the upper bound a single health check may take.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    address: HostAndPort,
    connect_timeout: Duration,
    connect_poll_interval: Duration,
    rpc_deadline: Duration,
    health_check_period: Duration,
    gate_on_health_outcome: bool,
}

impl SdkConfig {
    const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
    const DEFAULT_CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(500);
    const DEFAULT_RPC_DEADLINE: Duration = Duration::from_secs(30);
    const DEFAULT_HEALTH_CHECK_PERIOD: Duration = Duration::from_secs(10);

    pub fn new(address: HostAndPort,
               connect_timeout: Duration,
               rpc_deadline: Duration,
               health_check_period: Duration) -> Self {

        return SdkConfig {
            address,
            connect_timeout,
            connect_poll_interval: Self::DEFAULT_CONNECT_POLL_INTERVAL,
            rpc_deadline,
            health_check_period: Self::non_zero("health_check_period", health_check_period, Self::DEFAULT_HEALTH_CHECK_PERIOD),
            gate_on_health_outcome: false,
        };
    }

    pub fn default() -> Self {
        return Self::new(
            HostAndPort::default_sidecar(),
            Self::DEFAULT_CONNECT_TIMEOUT,
            Self::DEFAULT_RPC_DEADLINE,
            Self::DEFAULT_HEALTH_CHECK_PERIOD,
        );
    }

    /// Defaults overridden by the `AGONES_SDK_*` environment variables.
    pub fn from_env() -> Self {
        return Self::from_lookup(|name| std::env::var(name).ok());
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String> {

        let mut config = Self::default();

        let mut host = config.address.host().to_string();
        Self::apply_string(&lookup, SIDECAR_HOST_ENV, &mut host);
        let mut port = config.address.port();
        Self::apply_parse(&lookup, SIDECAR_PORT_ENV, &mut port);
        match HostAndPort::try_new(&host, port) {
            Ok(address) => config.address = address,
            Err(err) => warn!(%host, error = %err, "ignoring invalid sidecar host"),
        }

        Self::apply_seconds(&lookup, CONNECT_TIMEOUT_ENV, &mut config.connect_timeout);
        Self::apply_seconds(&lookup, RPC_DEADLINE_ENV, &mut config.rpc_deadline);
        Self::apply_seconds(&lookup, HEALTH_CHECK_PERIOD_ENV, &mut config.health_check_period);
        return config;
    }

    pub fn with_address(mut self, address: HostAndPort) -> Self {
        self.address = address;
        return self;
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        return self;
    }

    /// A zero interval is ignored, the current one is kept.
    pub fn with_connect_poll_interval(mut self, connect_poll_interval: Duration) -> Self {
        self.connect_poll_interval = Self::non_zero("connect_poll_interval", connect_poll_interval, self.connect_poll_interval);
        return self;
    }

    pub fn with_rpc_deadline(mut self, rpc_deadline: Duration) -> Self {
        self.rpc_deadline = rpc_deadline;
        return self;
    }

    /// A zero period is ignored, the current one is kept.
    pub fn with_health_check_period(mut self, health_check_period: Duration) -> Self {
        self.health_check_period = Self::non_zero("health_check_period", health_check_period, self.health_check_period);
        return self;
    }

    /// When enabled, a cycle whose health check answers `false` writes no
    /// liveness signal. Timeouts and faulted checks still signal.
    pub fn with_health_outcome_gating(mut self, gate_on_health_outcome: bool) -> Self {
        self.gate_on_health_outcome = gate_on_health_outcome;
        return self;
    }

    pub fn get_address(&self) -> HostAndPort {
        return self.address;
    }

    pub fn get_connect_timeout(&self) -> Duration {
        return self.connect_timeout;
    }

    pub fn get_connect_poll_interval(&self) -> Duration {
        return self.connect_poll_interval;
    }

    pub fn get_rpc_deadline(&self) -> Duration {
        return self.rpc_deadline;
    }

    pub fn get_health_check_period(&self) -> Duration {
        return self.health_check_period;
    }

    pub fn is_gated_on_health_outcome(&self) -> bool {
        return self.gate_on_health_outcome;
    }

    fn apply_string<F>(lookup: &F, name: &str, target: &mut String)
        where F: Fn(&str) -> Option<String> {
        if let Some(value) = lookup(name) {
            *target = value;
        }
    }

    fn apply_parse<F, T>(lookup: &F, name: &str, target: &mut T)
        where F: Fn(&str) -> Option<String>,
              T: std::str::FromStr {
        if let Some(value) = lookup(name) {
            match value.parse() {
                Ok(parsed) => *target = parsed,
                Err(_) => warn!(variable = name, %value, "ignoring unparseable sdk setting"),
            }
        }
    }

    fn apply_seconds<F>(lookup: &F, name: &str, target: &mut Duration)
        where F: Fn(&str) -> Option<String> {
        let mut seconds = target.as_secs();
        Self::apply_parse(lookup, name, &mut seconds);
        *target = Self::non_zero(name, Duration::from_secs(seconds), *target);
    }

    fn non_zero(name: &str, candidate: Duration, current: Duration) -> Duration {
        if candidate.is_zero() {
            warn!(setting = name, kept = ?current, "ignoring zero duration for sdk setting");
            return current;
        }
        return candidate;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::net::connect::host_and_port::HostAndPort;
    use crate::sdk_config::{CONNECT_TIMEOUT_ENV, HEALTH_CHECK_PERIOD_ENV, RPC_DEADLINE_ENV, SdkConfig, SIDECAR_HOST_ENV, SIDECAR_PORT_ENV};

    fn lookup_in(variables: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        return move |name: &str| variables.get(name).map(|value| value.to_string());
    }

    #[test]
    fn default_config() {
        let config = SdkConfig::default();

        assert_eq!(HostAndPort::localhost(59357), config.get_address());
        assert_eq!(Duration::from_secs(30), config.get_connect_timeout());
        assert_eq!(Duration::from_secs(30), config.get_rpc_deadline());
        assert_eq!(Duration::from_secs(10), config.get_health_check_period());
        assert!(!config.is_gated_on_health_outcome());
    }

    #[test]
    fn config_from_empty_environment_is_default() {
        let config = SdkConfig::from_lookup(lookup_in(HashMap::new()));

        assert_eq!(HostAndPort::localhost(59357), config.get_address());
        assert_eq!(Duration::from_secs(10), config.get_health_check_period());
    }

    #[test]
    fn config_overridden_by_environment() {
        let config = SdkConfig::from_lookup(lookup_in(HashMap::from([
            (SIDECAR_HOST_ENV, "::1"),
            (SIDECAR_PORT_ENV, "7070"),
            (CONNECT_TIMEOUT_ENV, "5"),
            (RPC_DEADLINE_ENV, "6"),
            (HEALTH_CHECK_PERIOD_ENV, "2"),
        ])));

        assert_eq!(HostAndPort::try_new("::1", 7070).unwrap(), config.get_address());
        assert_eq!(Duration::from_secs(5), config.get_connect_timeout());
        assert_eq!(Duration::from_secs(6), config.get_rpc_deadline());
        assert_eq!(Duration::from_secs(2), config.get_health_check_period());
    }

    #[test]
    fn unparseable_environment_values_are_ignored() {
        let config = SdkConfig::from_lookup(lookup_in(HashMap::from([
            (SIDECAR_HOST_ENV, "not-an-ip"),
            (SIDECAR_PORT_ENV, "seventy"),
            (HEALTH_CHECK_PERIOD_ENV, "-1"),
        ])));

        assert_eq!(HostAndPort::localhost(59357), config.get_address());
        assert_eq!(Duration::from_secs(10), config.get_health_check_period());
    }

    #[test]
    fn config_with_builders() {
        let config = SdkConfig::default()
            .with_address(HostAndPort::localhost(7071))
            .with_connect_timeout(Duration::from_millis(200))
            .with_connect_poll_interval(Duration::from_millis(20))
            .with_rpc_deadline(Duration::from_millis(300))
            .with_health_check_period(Duration::from_millis(100))
            .with_health_outcome_gating(true);

        assert_eq!(HostAndPort::localhost(7071), config.get_address());
        assert_eq!(Duration::from_millis(200), config.get_connect_timeout());
        assert_eq!(Duration::from_millis(20), config.get_connect_poll_interval());
        assert_eq!(Duration::from_millis(300), config.get_rpc_deadline());
        assert_eq!(Duration::from_millis(100), config.get_health_check_period());
        assert!(config.is_gated_on_health_outcome());
    }

    #[test]
    fn zero_seconds_in_environment_keep_the_defaults() {
        let config = SdkConfig::from_lookup(lookup_in(HashMap::from([
            (CONNECT_TIMEOUT_ENV, "0"),
            (RPC_DEADLINE_ENV, "0"),
            (HEALTH_CHECK_PERIOD_ENV, "0"),
        ])));

        assert_eq!(Duration::from_secs(30), config.get_connect_timeout());
        assert_eq!(Duration::from_secs(30), config.get_rpc_deadline());
        assert_eq!(Duration::from_secs(10), config.get_health_check_period());
    }

    #[test]
    fn zero_period_and_poll_interval_are_ignored_by_builders() {
        let config = SdkConfig::default()
            .with_health_check_period(Duration::from_millis(100))
            .with_health_check_period(Duration::ZERO)
            .with_connect_poll_interval(Duration::ZERO);

        assert_eq!(Duration::from_millis(100), config.get_health_check_period());
        assert_eq!(Duration::from_millis(500), config.get_connect_poll_interval());
    }
}
