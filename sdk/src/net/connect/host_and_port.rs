use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Loopback address and well-known port the sidecar listens on by default.
pub const DEFAULT_SIDECAR_PORT: u16 = 59357;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HostAndPort {
    host: IpAddr,
    port: u16,
}

impl HostAndPort {
    pub fn new(host: IpAddr, port: u16) -> HostAndPort {
        return HostAndPort { host, port };
    }

    pub fn localhost(port: u16) -> HostAndPort {
        return HostAndPort::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
    }

    pub fn default_sidecar() -> HostAndPort {
        return HostAndPort::localhost(DEFAULT_SIDECAR_PORT);
    }

    pub fn try_new(host: &str, port: u16) -> Result<HostAndPort, std::net::AddrParseError> {
        let host: IpAddr = host.parse()?;
        return Ok(HostAndPort::new(host, port));
    }

    pub fn with_port(&self, port: u16) -> HostAndPort {
        return HostAndPort::new(self.host, port);
    }

    pub fn as_string_with_http(&self) -> String {
        return format!("http://{}", self.as_socket_address());
    }

    pub fn as_socket_address(&self) -> SocketAddr {
        return SocketAddr::new(self.host, self.port);
    }

    pub fn host(&self) -> IpAddr {
        return self.host;
    }

    pub fn port(&self) -> u16 {
        return self.port;
    }
}

impl Display for HostAndPort {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.as_socket_address())
    }
}
