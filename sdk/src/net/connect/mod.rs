pub mod host_and_port;
pub mod connector;
