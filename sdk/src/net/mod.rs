pub mod connect;
pub mod rpc;
