//! An in-process stand-in for the sidecar, for local development and tests.

pub mod local_sidecar;
pub mod service_registration;
