use tokio::sync::mpsc;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::mpsc::error::SendError;
use tonic::transport::Server;
use tracing::info;

use crate::net::connect::host_and_port::HostAndPort;
use crate::net::rpc::grpc::sdk_server::SdkServer;
use crate::sidecar::local_sidecar::LocalSidecar;

pub struct ServiceRegistration {}

impl ServiceRegistration {
    /// Serves `sidecar` on `address` until the matching
    /// [`AllServicesShutdownHandle`] fires.
    pub async fn register_sidecar_on(address: &HostAndPort,
                                     sidecar: LocalSidecar,
                                     mut all_services_shutdown_signal_receiver: Receiver<()>) -> Result<(), tonic::transport::Error> {
        let mut server: Server = Server::builder();
        let router = server.add_service(SdkServer::new(sidecar));

        let shutdown_block = async move {
            let _ = all_services_shutdown_signal_receiver.recv().await;
        };

        info!(%address, "local sidecar listening");
        let result = router.serve_with_shutdown(address.as_socket_address(), shutdown_block).await;
        info!(%address, "local sidecar stopped");
        return result;
    }
}

pub struct AllServicesShutdownHandle {
    all_services_shutdown_signal_sender: Sender<()>,
}

impl AllServicesShutdownHandle {
    pub fn new() -> (AllServicesShutdownHandle, Receiver<()>) {
        let (all_services_shutdown_signal_sender, all_services_shutdown_signal_receiver) = mpsc::channel(1);
        return (AllServicesShutdownHandle { all_services_shutdown_signal_sender }, all_services_shutdown_signal_receiver);
    }

    pub async fn shutdown(&self) -> Result<(), SendError<()>> {
        return self.all_services_shutdown_signal_sender.clone().send(()).await;
    }
}
