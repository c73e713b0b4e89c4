pub mod grpc {
    tonic::include_proto!("stable.agones.dev.sdk");
}
