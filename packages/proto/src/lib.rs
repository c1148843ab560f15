//! Generated gRPC bindings for Yata services.

pub mod auth {
    tonic::include_proto!("auth");
}
