//! # PTSL Protos
//!
//! Envelope messages and the gRPC client stub for the Pro Tools scripting
//! service, generated from `proto/ptsl.proto` at build time.

pub mod ptsl {
    tonic::include_proto!("ptsl");
}

// Re-export common types for convenience
pub use ptsl::*;

/// Fully qualified gRPC service name.
pub const SERVICE_NAME: &str = "ptsl.PTSL";

/// Port the scripting host listens on by default.
pub const DEFAULT_PORT: u16 = 31416;
