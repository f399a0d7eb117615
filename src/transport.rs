//! The RPC boundary: one unary call and one server-streaming call, both
//! carrying the same envelope.

use crate::error::PtslError;
use async_trait::async_trait;
use futures_util::Stream;
use log::{debug, info};
use ptsl_protos::ptsl_client::PtslClient as GrpcStub;
use ptsl_protos::{Request, Response};
use std::pin::Pin;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;

pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<Response, Status>> + Send + 'static>>;

/// Anything able to carry PTSL envelopes to a host.
///
/// Implementations must be safe to call from several dispatches at once.
#[async_trait]
pub trait PtslTransport: Send + Sync {
    async fn unary(&self, request: Request) -> Result<Response, Status>;

    async fn server_streaming(&self, request: Request) -> Result<ResponseStream, Status>;
}

/// tonic-backed transport over a single shared HTTP/2 channel.
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    client: GrpcStub<Channel>,
}

impl GrpcTransport {
    /// Connects to the host, e.g. `http://localhost:31416`.
    pub async fn connect(
        address: &str,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, PtslError> {
        info!("🔌 Connecting to PTSL server at {}", address);

        let mut endpoint = Endpoint::from_shared(address.to_string())
            .map_err(|_| PtslError::InvalidEndpoint(address.to_string()))?;
        if let Some(timeout) = connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }

        let channel = endpoint.connect().await?;
        info!("✅ Connected to PTSL server at {}", address);

        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: GrpcStub::new(channel),
        }
    }
}

#[async_trait]
impl PtslTransport for GrpcTransport {
    async fn unary(&self, request: Request) -> Result<Response, Status> {
        // Clones share the underlying channel.
        let mut client = self.client.clone();
        let response = client.send_grpc_request(request).await?;
        Ok(response.into_inner())
    }

    async fn server_streaming(&self, request: Request) -> Result<ResponseStream, Status> {
        let mut client = self.client.clone();
        let stream = client.send_grpc_streaming_request(request).await?.into_inner();
        debug!("📡 Streaming call opened");
        Ok(Box::pin(stream))
    }
}
