//! High-level client: one connection, one session context, typed commands.
//!
//! The typed command methods live in [`crate::commands`]; this module holds
//! construction and the connection-level plumbing they share.

use crate::config::PtslConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::handler::CommandHandler;
use crate::permissions::Permissions;
use crate::response::CommandResponse;
use crate::session::SessionContext;
use crate::transport::{GrpcTransport, PtslTransport};
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// Pro Tools scripting client. Cheap to clone; clones share the connection
/// and the session context.
#[derive(Clone)]
pub struct PtslClient {
    dispatcher: Dispatcher,
}

impl PtslClient {
    /// Opens the gRPC channel described by `config`. No command is sent yet.
    pub async fn connect(config: &PtslConfig) -> Result<Self> {
        config.validate()?;
        let transport =
            GrpcTransport::connect(&config.server_address, config.call_timeout()).await?;

        let permissions = config.permissions();
        permissions.log_status();

        Ok(Self::with_transport(
            Arc::new(transport),
            permissions,
            config.call_timeout(),
            config.poll_interval(),
        ))
    }

    /// Builds a client over any transport, e.g. an in-memory one in tests.
    pub fn with_transport(
        transport: Arc<dyn PtslTransport>,
        permissions: Permissions,
        call_timeout: Option<Duration>,
        poll_interval: Duration,
    ) -> Self {
        let dispatcher = Dispatcher::new(transport, Arc::new(SessionContext::new()))
            .with_permissions(permissions)
            .with_call_timeout(call_timeout)
            .with_poll_interval(poll_interval);
        Self { dispatcher }
    }

    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        self.dispatcher.session()
    }

    pub fn is_host_ready(&self) -> bool {
        self.session().is_host_ready()
    }

    /// Readiness check followed by registration, the usual start of a run.
    /// Returns the session id.
    pub async fn start(&self, company_name: &str, application_name: &str) -> Option<String> {
        self.host_ready_check().await;
        if !self.is_host_ready() {
            return None;
        }
        let registered = self
            .register_connection(company_name, application_name)
            .await;
        if !registered.is_success() {
            return None;
        }
        info!("✅ PTSL session ready ({})", self.session().session_id());
        Some(self.session().session_id())
    }

    pub(crate) async fn unary<H: CommandHandler>(&self, handler: H) -> CommandResponse<H::Body> {
        self.dispatcher.make_request(handler).await
    }

    pub(crate) async fn streaming<H: CommandHandler>(
        &self,
        handler: H,
    ) -> CommandResponse<H::Body> {
        self.dispatcher.make_streaming_request(handler).await
    }
}
