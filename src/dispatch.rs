//! Request/response lifecycle for unary and server-streaming commands.
//!
//! Every outcome, including transport failures, malformed replies and
//! poller failures, is folded into a [`CommandResponse`]; nothing escapes
//! the dispatch boundary as an error.

use crate::envelope;
use crate::error::{PtslError, Result};
use crate::handler::CommandHandler;
use crate::permissions::Permissions;
use crate::poller::{TaskProgress, TaskStatusPoller};
use crate::response::{CommandError, CommandResponse, TaskStatus};
use crate::session::SessionContext;
use crate::transport::PtslTransport;
use futures_util::StreamExt;
use log::{debug, error, warn};
use ptsl_protos::{CommandId, Response};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Drives commands against a host through a shared transport.
///
/// Cloning is cheap; clones share the transport and session context.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn PtslTransport>,
    session: Arc<SessionContext>,
    permissions: Arc<Permissions>,
    call_timeout: Option<Duration>,
    poll_interval: Duration,
}

impl Dispatcher {
    /// A dispatcher with unbounded waits and every command permitted.
    ///
    /// Write restrictions are opt-in through [`Dispatcher::with_permissions`];
    /// [`crate::PtslClient`] applies the configured `allow_writes` groups.
    pub fn new(transport: Arc<dyn PtslTransport>, session: Arc<SessionContext>) -> Self {
        Self {
            transport,
            session,
            permissions: Arc::new(Permissions::all()),
            call_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Arc::new(permissions);
        self
    }

    /// Bounds every wait on the host. `None` waits indefinitely.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub async fn make_request<H: CommandHandler>(&self, handler: H) -> CommandResponse<H::Body> {
        self.make_request_with_callback(handler, |_| {}).await
    }

    /// Unary dispatch. `on_complete` sees the finished response when the
    /// handler considers it complete, and always sees a failure.
    pub async fn make_request_with_callback<H, F>(
        &self,
        mut handler: H,
        mut on_complete: F,
    ) -> CommandResponse<H::Body>
    where
        H: CommandHandler,
        F: FnMut(&CommandResponse<H::Body>) + Send,
    {
        let command = handler.command_id();
        let body_json = match self.prepare(&handler) {
            Ok(body_json) => body_json,
            Err(err) => return fail(command, handler.name(), err, &mut on_complete),
        };

        match self.run_unary(&mut handler, body_json).await {
            Ok(response) => {
                if handler.is_response_complete(&response) {
                    on_complete(&response);
                }
                response
            }
            Err(err) => fail(command, handler.name(), err, &mut on_complete),
        }
    }

    pub async fn make_streaming_request<H: CommandHandler>(
        &self,
        handler: H,
    ) -> CommandResponse<H::Body> {
        self.make_streaming_request_with_callback(handler, |_| {}).await
    }

    /// Server-streaming dispatch. `on_response` sees every snapshot the
    /// handler considers complete, including headerless ones, and any
    /// failure. The return value is the last one.
    pub async fn make_streaming_request_with_callback<H, F>(
        &self,
        mut handler: H,
        mut on_response: F,
    ) -> CommandResponse<H::Body>
    where
        H: CommandHandler,
        F: FnMut(&CommandResponse<H::Body>) + Send,
    {
        let command = handler.command_id();
        let body_json = match self.prepare(&handler) {
            Ok(body_json) => body_json,
            Err(err) => return fail(command, handler.name(), err, &mut on_response),
        };

        let mut poller: Option<TaskStatusPoller> = None;
        let outcome = self
            .run_streaming(&mut handler, body_json, &mut poller, &mut on_response)
            .await;

        // The poller never outlives the dispatch.
        let poller_outcome = match poller.take() {
            Some(active) => Some(active.shutdown().await),
            None => None,
        };

        match (outcome, poller_outcome) {
            (Ok(response), None) => response,
            (Ok(mut response), Some(Ok(progress))) => {
                fold_progress(&mut response, progress);
                response
            }
            (Ok(_), Some(Err(err))) | (Err(err), _) => {
                fail(command, handler.name(), err, &mut on_response)
            }
        }
    }

    /// Local preconditions: host readiness, request encoding, permissions.
    fn prepare<H: CommandHandler>(&self, handler: &H) -> Result<String> {
        let command = handler.command_id();
        if command != CommandId::HostReadyCheck && !self.session.is_host_ready() {
            return Err(PtslError::HostNotReady(handler.name().to_string()));
        }

        let body_json = handler.encode_request()?;
        self.permissions.check(command, &body_json)?;
        Ok(body_json)
    }

    async fn wait<F: Future>(&self, fut: F) -> Result<F::Output> {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| PtslError::Timeout(limit)),
            None => Ok(fut.await),
        }
    }

    async fn run_unary<H: CommandHandler>(
        &self,
        handler: &mut H,
        body_json: String,
    ) -> Result<CommandResponse<H::Body>> {
        let command = handler.command_id();
        debug!("➡️  {} (unary)", handler.name());

        let request = envelope::build_request(&self.session, command, body_json);
        let reply = self.wait(self.transport.unary(request)).await??;

        let mut response = CommandResponse::new(command);
        if apply_header(handler, &mut response, &reply) {
            apply_payloads(handler, &mut response, &reply, envelope::has_unary_body);
        }

        debug!("⬅️  {} -> {:?}", handler.name(), response.task_status());
        Ok(response)
    }

    async fn run_streaming<H, F>(
        &self,
        handler: &mut H,
        body_json: String,
        poller: &mut Option<TaskStatusPoller>,
        on_response: &mut F,
    ) -> Result<CommandResponse<H::Body>>
    where
        H: CommandHandler,
        F: FnMut(&CommandResponse<H::Body>) + Send,
    {
        let command = handler.command_id();
        let ping = handler.needs_task_status_ping();
        debug!("➡️  {} (streaming, ping={})", handler.name(), ping);

        let request = envelope::build_request(&self.session, command, body_json);
        let mut stream = self.wait(self.transport.server_streaming(request)).await??;

        let mut response = CommandResponse::new(command);
        let mut received = 0usize;
        let mut poller_started = false;

        loop {
            let reply = match self.wait(stream.next()).await? {
                None => {
                    debug!("📡 {} stream closed after {} responses", handler.name(), received);
                    break;
                }
                Some(Err(status)) if received > 0 => {
                    warn!(
                        "📡 {} stream ended with error after {} responses: {}",
                        handler.name(),
                        received,
                        status
                    );
                    break;
                }
                Some(Err(status)) => return Err(status.into()),
                Some(Ok(reply)) => reply,
            };
            received += 1;

            if !apply_header(handler, &mut response, &reply) {
                if handler.is_response_complete(&response) {
                    on_response(&response);
                }
                continue;
            }

            if ping && !poller_started && response.task_status() == Some(TaskStatus::Queued) {
                match response.task_id() {
                    Some(task_id) => {
                        *poller = Some(TaskStatusPoller::spawn(
                            Arc::clone(&self.transport),
                            Arc::clone(&self.session),
                            task_id.to_string(),
                            self.poll_interval,
                        ));
                        poller_started = true;
                    }
                    None => warn!("{} was queued without a task id", handler.name()),
                }
            }

            apply_payloads(handler, &mut response, &reply, envelope::has_streamed_body);

            if handler.is_response_complete(&response) {
                on_response(&response);
            }

            let terminal = response.task_status().is_some_and(TaskStatus::is_terminal);
            if ping && terminal {
                if let Some(active) = poller.take() {
                    let progress = active.shutdown().await?;
                    fold_progress(&mut response, progress);
                }
            } else if poller.as_ref().is_some_and(TaskStatusPoller::is_finished) {
                if let Some(done) = poller.take() {
                    let progress = done.join().await?;
                    fold_progress(&mut response, progress);
                }
            }
        }

        if received == 0 {
            return Err(PtslError::EmptyStream);
        }
        Ok(response)
    }
}

/// Synthesizes the failed response and hands it to the caller's callback.
fn fail<B, F>(
    command: CommandId,
    name: &str,
    err: PtslError,
    callback: &mut F,
) -> CommandResponse<B>
where
    F: FnMut(&CommandResponse<B>),
{
    if err.is_local() {
        warn!("⛔ {} not sent: {}", name, err);
    } else {
        error!("❌ {} failed: {}", name, err);
    }
    let response = CommandResponse::failure(command, &err);
    callback(&response);
    response
}

/// Populates header and status. Returns `false` for a headerless envelope.
fn apply_header<H: CommandHandler>(
    handler: &mut H,
    response: &mut CommandResponse<H::Body>,
    reply: &Response,
) -> bool {
    match &reply.header {
        Some(wire) => {
            let header = envelope::decode_header(wire);
            response.status.task_status = header.status;
            response.status.progress = header.progress;
            response.status.clarification.clear();
            handler.on_header(&header);
            response.header = Some(header);
            true
        }
        None => {
            response.set_status(TaskStatus::NoResponseReceived);
            handler.on_no_response();
            false
        }
    }
}

fn apply_payloads<H: CommandHandler>(
    handler: &mut H,
    response: &mut CommandResponse<H::Body>,
    reply: &Response,
    has_body: fn(&str) -> bool,
) {
    if !reply.response_error_json.is_empty() {
        match handler.decode_errors(&reply.response_error_json) {
            Ok(errors) => {
                handler.on_errors(&errors);
                response.errors.extend(errors);
            }
            Err(e) => {
                warn!("{} returned a malformed error payload: {}", handler.name(), e);
                let clarification = format!("Malformed error payload: {}", e);
                response
                    .errors
                    .push(CommandError::protocol(clarification.clone()));
                response.clarify(TaskStatus::FailedWithBadErrorResponse, clarification);
            }
        }
    }

    if has_body(&reply.response_body_json) {
        let mut body = match handler.decode_body(&reply.response_body_json) {
            Ok(body) => body,
            Err(e) => {
                warn!("{} returned a malformed body: {}", handler.name(), e);
                response.clarify(
                    TaskStatus::CompletedWithBadResponse,
                    format!("Malformed response body: {}", e),
                );
                H::Body::default()
            }
        };
        handler.on_body(&mut body);
        response.body = Some(body);
    } else {
        response.body = None;
        handler.on_no_body();
    }
}

fn fold_progress<B>(response: &mut CommandResponse<B>, progress: Option<TaskProgress>) {
    if let Some(progress) = progress {
        debug!("Poller last saw {} at {}%", progress.status, progress.progress);
        if progress.progress > response.status.progress {
            response.status.progress = progress.progress;
        }
    }
}
