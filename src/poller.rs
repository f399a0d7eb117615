//! Background task-status polling for long-running streamed commands.

use crate::envelope;
use crate::error::{PtslError, Result};
use crate::response::TaskStatus;
use crate::session::SessionContext;
use crate::transport::PtslTransport;
use log::{debug, info, warn};
use ptsl_protos::CommandId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Last status the poller observed for its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskProgress {
    pub status: TaskStatus,
    pub progress: i32,
}

#[derive(Debug, Serialize)]
struct TaskStatusRequest<'a> {
    task_id: &'a str,
}

/// Poll bodies are only read for progress; the header carries the status.
#[derive(Debug, Deserialize)]
struct TaskStatusBody {
    #[serde(default)]
    progress: Option<i32>,
}

/// Handle to a running poller. Cancel it with [`TaskStatusPoller::cancel`]
/// and collect its outcome with [`TaskStatusPoller::join`].
pub struct TaskStatusPoller {
    task_id: String,
    cancel_token: CancellationToken,
    handle: JoinHandle<Result<Option<TaskProgress>>>,
}

impl TaskStatusPoller {
    pub fn spawn(
        transport: Arc<dyn PtslTransport>,
        session: Arc<SessionContext>,
        task_id: String,
        interval: Duration,
    ) -> Self {
        info!("⏱️ Starting task status poller for task {}", task_id);

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(poll_until_done(
            transport,
            session,
            task_id.clone(),
            interval,
            cancel_token.clone(),
        ));

        Self {
            task_id,
            cancel_token,
            handle,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// The poller stopped on its own: terminal status or failure.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        if !self.cancel_token.is_cancelled() {
            debug!("Cancelling task status poller for task {}", self.task_id);
            self.cancel_token.cancel();
        }
    }

    /// Waits for the poller to stop and surfaces its failure, if any.
    pub async fn join(self) -> Result<Option<TaskProgress>> {
        let outcome = self.handle.await?;
        debug!("Task status poller for task {} joined", self.task_id);
        outcome
    }

    pub async fn shutdown(self) -> Result<Option<TaskProgress>> {
        self.cancel();
        self.join().await
    }
}

async fn poll_until_done(
    transport: Arc<dyn PtslTransport>,
    session: Arc<SessionContext>,
    task_id: String,
    interval: Duration,
    cancel_token: CancellationToken,
) -> Result<Option<TaskProgress>> {
    let body_json = serde_json::to_string(&TaskStatusRequest { task_id: &task_id })?;
    let mut last_seen: Option<TaskProgress> = None;

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!("Task status poller for task {} cancelled", task_id);
                return Ok(last_seen);
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let request = envelope::build_request(&session, CommandId::GetTaskStatus, body_json.clone());
        let reply = tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!("Task status poller for task {} cancelled mid-request", task_id);
                return Ok(last_seen);
            }
            reply = transport.unary(request) => reply?,
        };

        let header = reply.header.as_ref();
        let status = header.and_then(|h| TaskStatus::from_wire(h.status));
        let mut progress = header.map_or(0, |h| h.progress);
        if let Some(reported) = body_progress(&task_id, &reply.response_body_json) {
            progress = progress.max(reported);
        }

        let Some(status) = status else {
            debug!("Task status poll for task {} carried no status", task_id);
            continue;
        };
        debug!("Task {} status {} ({}%)", task_id, status, progress);
        last_seen = Some(TaskProgress { status, progress });

        match status {
            TaskStatus::Failed => {
                let mut message = format!("could not find a task with task ID {}", task_id);
                if let Some(details) = error_details(&reply.response_error_json) {
                    message = format!("{} ({})", message, details);
                }
                return Err(PtslError::Poller(message));
            }
            TaskStatus::Completed => {
                info!("⏱️ Task {} completed", task_id);
                return Ok(last_seen);
            }
            TaskStatus::CompletedWithBadResponse | TaskStatus::FailedWithBadErrorResponse => {
                warn!("Task {} finished with {}", task_id, status);
                return Ok(last_seen);
            }
            _ => {
                if let Some(details) = error_details(&reply.response_error_json) {
                    warn!("Task status poll for task {} reported: {}", task_id, details);
                }
            }
        }
    }
}

fn body_progress(task_id: &str, body_json: &str) -> Option<i32> {
    if !envelope::has_streamed_body(body_json) {
        return None;
    }
    match serde_json::from_str::<TaskStatusBody>(body_json) {
        Ok(body) => body.progress,
        Err(e) => {
            warn!("Ignoring malformed task status for task {}: {}", task_id, e);
            None
        }
    }
}

fn error_details(error_json: &str) -> Option<String> {
    if error_json.is_empty() {
        return None;
    }
    let details = match envelope::parse_error_payload(error_json) {
        Ok(errors) => errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
        Err(e) => format!("unreadable error payload: {}", e),
    };
    Some(details).filter(|d| !d.is_empty())
}
