//! Typed results produced by every dispatch, independent of the command's
//! payload shape.

use crate::error::PtslError;
use ptsl_protos::CommandId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side state of a command's task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Queued,
    Pending,
    InProgress,
    Completed,
    Failed,
    CompletedWithBadResponse,
    FailedWithBadErrorResponse,
    NoResponseReceived,
}

impl TaskStatus {
    /// Maps the wire enumeration. `Unset` and unknown values have no status.
    pub fn from_wire(value: i32) -> Option<Self> {
        use ptsl_protos::TaskStatus as Wire;
        match Wire::try_from(value).ok()? {
            Wire::Unset => None,
            Wire::Queued => Some(TaskStatus::Queued),
            Wire::Pending => Some(TaskStatus::Pending),
            Wire::InProgress => Some(TaskStatus::InProgress),
            Wire::Completed => Some(TaskStatus::Completed),
            Wire::Failed => Some(TaskStatus::Failed),
            Wire::CompletedWithBadResponse => Some(TaskStatus::CompletedWithBadResponse),
            Wire::FailedWithBadErrorResponse => Some(TaskStatus::FailedWithBadErrorResponse),
            Wire::NoResponseReceived => Some(TaskStatus::NoResponseReceived),
        }
    }

    /// No further status change is expected for the task.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed
                | TaskStatus::Failed
                | TaskStatus::CompletedWithBadResponse
                | TaskStatus::FailedWithBadErrorResponse
                | TaskStatus::NoResponseReceived
        )
    }

    pub fn is_success(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::CompletedWithBadResponse
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Protocol version triple echoed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolVersion {
    pub major: i32,
    pub minor: i32,
    pub revision: i32,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHeader {
    pub command: Option<CommandId>,
    pub task_id: String,
    pub protocol_version: ProtocolVersion,
    pub status: Option<TaskStatus>,
    pub progress: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseStatus {
    pub task_status: Option<TaskStatus>,
    pub progress: i32,
    /// Diagnostic attached when the client had to reinterpret the host's reply.
    pub clarification: String,
}

/// Where an error originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    /// The host's reply did not follow the envelope protocol.
    Protocol,
    /// Raised inside this client: transport failures, local preconditions.
    Sdk,
    /// Reported by the host for the command itself.
    Application,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandError {
    pub kind: CommandErrorKind,
    /// Host error code such as `PT_InvalidParameter`, when one was sent.
    pub code: Option<String>,
    pub message: String,
    pub is_warning: bool,
}

impl CommandError {
    pub fn sdk(message: impl Into<String>) -> Self {
        Self {
            kind: CommandErrorKind::Sdk,
            code: None,
            message: message.into(),
            is_warning: false,
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self {
            kind: CommandErrorKind::Protocol,
            code: None,
            message: message.into(),
            is_warning: false,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = if self.is_warning { "warning" } else { "error" };
        match &self.code {
            Some(code) => write!(f, "{:?} {} [{}]: {}", self.kind, level, code, self.message),
            None => write!(f, "{:?} {}: {}", self.kind, level, self.message),
        }
    }
}

/// Outcome of one dispatch. `B` is the command-specific body.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResponse<B> {
    pub command: CommandId,
    pub header: Option<ResponseHeader>,
    pub status: ResponseStatus,
    pub errors: Vec<CommandError>,
    pub body: Option<B>,
}

impl<B> CommandResponse<B> {
    pub fn new(command: CommandId) -> Self {
        Self {
            command,
            header: None,
            status: ResponseStatus::default(),
            errors: Vec::new(),
            body: None,
        }
    }

    /// Response synthesized for a failure that never produced a usable reply.
    pub fn failure(command: CommandId, err: &PtslError) -> Self {
        let mut response = Self::new(command);
        response.status.task_status = Some(TaskStatus::Failed);
        response.errors.push(CommandError::sdk(err.to_string()));
        response
    }

    pub fn task_status(&self) -> Option<TaskStatus> {
        self.status.task_status
    }

    pub fn task_id(&self) -> Option<&str> {
        self.header
            .as_ref()
            .map(|h| h.task_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Completed without any non-warning error attached.
    pub fn is_success(&self) -> bool {
        self.status.task_status == Some(TaskStatus::Completed)
            && self.errors.iter().all(|e| e.is_warning)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CommandError> {
        self.errors.iter().filter(|e| e.is_warning)
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status.task_status = Some(status);
    }

    pub fn clarify(&mut self, status: TaskStatus, clarification: impl Into<String>) {
        self.status.task_status = Some(status);
        self.status.clarification = clarification.into();
    }

    /// Converts the body type, keeping header, status and errors.
    pub fn map_body<C>(self, f: impl FnOnce(B) -> C) -> CommandResponse<C> {
        CommandResponse {
            command: self.command,
            header: self.header,
            status: self.status,
            errors: self.errors,
            body: self.body.map(f),
        }
    }
}
