//! Outer request/response envelope: header fields plus the JSON payloads the
//! host embeds as strings.

use crate::response::{
    CommandError, CommandErrorKind, ProtocolVersion, ResponseHeader, TaskStatus,
};
use crate::session::SessionContext;
use ptsl_protos::{CommandId, Request, RequestHeader};
use serde::Deserialize;

/// Legacy protocol version stamped on every request.
pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion {
    major: 5,
    minor: 0,
    revision: 0,
};

/// Builds a fresh request envelope. The task id is always empty on requests.
pub fn build_request(session: &SessionContext, command: CommandId, body_json: String) -> Request {
    Request {
        header: Some(RequestHeader {
            task_id: String::new(),
            command: command as i32,
            version: PROTOCOL_VERSION.major,
            session_id: session.session_id(),
            version_minor: PROTOCOL_VERSION.minor,
            version_revision: PROTOCOL_VERSION.revision,
        }),
        request_body_json: body_json,
    }
}

pub fn decode_header(header: &ptsl_protos::ResponseHeader) -> ResponseHeader {
    ResponseHeader {
        command: CommandId::try_from(header.command).ok(),
        task_id: header.task_id.clone(),
        protocol_version: ProtocolVersion {
            major: header.version,
            minor: header.version_minor,
            revision: header.version_revision,
        },
        status: TaskStatus::from_wire(header.status),
        progress: header.progress,
    }
}

/// Unary replies carry a body whenever the payload is non-empty.
pub fn has_unary_body(body_json: &str) -> bool {
    !body_json.is_empty()
}

/// Streamed replies use a lone newline for "no body"; it is never parsed.
pub fn has_streamed_body(body_json: &str) -> bool {
    !body_json.is_empty() && body_json != "\n"
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    command_error_type: Option<serde_json::Value>,
    #[serde(default)]
    command_error_message: String,
    #[serde(default)]
    is_warning: bool,
}

#[derive(Debug, Deserialize)]
struct WireErrorList {
    errors: Vec<WireError>,
}

impl From<WireError> for CommandError {
    fn from(err: WireError) -> Self {
        let code = match err.command_error_type {
            Some(serde_json::Value::String(code)) => Some(code),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => None,
        };
        CommandError {
            kind: CommandErrorKind::Application,
            code,
            message: err.command_error_message,
            is_warning: err.is_warning,
        }
    }
}

/// Parses an error payload.
///
/// Accepts `{"errors": [...]}` and, for older hosts, a single bare error
/// object. On failure the diagnostic from the list-shaped parse is returned.
pub fn parse_error_payload(error_json: &str) -> Result<Vec<CommandError>, serde_json::Error> {
    match serde_json::from_str::<WireErrorList>(error_json) {
        Ok(list) => Ok(list.errors.into_iter().map(CommandError::from).collect()),
        Err(list_err) => match serde_json::from_str::<WireError>(error_json) {
            Ok(single) if single.command_error_type.is_some() => Ok(vec![single.into()]),
            _ => Err(list_err),
        },
    }
}
