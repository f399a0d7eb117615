//! Per-command capability interface consumed by the dispatcher.

use crate::envelope;
use crate::response::{CommandError, CommandResponse, ResponseHeader};
use ptsl_protos::CommandId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// What the dispatcher needs to know about one command.
///
/// The hooks are called in a fixed order per received envelope: `on_header`
/// (or `on_no_response`), then `on_errors`, then `on_body` or `on_no_body`.
/// The completion callback of the dispatcher runs after all of them.
pub trait CommandHandler: Send {
    type Body: Default + Send + 'static;

    fn command_id(&self) -> CommandId;

    /// Name used in logs and diagnostics.
    fn name(&self) -> &str {
        self.command_id().as_str_name()
    }

    fn encode_request(&self) -> Result<String, serde_json::Error>;

    fn decode_body(&self, body_json: &str) -> Result<Self::Body, serde_json::Error>;

    fn decode_errors(&self, error_json: &str) -> Result<Vec<CommandError>, serde_json::Error> {
        envelope::parse_error_payload(error_json)
    }

    /// Long-running commands whose task status has to be polled.
    fn needs_task_status_ping(&self) -> bool {
        false
    }

    /// Whether `response` is worth handing to the completion callback.
    fn is_response_complete(&self, _response: &CommandResponse<Self::Body>) -> bool {
        true
    }

    fn on_header(&mut self, _header: &ResponseHeader) {}

    fn on_errors(&mut self, _errors: &[CommandError]) {}

    /// Called with the decoded body, or with `Default` data when decoding failed.
    fn on_body(&mut self, _body: &mut Self::Body) {}

    fn on_no_body(&mut self) {}

    fn on_no_response(&mut self) {}
}

/// Request payload for commands that take no parameters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EmptyRequest {}

/// Response payload for commands that return nothing of interest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyBody {}

/// Handler for any command whose request and body are plain serde types.
pub struct JsonCommand<Req, Body> {
    command: CommandId,
    request: Req,
    ping: bool,
    _body: PhantomData<fn() -> Body>,
}

impl<Req, Body> JsonCommand<Req, Body> {
    pub fn new(command: CommandId, request: Req) -> Self {
        Self {
            command,
            request,
            ping: false,
            _body: PhantomData,
        }
    }

    /// Marks the command as long-running: its task status is polled while
    /// the stream is open.
    pub fn with_task_status_ping(mut self) -> Self {
        self.ping = true;
        self
    }
}

impl<Body> JsonCommand<EmptyRequest, Body> {
    pub fn without_params(command: CommandId) -> Self {
        Self::new(command, EmptyRequest {})
    }
}

impl<Req, Body> CommandHandler for JsonCommand<Req, Body>
where
    Req: Serialize + Send,
    Body: DeserializeOwned + Default + Send + 'static,
{
    type Body = Body;

    fn command_id(&self) -> CommandId {
        self.command
    }

    fn encode_request(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.request)
    }

    fn decode_body(&self, body_json: &str) -> Result<Body, serde_json::Error> {
        serde_json::from_str(body_json)
    }

    fn needs_task_status_ping(&self) -> bool {
        self.ping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct NameBody {
        session_name: String,
    }

    #[test]
    fn test_json_command_roundtrip() {
        let handler: JsonCommand<_, NameBody> = JsonCommand::without_params(CommandId::GetSessionName);
        assert_eq!(handler.name(), "GetSessionName");
        assert_eq!(handler.encode_request().unwrap(), "{}");
        assert!(!handler.needs_task_status_ping());

        let body = handler
            .decode_body(r#"{"session_name":"Untitled"}"#)
            .unwrap();
        assert_eq!(body.session_name, "Untitled");
    }

    #[test]
    fn test_ping_flag() {
        let handler: JsonCommand<_, EmptyBody> =
            JsonCommand::without_params(CommandId::SaveSession).with_task_status_ping();
        assert!(handler.needs_task_status_ping());
    }
}
