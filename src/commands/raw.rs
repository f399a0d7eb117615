use crate::client::PtslClient;
use crate::handler::CommandHandler;
use crate::response::CommandResponse;
use ptsl_protos::CommandId;
use serde_json::Value;

/// Any command with an untyped JSON request and body.
#[derive(Debug, Clone)]
pub struct RawCommand {
    command: CommandId,
    params: Value,
    ping: bool,
}

impl RawCommand {
    pub fn new(command: CommandId, params: Value) -> Self {
        Self {
            command,
            params,
            ping: false,
        }
    }

    /// Looks the command up by its enum name, e.g. `GetSessionName`.
    pub fn by_name(name: &str, params: Value) -> Option<Self> {
        CommandId::from_str_name(name).map(|command| Self::new(command, params))
    }

    pub fn with_task_status_ping(mut self) -> Self {
        self.ping = true;
        self
    }
}

impl CommandHandler for RawCommand {
    type Body = Value;

    fn command_id(&self) -> CommandId {
        self.command
    }

    fn encode_request(&self) -> Result<String, serde_json::Error> {
        match &self.params {
            Value::Null => Ok("{}".to_string()),
            params => serde_json::to_string(params),
        }
    }

    fn decode_body(&self, body_json: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str(body_json)
    }

    fn needs_task_status_ping(&self) -> bool {
        self.ping
    }
}

impl PtslClient {
    pub async fn execute_raw(&self, command: RawCommand) -> CommandResponse<Value> {
        self.unary(command).await
    }

    pub async fn execute_raw_streaming(&self, command: RawCommand) -> CommandResponse<Value> {
        self.streaming(command).await
    }
}
