use crate::client::PtslClient;
use crate::handler::{CommandHandler, EmptyRequest, JsonCommand};
use crate::response::{CommandResponse, TaskStatus};
use crate::session::SessionContext;
use log::{info, warn};
use ptsl_protos::CommandId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct RegisterConnectionRequest {
    pub company_name: String,
    pub application_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterConnectionBody {
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostReadyCheckBody {
    #[serde(default)]
    pub is_host_ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PtslVersionBody {
    pub version: i32,
}

/// Stores the returned session id in the shared context as soon as the body
/// arrives.
struct RegisterConnection {
    request: RegisterConnectionRequest,
    session: Arc<SessionContext>,
}

impl CommandHandler for RegisterConnection {
    type Body = RegisterConnectionBody;

    fn command_id(&self) -> CommandId {
        CommandId::RegisterConnection
    }

    fn encode_request(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.request)
    }

    fn decode_body(&self, body_json: &str) -> Result<Self::Body, serde_json::Error> {
        serde_json::from_str(body_json)
    }

    fn on_body(&mut self, body: &mut Self::Body) {
        if !body.session_id.is_empty() {
            self.session.set_session_id(body.session_id.clone());
        }
    }
}

impl PtslClient {
    /// Asks whether the host can take commands and records the answer.
    /// Every other command is refused locally until the host reports ready.
    ///
    /// The body's `is_host_ready` decides; a reply without a body counts as
    /// ready only when it completed.
    pub async fn host_ready_check(&self) -> CommandResponse<HostReadyCheckBody> {
        let response = self
            .unary(JsonCommand::<EmptyRequest, HostReadyCheckBody>::without_params(
                CommandId::HostReadyCheck,
            ))
            .await;

        let ready = match &response.body {
            Some(body) => body.is_host_ready,
            None => response.task_status() == Some(TaskStatus::Completed),
        };
        self.session().set_host_ready(ready);
        if ready {
            info!("✅ Pro Tools is ready");
        } else {
            warn!("⏳ Pro Tools is not ready ({:?})", response.task_status());
        }
        response
    }

    pub async fn register_connection(
        &self,
        company_name: &str,
        application_name: &str,
    ) -> CommandResponse<RegisterConnectionBody> {
        let handler = RegisterConnection {
            request: RegisterConnectionRequest {
                company_name: company_name.to_string(),
                application_name: application_name.to_string(),
            },
            session: Arc::clone(self.session()),
        };
        let mut response = self.unary(handler).await;

        let missing_id = response
            .body
            .as_ref()
            .map_or(true, |body| body.session_id.is_empty());
        if response.is_success() && missing_id {
            response.clarify(
                TaskStatus::CompletedWithBadResponse,
                "RegisterConnection returned no session id",
            );
        }
        response
    }

    pub async fn get_ptsl_version(&self) -> CommandResponse<PtslVersionBody> {
        self.unary(JsonCommand::<_, PtslVersionBody>::without_params(
            CommandId::GetPtslVersion,
        ))
        .await
    }
}
