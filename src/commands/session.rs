use crate::client::PtslClient;
use crate::handler::{EmptyBody, EmptyRequest, JsonCommand};
use crate::response::CommandResponse;
use ptsl_protos::CommandId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionNameBody {
    pub session_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPathInfo {
    #[serde(default)]
    pub is_online: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPath {
    pub path: String,
    #[serde(default)]
    pub info: SessionPathInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPathBody {
    pub session_path: SessionPath,
}

/// Sample rate as the host names it, e.g. `SR_48000`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleRateBody {
    pub sample_rate: String,
}

/// Shape shared by the `Get*` commands that report one enum setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentSettingBody {
    pub current_setting: String,
    #[serde(default)]
    pub possible_settings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionLengthBody {
    pub session_length: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveSessionAsRequest {
    pub session_name: String,
    pub session_location: String,
}

#[derive(Debug, Clone, Serialize)]
struct CloseSessionRequest {
    save_on_close: bool,
}

impl PtslClient {
    pub async fn get_session_name(&self) -> CommandResponse<SessionNameBody> {
        self.unary(JsonCommand::<_, SessionNameBody>::without_params(
            CommandId::GetSessionName,
        ))
        .await
    }

    pub async fn get_session_path(&self) -> CommandResponse<SessionPathBody> {
        self.unary(JsonCommand::<_, SessionPathBody>::without_params(
            CommandId::GetSessionPath,
        ))
        .await
    }

    pub async fn get_session_sample_rate(&self) -> CommandResponse<SampleRateBody> {
        self.unary(JsonCommand::<_, SampleRateBody>::without_params(
            CommandId::GetSessionSampleRate,
        ))
        .await
    }

    pub async fn get_session_bit_depth(&self) -> CommandResponse<CurrentSettingBody> {
        self.unary(JsonCommand::<_, CurrentSettingBody>::without_params(
            CommandId::GetSessionBitDepth,
        ))
        .await
    }

    pub async fn get_session_length(&self) -> CommandResponse<SessionLengthBody> {
        self.unary(JsonCommand::<_, SessionLengthBody>::without_params(
            CommandId::GetSessionLength,
        ))
        .await
    }

    /// Streams progress while the host writes the session to disk.
    pub async fn save_session(&self) -> CommandResponse<EmptyBody> {
        let handler = JsonCommand::<EmptyRequest, EmptyBody>::without_params(CommandId::SaveSession)
            .with_task_status_ping();
        self.streaming(handler).await
    }

    pub async fn save_session_as(
        &self,
        session_name: &str,
        session_location: &str,
    ) -> CommandResponse<EmptyBody> {
        let request = SaveSessionAsRequest {
            session_name: session_name.to_string(),
            session_location: session_location.to_string(),
        };
        let handler = JsonCommand::<_, EmptyBody>::new(CommandId::SaveSessionAs, request)
            .with_task_status_ping();
        self.streaming(handler).await
    }

    pub async fn close_session(&self, save_on_close: bool) -> CommandResponse<EmptyBody> {
        self.unary(JsonCommand::<_, EmptyBody>::new(
            CommandId::CloseSession,
            CloseSessionRequest { save_on_close },
        ))
        .await
    }
}
