use crate::client::PtslClient;
use crate::handler::{EmptyBody, EmptyRequest, JsonCommand};
use crate::response::CommandResponse;
use ptsl_protos::CommandId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportStateBody {
    /// e.g. `TS_TransportStopped`, `TS_TransportPlaying`.
    pub current_setting: String,
    #[serde(default)]
    pub possible_settings: Vec<String>,
}

impl TransportStateBody {
    pub fn is_playing(&self) -> bool {
        self.current_setting.contains("Playing")
    }
}

/// Playback modes can be combined, so the host reports a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackModeBody {
    pub current_settings: Vec<String>,
    pub possible_settings: Vec<String>,
}

impl PtslClient {
    pub async fn get_transport_state(&self) -> CommandResponse<TransportStateBody> {
        self.unary(JsonCommand::<_, TransportStateBody>::without_params(
            CommandId::GetTransportState,
        ))
        .await
    }

    pub async fn toggle_play_state(&self) -> CommandResponse<EmptyBody> {
        self.unary(JsonCommand::<EmptyRequest, EmptyBody>::without_params(
            CommandId::TogglePlayState,
        ))
        .await
    }

    pub async fn get_playback_mode(&self) -> CommandResponse<PlaybackModeBody> {
        self.unary(JsonCommand::<_, PlaybackModeBody>::without_params(
            CommandId::GetPlaybackMode,
        ))
        .await
    }
}
