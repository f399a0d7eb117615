use crate::client::PtslClient;
use crate::handler::{EmptyBody, EmptyRequest, JsonCommand};
use crate::response::CommandResponse;
use ptsl_protos::CommandId;
use serde::{Deserialize, Serialize};

/// Selection bounds, formatted in the requested location type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSelection {
    pub in_time: String,
    pub out_time: String,
    pub play_start_marker_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineSelectionRequest {
    pub in_time: String,
    pub out_time: String,
}

#[derive(Debug, Clone, Serialize)]
struct GetTimelineSelectionRequest<'a> {
    location_type: &'a str,
}

impl PtslClient {
    async fn edit(&self, command: CommandId) -> CommandResponse<EmptyBody> {
        self.unary(JsonCommand::<EmptyRequest, EmptyBody>::without_params(command))
            .await
    }

    pub async fn cut(&self) -> CommandResponse<EmptyBody> {
        self.edit(CommandId::Cut).await
    }

    pub async fn copy(&self) -> CommandResponse<EmptyBody> {
        self.edit(CommandId::Copy).await
    }

    pub async fn paste(&self) -> CommandResponse<EmptyBody> {
        self.edit(CommandId::Paste).await
    }

    pub async fn clear(&self) -> CommandResponse<EmptyBody> {
        self.edit(CommandId::Clear).await
    }

    pub async fn undo(&self) -> CommandResponse<EmptyBody> {
        self.edit(CommandId::Undo).await
    }

    pub async fn redo(&self) -> CommandResponse<EmptyBody> {
        self.edit(CommandId::Redo).await
    }

    /// `location_type` is a host time format such as `TLType_Samples`.
    pub async fn get_timeline_selection(
        &self,
        location_type: &str,
    ) -> CommandResponse<TimelineSelection> {
        self.unary(JsonCommand::<_, TimelineSelection>::new(
            CommandId::GetTimelineSelection,
            GetTimelineSelectionRequest { location_type },
        ))
        .await
    }

    pub async fn set_timeline_selection(
        &self,
        in_time: &str,
        out_time: &str,
    ) -> CommandResponse<EmptyBody> {
        let request = TimelineSelectionRequest {
            in_time: in_time.to_string(),
            out_time: out_time.to_string(),
        };
        self.unary(JsonCommand::<_, EmptyBody>::new(
            CommandId::SetTimelineSelection,
            request,
        ))
        .await
    }
}
