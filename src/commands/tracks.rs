use crate::client::PtslClient;
use crate::handler::{EmptyBody, JsonCommand};
use crate::response::CommandResponse;
use ptsl_protos::CommandId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackAttributes {
    pub is_muted: bool,
    pub is_soloed: bool,
    /// Selection state name, `None` when unselected.
    pub is_selected: String,
    pub contains_clips: bool,
}

impl TrackAttributes {
    pub fn selected(&self) -> bool {
        !self.is_selected.is_empty() && self.is_selected != "None"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub track_type: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub index: i32,
    #[serde(default)]
    pub track_attributes: TrackAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackListBody {
    #[serde(default)]
    pub track_list: Vec<TrackInfo>,
}

#[derive(Debug, Clone, Serialize)]
struct TrackNamesRequest {
    track_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct TrackToggleRequest {
    track_names: Vec<String>,
    enabled: bool,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl PtslClient {
    pub async fn get_track_list(&self) -> CommandResponse<TrackListBody> {
        self.unary(JsonCommand::<_, TrackListBody>::without_params(
            CommandId::GetTrackList,
        ))
        .await
    }

    pub async fn select_tracks_by_name(&self, track_names: &[&str]) -> CommandResponse<EmptyBody> {
        let request = TrackNamesRequest {
            track_names: owned(track_names),
        };
        self.unary(JsonCommand::<_, EmptyBody>::new(
            CommandId::SelectTracksByName,
            request,
        ))
        .await
    }

    pub async fn set_track_mute_state(
        &self,
        track_names: &[&str],
        muted: bool,
    ) -> CommandResponse<EmptyBody> {
        let request = TrackToggleRequest {
            track_names: owned(track_names),
            enabled: muted,
        };
        self.unary(JsonCommand::<_, EmptyBody>::new(
            CommandId::SetTrackMuteState,
            request,
        ))
        .await
    }

    pub async fn set_track_solo_state(
        &self,
        track_names: &[&str],
        soloed: bool,
    ) -> CommandResponse<EmptyBody> {
        let request = TrackToggleRequest {
            track_names: owned(track_names),
            enabled: soloed,
        };
        self.unary(JsonCommand::<_, EmptyBody>::new(
            CommandId::SetTrackSoloState,
            request,
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_list_body() {
        let body: TrackListBody = serde_json::from_str(
            r#"{"track_list":[{"name":"Vox","type":"TT_Audio","format":"TF_Stereo","index":1,
                "track_attributes":{"is_muted":true,"is_soloed":false,"is_selected":"None","contains_clips":true}}]}"#,
        )
        .unwrap();
        let track = &body.track_list[0];
        assert_eq!(track.track_type, "TT_Audio");
        assert!(track.track_attributes.is_muted);
        assert!(!track.track_attributes.selected());
    }

    #[test]
    fn test_toggle_request_shape() {
        let request = TrackToggleRequest {
            track_names: owned(&["Vox", "Bass"]),
            enabled: true,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"track_names":["Vox","Bass"],"enabled":true}"#
        );
    }
}
