use crate::client::PtslClient;
use crate::handler::{EmptyBody, JsonCommand};
use crate::response::CommandResponse;
use ptsl_protos::CommandId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryLocation {
    pub number: i32,
    pub name: String,
    /// `MLC_MainRuler`, `MLC_Track`, ...
    pub location: String,
    pub track_name: String,
    pub reference: String,
    pub start_time: String,
    pub end_time: String,
    pub time_properties: String,
    pub comments: String,
    pub color_index: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryLocationsBody {
    #[serde(default)]
    pub memory_locations: Vec<MemoryLocation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateMemoryLocationRequest {
    pub name: String,
    pub start_time: String,
    pub time_properties: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_index: Option<i32>,
}

impl CreateMemoryLocationRequest {
    /// A plain marker on the main ruler.
    pub fn marker(name: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_time: start_time.into(),
            time_properties: "TProperties_Marker".to_string(),
            location: "MarkerLocation_MainRuler".to_string(),
            number: None,
            track_name: None,
            comments: None,
            color_index: None,
        }
    }

    /// Pins the marker to a track instead of the ruler.
    pub fn on_track(mut self, track_name: impl Into<String>) -> Self {
        self.location = "MarkerLocation_Track".to_string();
        self.track_name = Some(track_name.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearMemoryLocationBody {
    pub success_count: i32,
    pub failure_count: i32,
    pub failure_list: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
struct ClearMemoryLocationRequest {
    location_list: Vec<i32>,
}

impl PtslClient {
    pub async fn get_memory_locations(&self) -> CommandResponse<MemoryLocationsBody> {
        self.unary(JsonCommand::<_, MemoryLocationsBody>::without_params(
            CommandId::GetMemoryLocations,
        ))
        .await
    }

    pub async fn create_memory_location(
        &self,
        request: CreateMemoryLocationRequest,
    ) -> CommandResponse<EmptyBody> {
        self.unary(JsonCommand::<_, EmptyBody>::new(
            CommandId::CreateMemoryLocation,
            request,
        ))
        .await
    }

    pub async fn clear_memory_location(
        &self,
        numbers: &[i32],
    ) -> CommandResponse<ClearMemoryLocationBody> {
        let request = ClearMemoryLocationRequest {
            location_list: numbers.to_vec(),
        };
        self.unary(JsonCommand::<_, ClearMemoryLocationBody>::new(
            CommandId::ClearMemoryLocation,
            request,
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_request_omits_unset_fields() {
        let request = CreateMemoryLocationRequest::marker("Verse", "48000");
        let json: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(json["location"], "MarkerLocation_MainRuler");
        assert!(json.get("track_name").is_none());

        let on_track = CreateMemoryLocationRequest::marker("Verse", "48000").on_track("Vox");
        let json: serde_json::Value = serde_json::to_value(&on_track).unwrap();
        assert_eq!(json["location"], "MarkerLocation_Track");
        assert_eq!(json["track_name"], "Vox");
    }

    #[test]
    fn test_memory_locations_body() {
        let body: MemoryLocationsBody = serde_json::from_str(
            r#"{"memory_locations":[{"number":1,"name":"Crafting Chapter","location":"MLC_Track",
                "track_name":"Voice","start_time":"7957007","end_time":"7957007","color_index":11}]}"#,
        )
        .unwrap();
        assert_eq!(body.memory_locations.len(), 1);
        assert_eq!(body.memory_locations[0].color_index, 11);
        assert_eq!(body.memory_locations[0].comments, "");
    }
}
