use crate::client::PtslClient;
use crate::handler::{EmptyBody, JsonCommand};
use crate::response::CommandResponse;
use ptsl_protos::CommandId;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct MixSource {
    pub source_type: String,
    pub name: String,
}

/// Where the bounce lands. Exports into the system temp directory are
/// always permitted; anything else needs the `export` permission group.
#[derive(Debug, Clone, Serialize)]
pub struct ExportLocation {
    pub directory: String,
    pub file_destination: String,
    pub import_after_bounce: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportMixRequest {
    pub file_name: String,
    pub file_type: String,
    pub mix_source_list: Vec<MixSource>,
    pub location_info: ExportLocation,
    pub offline_bounce: bool,
}

impl ExportMixRequest {
    /// Offline WAV bounce of one output bus into `directory`.
    pub fn wav(file_name: impl Into<String>, bus: impl Into<String>, directory: &Path) -> Self {
        Self {
            file_name: file_name.into(),
            file_type: "EMFType_WAV".to_string(),
            mix_source_list: vec![MixSource {
                source_type: "EMSType_Output".to_string(),
                name: bus.into(),
            }],
            location_info: ExportLocation {
                directory: directory.to_string_lossy().into_owned(),
                file_destination: "EMFDestination_Directory".to_string(),
                import_after_bounce: false,
            },
            offline_bounce: true,
        }
    }
}

impl PtslClient {
    /// Bounces the mix, polling task status until the host reports the
    /// bounce finished.
    pub async fn export_mix(&self, request: ExportMixRequest) -> CommandResponse<EmptyBody> {
        let handler =
            JsonCommand::<_, EmptyBody>::new(CommandId::ExportMix, request).with_task_status_ping();
        self.streaming(handler).await
    }
}
