//! Write-permission groups gating commands that change the session.

use crate::error::PtslError;
use log::{info, warn};
use ptsl_protos::CommandId;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum PermissionGroup {
    /// Cut, paste, clear.
    Clipboard,
    /// Markers and memory locations.
    Memory,
    /// Record-enable state.
    TrackState,
    /// Creating tracks.
    TrackStructure,
    /// Open, close, save, import.
    Session,
    /// Exports outside the temp directory.
    Export,
    /// Record modes.
    Recording,
}

/// Commands that never need a permission group.
pub fn is_read_only(command: CommandId) -> bool {
    use CommandId::*;
    matches!(
        command,
        HostReadyCheck
            | RegisterConnection
            | GetTaskStatus
            | GetPtslVersion
            | GetSessionName
            | GetSessionPath
            | GetSessionSampleRate
            | GetSessionBitDepth
            | GetSessionTimeCodeRate
            | GetSessionStartTime
            | GetSessionLength
            | GetMainCounterFormat
            | GetTrackList
            | SelectTracksByName
            | GetPlaybackMode
            | GetRecordMode
            | GetTransportState
            | TogglePlayState
            | PlayHalfSpeed
            | GetEditMode
            | GetEditTool
            | GetTimelineSelection
            | GetMemoryLocations
            | SelectMemoryLocation
            | Undo
            | Redo
            | GetClipList
            | GetTrackPlaylists
            | GetPlaylistElements
            | GetFileLocation
            | Copy
            | SetTrackMuteState
            | SetTrackSoloState
            | SetTimelineSelection
            | SetEditTool
            | SetPlaybackMode
    )
}

pub fn group_for(command: CommandId) -> Option<PermissionGroup> {
    use CommandId::*;
    let group = match command {
        Cut | Paste | Clear => PermissionGroup::Clipboard,
        ClearMemoryLocation | EditMemoryLocation | CreateMemoryLocation
        | ClearAllMemoryLocations => PermissionGroup::Memory,
        SetTrackRecordEnableState => PermissionGroup::TrackState,
        CreateNewTracks => PermissionGroup::TrackStructure,
        CreateSession | OpenSession | CloseSession | SaveSession | SaveSessionAs
        | ImportAudioToClipList | SpotClipsById => PermissionGroup::Session,
        ExportClipsAsFiles | ExportMix | ExportSessionInfoAsText => PermissionGroup::Export,
        SetRecordMode | ToggleRecordEnable | RecordHalfSpeed => PermissionGroup::Recording,
        _ => return None,
    };
    Some(group)
}

/// Groups the client is allowed to use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions {
    allowed: BTreeSet<PermissionGroup>,
    temp_dir: Option<PathBuf>,
}

impl Permissions {
    /// Read-only: queries and playback only.
    pub fn read_only() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            allowed: PermissionGroup::iter().collect(),
            temp_dir: None,
        }
    }

    /// Parses `ALLOW_WRITES` syntax: empty, `all`, or a comma-separated
    /// list of group names. Unknown names are logged and skipped.
    pub fn parse(allow_writes: &str) -> Self {
        let allow_writes = allow_writes.trim();
        if allow_writes == "all" {
            return Self::all();
        }

        let mut allowed = BTreeSet::new();
        for name in allow_writes.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match PermissionGroup::from_str(name) {
                Ok(group) => {
                    allowed.insert(group);
                }
                Err(_) => warn!("⚠️  Unknown permission group '{}' in ALLOW_WRITES", name),
            }
        }
        Self {
            allowed,
            temp_dir: None,
        }
    }

    /// Overrides the directory exports may always target.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn allows(&self, group: PermissionGroup) -> bool {
        self.allowed.contains(&group)
    }

    pub fn allowed_groups(&self) -> Vec<String> {
        self.allowed.iter().map(|g| g.to_string()).collect()
    }

    pub fn log_status(&self) {
        if self.allowed.len() == PermissionGroup::iter().count() {
            warn!("⚠️  ALL OPERATIONS ENABLED - All permission groups allowed");
        } else if self.allowed.is_empty() {
            info!("🔒 READ-ONLY MODE - Only queries and playback allowed");
        } else {
            info!(
                "🔓 GRANULAR PERMISSIONS - Allowed: {}",
                self.allowed_groups().join(", ")
            );
        }
    }

    /// Decides whether `command` may be sent with the given request body.
    pub fn check(&self, command: CommandId, request_json: &str) -> Result<(), PtslError> {
        if is_read_only(command) {
            return Ok(());
        }

        let group = group_for(command).ok_or_else(|| {
            PtslError::PermissionDenied(format!(
                "{} is not in any known permission group",
                command.as_str_name()
            ))
        })?;

        if group == PermissionGroup::Export {
            let export_path = export_path(request_json);
            if export_path
                .as_deref()
                .is_some_and(|path| self.is_in_temp_dir(path))
            {
                return Ok(());
            }
            if !self.allows(PermissionGroup::Export) {
                return Err(PtslError::PermissionDenied(format!(
                    "{} may only export to {} unless ALLOW_WRITES includes 'export' (attempted path: {})",
                    command.as_str_name(),
                    self.temp_dir().display(),
                    export_path.unwrap_or_default()
                )));
            }
            return Ok(());
        }

        if !self.allows(group) {
            let allowed = self.allowed_groups();
            return Err(PtslError::PermissionDenied(format!(
                "{} requires the '{}' permission group (allowed: {}); set ALLOW_WRITES={} or ALLOW_WRITES=all",
                command.as_str_name(),
                group,
                if allowed.is_empty() {
                    "none".to_string()
                } else {
                    allowed.join(", ")
                },
                group
            )));
        }

        Ok(())
    }

    fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn is_in_temp_dir(&self, path: &str) -> bool {
        let path = Path::new(path);
        // Relative paths and parent traversal are never treated as temp.
        if !path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            return false;
        }
        path.starts_with(self.temp_dir())
    }
}

/// Destination of an export command, looked up in the usual request fields.
fn export_path(request_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(request_json).ok()?;
    ["file_location", "export_file_path", "destination_path", "output_path"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .or_else(|| {
            value
                .get("location_info")
                .and_then(|info| info.get("directory"))
                .and_then(|v| v.as_str())
        })
        .filter(|path| !path.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_writes() {
        assert_eq!(Permissions::parse(""), Permissions::read_only());
        assert_eq!(Permissions::parse("all"), Permissions::all());

        let perms = Permissions::parse("memory, track_state,bogus");
        assert!(perms.allows(PermissionGroup::Memory));
        assert!(perms.allows(PermissionGroup::TrackState));
        assert!(!perms.allows(PermissionGroup::Session));
        assert_eq!(perms.allowed_groups(), vec!["memory", "track_state"]);
    }

    #[test]
    fn test_read_only_commands_always_pass() {
        let perms = Permissions::read_only();
        assert!(perms.check(CommandId::GetSessionName, "{}").is_ok());
        assert!(perms.check(CommandId::HostReadyCheck, "{}").is_ok());
        assert!(perms.check(CommandId::GetTaskStatus, "{}").is_ok());
    }

    #[test]
    fn test_group_required() {
        let perms = Permissions::read_only();
        let err = perms.check(CommandId::SaveSession, "{}").unwrap_err();
        assert!(err.to_string().contains("session"));

        let perms = Permissions::parse("session");
        assert!(perms.check(CommandId::SaveSession, "{}").is_ok());
    }

    #[test]
    fn test_export_to_temp_dir_allowed() {
        let perms = Permissions::read_only().with_temp_dir("/tmp");
        assert!(perms
            .check(CommandId::ExportMix, r#"{"location_info":{"directory":"/tmp/bounces"}}"#)
            .is_ok());
        assert!(perms
            .check(CommandId::ExportMix, r#"{"file_location":"/tmp/../home/mix.wav"}"#)
            .is_err());
        assert!(perms
            .check(CommandId::ExportMix, r#"{"file_location":"/Users/me/mix.wav"}"#)
            .is_err());
        assert!(Permissions::parse("export")
            .check(CommandId::ExportMix, r#"{"file_location":"/Users/me/mix.wav"}"#)
            .is_ok());
    }

    #[test]
    fn test_every_command_is_classified() {
        for value in 0..200 {
            if let Ok(command) = CommandId::try_from(value) {
                assert!(
                    is_read_only(command) || group_for(command).is_some(),
                    "{} has no permission classification",
                    command.as_str_name()
                );
            }
        }
    }
}
