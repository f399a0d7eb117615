//! Typed command methods on [`PtslClient`](crate::client::PtslClient).
//!
//! Each submodule adds an `impl PtslClient` block plus the request and body
//! types of its commands. Every method returns a
//! [`CommandResponse`](crate::response::CommandResponse), never an error.

pub mod connection;
pub mod editing;
pub mod export;
pub mod markers;
pub mod playback;
pub mod raw;
pub mod session;
pub mod tracks;

pub use connection::{
    HostReadyCheckBody, PtslVersionBody, RegisterConnectionBody, RegisterConnectionRequest,
};
pub use editing::{TimelineSelection, TimelineSelectionRequest};
pub use export::{ExportLocation, ExportMixRequest, MixSource};
pub use markers::{
    ClearMemoryLocationBody, CreateMemoryLocationRequest, MemoryLocation, MemoryLocationsBody,
};
pub use playback::{PlaybackModeBody, TransportStateBody};
pub use raw::RawCommand;
pub use session::{
    CurrentSettingBody, SaveSessionAsRequest, SessionLengthBody, SessionNameBody,
    SampleRateBody, SessionPath, SessionPathBody,
};
pub use tracks::{TrackAttributes, TrackInfo, TrackListBody};
