use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Connection-wide state shared by every dispatch: the session id handed out
/// by `RegisterConnection` and whether the host has finished loading.
///
/// Register the connection before issuing commands from several tasks; reads
/// after that point always observe the registered id.
#[derive(Debug, Default)]
pub struct SessionContext {
    session_id: RwLock<String>,
    host_ready: AtomicBool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session id, empty until the connection is registered.
    pub fn session_id(&self) -> String {
        self.session_id
            .read()
            .map(|id| id.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn set_session_id(&self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        info!("🔑 Session id set to {}", session_id);
        match self.session_id.write() {
            Ok(mut id) => *id = session_id,
            Err(poisoned) => *poisoned.into_inner() = session_id,
        }
    }

    pub fn is_registered(&self) -> bool {
        !self.session_id().is_empty()
    }

    pub fn is_host_ready(&self) -> bool {
        self.host_ready.load(Ordering::Acquire)
    }

    pub fn set_host_ready(&self, ready: bool) {
        let previous = self.host_ready.swap(ready, Ordering::AcqRel);
        if previous != ready {
            debug!("Host readiness changed: {} -> {}", previous, ready);
        }
    }
}
