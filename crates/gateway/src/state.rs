//! Shared gateway state: the wizard session registry.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use waypoint_flows::{SetupContext, SetupEngine};
use waypoint_wizard::SessionStatus;

/// A live wizard session. The inner mutex serializes calls per session:
/// the engine is single-writer and holding the lock across an `next` await
/// makes overlapping RPCs queue instead of interleave.
pub type SessionHandle = Arc<Mutex<SetupEngine>>;

pub struct GatewayState {
    /// Side-effect context handed to every new engine.
    pub context: SetupContext,
    /// Sessions by id. Lock ordering: registry first, then the session.
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl GatewayState {
    pub fn new(context: SetupContext) -> Self {
        Self {
            context,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn insert_session(&self, id: String, engine: SetupEngine) -> SessionHandle {
        let handle = Arc::new(Mutex::new(engine));
        self.sessions.lock().await.insert(id, handle.clone());
        handle
    }

    pub async fn session(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.lock().await.get(id).cloned()
    }

    pub async fn remove_session(&self, id: &str) {
        self.sessions.lock().await.remove(id);
    }

    /// True if any registered session is still running. Only one wizard may
    /// run at a time.
    pub async fn has_running_session(&self) -> bool {
        let handles: Vec<SessionHandle> = self.sessions.lock().await.values().cloned().collect();
        for handle in handles {
            if handle.lock().await.status() == SessionStatus::Running {
                return true;
            }
        }
        false
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
