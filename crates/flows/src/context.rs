//! Side-effect seams handed to step hooks.

use std::sync::{Arc, Mutex};

use waypoint_config::Config;

/// Where committed configs go. The file-backed store is the production
/// implementation; tests swap in [`MemoryConfigStore`].
pub trait ConfigStore: Send + Sync {
    /// Persist the config and return the form that was actually stored.
    fn commit(&self, config: &Config) -> anyhow::Result<Config>;
}

/// Persists to `waypoint.toml` via `waypoint-config`.
#[derive(Debug, Default)]
pub struct FileConfigStore;

impl ConfigStore for FileConfigStore {
    fn commit(&self, config: &Config) -> anyhow::Result<Config> {
        let normalized = config.clone().normalized();
        waypoint_config::save_config(&normalized)?;
        Ok(normalized)
    }
}

/// In-memory store capturing the last committed config.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    saved: Mutex<Option<Config>>,
}

impl MemoryConfigStore {
    pub fn saved(&self) -> Option<Config> {
        self.saved.lock().ok().and_then(|guard| guard.clone())
    }
}

impl ConfigStore for MemoryConfigStore {
    fn commit(&self, config: &Config) -> anyhow::Result<Config> {
        let normalized = config.clone().normalized();
        if let Ok(mut guard) = self.saved.lock() {
            *guard = Some(normalized.clone());
        }
        Ok(normalized)
    }
}

/// Per-session context passed to every step hook.
#[derive(Clone)]
pub struct SetupContext {
    pub store: Arc<dyn ConfigStore>,
}

impl SetupContext {
    pub fn file_backed() -> Self {
        Self {
            store: Arc::new(FileConfigStore),
        }
    }

    pub fn in_memory() -> (Self, Arc<MemoryConfigStore>) {
        let store = Arc::new(MemoryConfigStore::default());
        (
            Self {
                store: store.clone(),
            },
            store,
        )
    }
}
