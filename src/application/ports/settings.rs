use crate::shared::config::SyncSettings;
use std::sync::RwLock;

/// Sync policy owned externally (the host's settings screen). Read at
/// each gatekeeping step so changes apply to the very next trigger.
pub trait SettingsSource: Send + Sync {
    fn current(&self) -> SyncSettings;
}

/// Settings held in memory and replaced wholesale by the host.
pub struct InMemorySettings {
    inner: RwLock<SyncSettings>,
}

impl InMemorySettings {
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    pub fn replace(&self, settings: SyncSettings) {
        *self.inner.write().expect("settings lock poisoned") = settings;
    }
}

impl SettingsSource for InMemorySettings {
    fn current(&self) -> SyncSettings {
        self.inner.read().expect("settings lock poisoned").clone()
    }
}

impl Default for InMemorySettings {
    fn default() -> Self {
        Self::new(SyncSettings::default())
    }
}
