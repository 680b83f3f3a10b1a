//! Injected settings collaborator
//!
//! The demo persists exactly one user preference: whether automatic
//! waiting is disabled. Persistence is not the observer core's concern,
//! so it lives behind a trait that the app wires up.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Preference key for disabling automatic waiting
pub const DISABLE_AUTO_WAIT_KEY: &str = "disable_automatic_waiting";

/// Key-value boolean preference store
pub trait SettingsProvider: Send + Sync {
    /// Read a stored boolean; `None` when never set
    fn bool_for(&self, key: &str) -> Option<bool>;

    /// Store a boolean
    fn set_bool(&self, key: &str, value: bool);
}

/// In-memory settings store for the demo and tests
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, bool>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsProvider for MemorySettings {
    fn bool_for(&self, key: &str) -> Option<bool> {
        self.values.lock().get(key).copied()
    }

    fn set_bool(&self, key: &str, value: bool) {
        tracing::debug!(key, value, "preference stored");
        self.values.lock().insert(key.to_string(), value);
    }
}
