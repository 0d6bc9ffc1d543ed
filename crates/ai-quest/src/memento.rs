use serde::{Deserialize, Serialize};

/// Host settings a quest behavior may temporarily change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSettings {
    /// Radius within which the host pulls hostiles on its own.
    pub pull_distance: f32,
    pub kill_between_hotspots: bool,
}

/// Values to force while the behavior runs; `None` leaves the user's setting alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOverrides {
    pub pull_distance: Option<f32>,
    pub kill_between_hotspots: Option<bool>,
}

impl Default for SettingsOverrides {
    fn default() -> Self {
        Self {
            pull_distance: Some(25.0),
            kill_between_hotspots: Some(true),
        }
    }
}

impl SettingsOverrides {
    pub fn none() -> Self {
        Self {
            pull_distance: None,
            kill_between_hotspots: None,
        }
    }

    pub fn apply_to(&self, settings: &HostSettings) -> HostSettings {
        HostSettings {
            pull_distance: self.pull_distance.unwrap_or(settings.pull_distance),
            kill_between_hotspots: self
                .kill_between_hotspots
                .unwrap_or(settings.kill_between_hotspots),
        }
    }
}

pub trait SettingsStore {
    fn settings(&self) -> HostSettings;

    fn apply_settings(&mut self, settings: HostSettings);
}

/// Captured user settings, put back by [`SettingsMemento::restore`].
///
/// Restoring is idempotent so every stop path can call it.
#[derive(Debug, Default)]
pub struct SettingsMemento {
    saved: Option<HostSettings>,
}

impl SettingsMemento {
    pub fn capture<S: SettingsStore + ?Sized>(store: &S) -> Self {
        Self {
            saved: Some(store.settings()),
        }
    }

    pub fn restore<S: SettingsStore + ?Sized>(&mut self, store: &mut S) -> bool {
        match self.saved.take() {
            Some(saved) => {
                store.apply_settings(saved);
                true
            }
            None => false,
        }
    }
}
