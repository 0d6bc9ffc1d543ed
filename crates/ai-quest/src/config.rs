//! Quest behavior configuration, loaded from YAML.

use std::path::Path;

use ai_nav::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::memento::SettingsOverrides;
use crate::progress::ProgressRequirements;
use crate::targeting::{AvoidancePolicy, EffectId};

/// Everything a quest behavior instance needs to know about its quest.
///
/// ```yaml
/// name: BreakingTheEmperorsShield
/// quest_id: 30798
/// start_location: { x: 3463.548, y: 1527.291, z: 814.9634 }
/// avoid_effects: [118596]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestBehaviorConfig {
    /// Shown in the host's goal line.
    #[serde(default = "default_name")]
    pub name: String,

    /// 0 means "no associated quest".
    pub quest_id: u32,

    pub requirements: ProgressRequirements,

    pub start_location: Vec3,

    #[serde(default = "default_start_label")]
    pub start_label: String,

    /// Arrival tolerance; the host's path precision when unset.
    pub precision: Option<f32>,

    /// Effects that make a target undesirable.
    pub avoid_effects: Vec<EffectId>,

    pub interact: InteractConfig,

    /// Host settings forced while the behavior runs.
    pub settings: SettingsOverrides,

    pub timings: Timings,
}

/// Objects to interact with once the start location is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractConfig {
    /// Entry ids of candidate objects; empty disables interaction.
    pub entries: Vec<u32>,

    /// Successful interactions needed before the behavior is done.
    #[serde(default = "default_interact_count")]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    #[serde(default = "default_notify_interval")]
    pub notify_interval_seconds: f64,

    #[serde(default = "default_move_settle")]
    pub move_settle_seconds: f64,

    #[serde(default = "default_after_interact")]
    pub after_interact_seconds: f64,

    #[serde(default = "default_cast_timeout")]
    pub cast_timeout_seconds: f64,

    #[serde(default = "default_recover")]
    pub recover_seconds: f64,
}

fn default_name() -> String {
    "QuestBehavior".to_string()
}
fn default_start_label() -> String {
    "start location".to_string()
}
fn default_interact_count() -> u32 {
    1
}
fn default_notify_interval() -> f64 {
    1.0
}
fn default_move_settle() -> f64 {
    0.1
}
fn default_after_interact() -> f64 {
    0.1
}
fn default_cast_timeout() -> f64 {
    15.0
}
fn default_recover() -> f64 {
    1.5
}

impl Default for QuestBehaviorConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            quest_id: 0,
            requirements: ProgressRequirements::default(),
            start_location: Vec3::ZERO,
            start_label: default_start_label(),
            precision: None,
            avoid_effects: Vec::new(),
            interact: InteractConfig::default(),
            settings: SettingsOverrides::default(),
            timings: Timings::default(),
        }
    }
}

impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            count: default_interact_count(),
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            notify_interval_seconds: default_notify_interval(),
            move_settle_seconds: default_move_settle(),
            after_interact_seconds: default_after_interact(),
            cast_timeout_seconds: default_cast_timeout(),
            recover_seconds: default_recover(),
        }
    }
}

impl Timings {
    fn check(&self) -> Result<()> {
        let all = [
            ("notify_interval_seconds", self.notify_interval_seconds),
            ("move_settle_seconds", self.move_settle_seconds),
            ("after_interact_seconds", self.after_interact_seconds),
            ("cast_timeout_seconds", self.cast_timeout_seconds),
            ("recover_seconds", self.recover_seconds),
        ];
        for (name, value) in all {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTiming { name, value });
            }
        }
        Ok(())
    }
}

impl QuestBehaviorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config file. Does not validate; see [`QuestBehaviorConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Checks that do not need the world. The quest-log check happens at start.
    pub fn validate(&self) -> Result<()> {
        if let Some(precision) = self.precision {
            if !precision.is_finite() || precision <= 0.0 {
                return Err(ConfigError::InvalidPrecision(precision));
            }
        }
        if self.avoid_effects.is_empty() {
            return Err(ConfigError::EmptyAvoidancePolicy);
        }
        if !self.interact.entries.is_empty() && self.interact.count == 0 {
            return Err(ConfigError::InvalidInteractCount);
        }
        self.timings.check()
    }

    pub fn avoidance_policy(&self) -> AvoidancePolicy {
        self.avoid_effects.iter().copied().collect()
    }

    pub fn interaction_enabled(&self) -> bool {
        !self.interact.entries.is_empty()
    }
}
