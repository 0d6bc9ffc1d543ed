//! Quest behaviors on the behavior tree runtime.
//!
//! - [`targeting`]: best-target heuristic under an avoidance policy, plus the combat hook tree
//! - [`interact`]: interaction protocol that notices asynchronous cast interruptions
//! - [`behavior`]: lifecycle glue (settings memento, hook registration, progress checks)
//!
//! The host is reached only through the traits re-exported here; nothing in this crate blocks or
//! owns world entities.

#![forbid(unsafe_code)]

pub mod behavior;
pub mod config;
pub mod error;
pub mod events;
pub mod hooks;
pub mod interact;
pub mod memento;
pub mod progress;
pub mod targeting;

pub use behavior::{QuestBehavior, QuestWorld, COMBAT_HOOK_PRIORITY, INTERACTIONS_DONE};
pub use config::{InteractConfig, QuestBehaviorConfig, Timings};
pub use error::ConfigError;
pub use events::{
    Caster, InterruptEvent, InterruptFlag, InterruptHandler, InterruptSubscription,
    SpellcastEvents, SpellcastNotice, SubscriptionId,
};
pub use hooks::{HookHost, HookId, HookRegistration, COMBAT_MAIN_SLOT};
pub use interact::{Interact, InteractPhase, InteractWorld};
pub use memento::{HostSettings, SettingsMemento, SettingsOverrides, SettingsStore};
pub use progress::{CompleteRequirement, InLogRequirement, ProgressRequirements, QuestLog, QuestStatus};
pub use targeting::{
    choose_best_target, combat_hook, threat_score, AvoidancePolicy, CombatWorld, EffectId,
    SelectedTarget, TargetSelector, ThreatEntry, NEW_TARGET_STATUS,
};
