//! Quest behavior lifecycle: assembles the main tree and the combat hook, and owns everything
//! that has to be undone on stop.

use ai_bt::builder::{decorator, priority};
use ai_bt::{BtNode, BtPolicy, BtStatus};
use ai_core::{BbKey, Blackboard, TickContext};
use ai_nav::{MoveWithinRange, MovementWorld};

use crate::config::QuestBehaviorConfig;
use crate::error::ConfigError;
use crate::events::SpellcastEvents;
use crate::hooks::{HookHost, HookRegistration, COMBAT_MAIN_SLOT};
use crate::interact::{Interact, InteractWorld};
use crate::memento::{SettingsMemento, SettingsStore};
use crate::progress::QuestLog;
use crate::targeting::{combat_hook, CombatWorld};

/// Everything a quest behavior needs from its host.
pub trait QuestWorld:
    MovementWorld
    + CombatWorld
    + InteractWorld
    + SpellcastEvents
    + QuestLog
    + SettingsStore
    + HookHost<Self>
    + Sized
    + 'static
{
}

impl<T> QuestWorld for T where
    T: MovementWorld
        + CombatWorld
        + InteractWorld
        + SpellcastEvents
        + QuestLog
        + SettingsStore
        + HookHost<T>
        + 'static
{
}

/// Number of interactions completed so far.
pub const INTERACTIONS_DONE: BbKey<u32> = BbKey::new(0x0E57_0000_0000_0001, "quest.interactions_done");

/// Priority of the combat hook within [`COMBAT_MAIN_SLOT`].
pub const COMBAT_HOOK_PRIORITY: i32 = 0;

/// A quest behavior driven by the host's scheduler.
///
/// The host calls [`on_start`](Self::on_start) once, then [`tick`](Self::tick) until
/// [`is_done`](Self::is_done), and [`on_stop`](Self::on_stop) on completion or shutdown.
pub struct QuestBehavior<W>
where
    W: QuestWorld,
{
    config: QuestBehaviorConfig,
    blackboard: Blackboard,
    root: Option<BtPolicy<W>>,
    hook: HookRegistration,
    memento: SettingsMemento,
    problem: Option<String>,
    started: bool,
    stopped: bool,
}

impl<W> QuestBehavior<W>
where
    W: QuestWorld,
{
    pub fn new(config: QuestBehaviorConfig) -> Self {
        Self {
            config,
            blackboard: Blackboard::new(),
            root: None,
            hook: HookRegistration::default(),
            memento: SettingsMemento::default(),
            problem: None,
            started: false,
            stopped: false,
        }
    }

    pub fn config(&self) -> &QuestBehaviorConfig {
        &self.config
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    /// For installing trace sinks and similar before the first tick.
    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// The configuration problem reported at start, if any.
    pub fn problem(&self) -> Option<&str> {
        self.problem.as_deref()
    }

    pub fn is_hooked(&self) -> bool {
        self.hook.is_active()
    }

    pub fn interactions_done(&self) -> u32 {
        self.blackboard.get(INTERACTIONS_DONE).copied().unwrap_or(0)
    }

    pub fn is_done(&self, world: &W) -> bool {
        if self.problem.is_some() {
            return true;
        }
        let interactions_finished =
            self.config.interaction_enabled() && self.interactions_done() >= self.config.interact.count;
        interactions_finished || !self.config.requirements.met(world, self.config.quest_id)
    }

    /// Validate, capture and override host settings, insert the combat hook, build the tree.
    ///
    /// A configuration problem is reported to the user once and makes the behavior done.
    pub fn on_start(&mut self, world: &mut W) -> Result<(), ConfigError> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        let quest_id = self.config.quest_id;
        let quest = if quest_id == 0 {
            None
        } else {
            world.quest_status(quest_id)
        };
        let checked = self.config.validate().and_then(|()| {
            if quest_id != 0 && quest.is_none() {
                Err(ConfigError::QuestNotInLog(quest_id))
            } else {
                Ok(())
            }
        });
        if let Err(err) = checked {
            let message = format!("{}: {err}", self.config.name);
            tracing::error!(behavior = %self.config.name, error = %err, "configuration problem");
            world.report_error(&message);
            self.problem = Some(message);
            return Err(err);
        }

        // Already complete: nothing to announce and nothing to undo later.
        if self.is_done(world) {
            tracing::debug!(behavior = %self.config.name, "progress requirements not met, skipping");
            return Ok(());
        }

        self.memento = SettingsMemento::capture(&*world);
        let forced = self.config.settings.apply_to(&world.settings());
        world.apply_settings(forced);

        let goal = match &quest {
            Some(quest) => format!("{}: \"{}\"", self.config.name, quest.name),
            None => format!("{}: In Progress (no associated quest)", self.config.name),
        };
        world.set_goal_text(&goal);

        self.hook = HookRegistration::insert(
            world,
            COMBAT_MAIN_SLOT,
            COMBAT_HOOK_PRIORITY,
            combat_hook::<W>(self.config.avoidance_policy()),
        );
        self.root = Some(BtPolicy::new(self.build_root()));
        tracing::info!(behavior = %self.config.name, quest_id, "behavior started");
        Ok(())
    }

    /// One evaluation of the main tree.
    ///
    /// `Failure` when the behavior never started (or was stopped); `Success` once done.
    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) -> BtStatus {
        if self.is_done(world) {
            return if self.problem.is_some() {
                BtStatus::Failure
            } else {
                BtStatus::Success
            };
        }
        match self.root.as_mut() {
            Some(root) => root.tick(ctx, world, &mut self.blackboard),
            None => BtStatus::Failure,
        }
    }

    /// Teardown for completion, cancellation and host shutdown alike. Idempotent.
    pub fn on_stop(&mut self, world: &mut W) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        self.hook.release::<W, W>(world);
        if let Some(mut root) = self.root.take() {
            // Releases a live interrupt subscription wherever the interaction was.
            root.reset(world);
        }
        if self.memento.restore(world) {
            tracing::debug!(behavior = %self.config.name, "host settings restored");
        }
        world.set_goal_text("");
        world.notify_user("");
        tracing::info!(behavior = %self.config.name, "behavior stopped");
    }

    fn build_root(&self) -> Box<dyn BtNode<W>> {
        let config = &self.config;
        let timings = &config.timings;

        let mut movement = MoveWithinRange::to_point(config.start_location, config.start_label.clone())
            .with_notify_interval(timings.notify_interval_seconds)
            .with_settle_delay(timings.move_settle_seconds);
        if let Some(precision) = config.precision {
            movement = movement.with_precision(move |_, _, _| precision);
        }

        let mut branches = vec![movement.build()];
        if config.interaction_enabled() {
            let entries = config.interact.entries.clone();
            let candidates = entries.clone();
            let needed = config.interact.count;

            let interact = Interact::new(
                move |_ctx: &TickContext, world: &W, _bb: &Blackboard| first_viable(world, &entries),
                |_ctx: &TickContext, _world: &mut W, bb: &mut Blackboard, _entity| {
                    *bb.get_or_insert_with(INTERACTIONS_DONE, || 0) += 1;
                },
            )
            .with_after_interact_delay(timings.after_interact_seconds)
            .with_cast_timeout(timings.cast_timeout_seconds)
            .with_recover_delay(timings.recover_seconds);

            branches.push(decorator(
                move |_ctx: &TickContext, world: &W, bb: &Blackboard| {
                    let done = bb.get(INTERACTIONS_DONE).copied().unwrap_or(0);
                    done < needed && first_viable(world, &candidates).is_some()
                },
                Box::new(interact),
            ));
        }
        priority(branches)
    }
}

fn first_viable<W: InteractWorld>(world: &W, entries: &[u32]) -> Option<W::Entity> {
    world
        .find_by_entry(entries)
        .into_iter()
        .find(|entity| world.is_viable(*entity))
}
