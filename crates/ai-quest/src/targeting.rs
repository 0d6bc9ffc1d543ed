//! Best-target selection under an avoidance policy, and the combat hook that drives it.
//!
//! The heuristic is deliberately sticky: as long as the current target carries none of the
//! avoided effects nothing is re-selected, so the agent does not churn between equally good
//! targets. Once the current target picks up an avoided effect, every aggroed hostile is scored
//! and the cheapest one wins.

use std::collections::BTreeSet;

use ai_bt::builder::{action, decorator};
use ai_bt::{BtNode, BtStatus};
use ai_core::{Blackboard, EntityId, TickContext, WorldMut};
use ai_tools::{emit as trace_emit, TraceEvent};
use serde::{Deserialize, Serialize};

/// Identifier of a status effect (aura, buff, shield) carried by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(pub u32);

/// One candidate in a threat snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatEntry<E> {
    pub id: E,
    /// Distance from the agent.
    pub distance: f32,
    pub is_elite: bool,
    pub active_effects: Vec<EffectId>,
}

/// Effects that penalize (but never exclude) a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvoidancePolicy {
    effects: BTreeSet<EffectId>,
}

impl AvoidancePolicy {
    pub fn new(effects: impl IntoIterator<Item = EffectId>) -> Self {
        Self {
            effects: effects.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// True if any of `active` is avoided.
    pub fn avoids(&self, active: &[EffectId]) -> bool {
        active.iter().any(|effect| self.effects.contains(effect))
    }
}

impl FromIterator<EffectId> for AvoidancePolicy {
    fn from_iter<I: IntoIterator<Item = EffectId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Status shown while the combat hook is looking for a replacement target.
pub const NEW_TARGET_STATUS: &str = "NEW TARGET";

pub const AVOIDED_WEIGHT: f32 = 1000.0;
pub const ELITE_WEIGHT: f32 = 100.0;

/// Lower is better.
pub fn threat_score<E>(entry: &ThreatEntry<E>, policy: &AvoidancePolicy) -> f32 {
    let avoided = if policy.avoids(&entry.active_effects) {
        AVOIDED_WEIGHT
    } else {
        1.0
    };
    let elite = if entry.is_elite { ELITE_WEIGHT } else { 1.0 };
    avoided * entry.distance * elite
}

/// Picks the target to engage.
///
/// - no current target: `None`, there is nothing to re-select from.
/// - `current` carries no avoided effect: keep it.
/// - otherwise: the minimum-score candidate of `snapshot`. On equal scores an unavoided
///   candidate wins, then the earliest entry.
///
/// Returns `None` when a re-selection was needed but the snapshot is empty; callers treat that
/// as "no safe target available", not as an error.
pub fn choose_best_target<E: EntityId>(
    current: Option<&ThreatEntry<E>>,
    snapshot: &[ThreatEntry<E>],
    policy: &AvoidancePolicy,
) -> Option<E> {
    let current = current?;
    if !policy.avoids(&current.active_effects) {
        return Some(current.id);
    }

    let mut best: Option<(E, f32, bool)> = None;
    for entry in snapshot {
        let score = threat_score(entry, policy);
        if score.is_nan() {
            continue;
        }
        let avoided = policy.avoids(&entry.active_effects);
        // On equal scores a clean unit beats an avoided one; otherwise the earliest entry stays.
        let better = match best {
            None => true,
            Some((_, best_score, best_avoided)) => {
                score < best_score || (score == best_score && best_avoided && !avoided)
            }
        };
        if better {
            best = Some((entry.id, score, avoided));
        }
    }
    best.map(|(id, _, _)| id)
}

/// Combat queries and commands used by target selection.
pub trait CombatWorld: WorldMut {
    /// Live, hostile units currently aggroed on the agent, in the host's enumeration order.
    fn hostile_aggroed_units(&self) -> Vec<ThreatEntry<Self::Entity>>;

    /// Fresh view of a unit, `None` once it has despawned or died.
    fn lookup(&self, id: Self::Entity) -> Option<ThreatEntry<Self::Entity>>;

    fn in_combat(&self) -> bool;

    fn current_target(&self) -> Option<Self::Entity>;

    /// Point the host's kill objective at `id`.
    fn set_kill_poi(&mut self, id: Self::Entity);

    /// Issue the target command.
    fn target(&mut self, id: Self::Entity);
}

/// Weak reference to a chosen unit: only the identity is kept, the unit is looked up again on
/// every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedTarget<E> {
    id: E,
}

impl<E: EntityId> SelectedTarget<E> {
    pub fn new(id: E) -> Self {
        Self { id }
    }

    pub fn id(&self) -> E {
        self.id
    }

    pub fn resolve<W>(&self, world: &W) -> Option<ThreatEntry<E>>
    where
        W: CombatWorld<Entity = E> + ?Sized,
    {
        world.lookup(self.id)
    }
}

fn current_target_avoided<W: CombatWorld + ?Sized>(world: &W, policy: &AvoidancePolicy) -> bool {
    world
        .current_target()
        .and_then(|id| world.lookup(id))
        .is_some_and(|entry| policy.avoids(&entry.active_effects))
}

/// Stateful selector: remembers its last pick (revalidated on every evaluation) and moves the
/// host's target to it when they differ.
pub struct TargetSelector<E> {
    policy: AvoidancePolicy,
    selected: Option<SelectedTarget<E>>,
}

impl<E: EntityId> TargetSelector<E> {
    pub fn new(policy: AvoidancePolicy) -> Self {
        Self {
            policy,
            selected: None,
        }
    }

    pub fn policy(&self) -> &AvoidancePolicy {
        &self.policy
    }

    pub fn selected(&self) -> Option<SelectedTarget<E>> {
        self.selected
    }

    /// Re-run selection against the current world and apply it.
    ///
    /// Leaves an acceptable current target alone. Returns the unit the agent should be fighting,
    /// `None` when there is no live target or no safe replacement.
    pub fn evaluate<W>(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> Option<E>
    where
        W: CombatWorld<Entity = E>,
    {
        // Drop a previous pick that no longer exists.
        if let Some(previous) = self.selected {
            if previous.resolve(&*world).is_none() {
                tracing::debug!(unit = ?previous.id(), "selected target is gone");
                trace_emit(
                    blackboard,
                    TraceEvent::new(ctx.tick, "target.lost").with_subject(previous.id()),
                );
                self.selected = None;
            }
        }

        let current = world.current_target().and_then(|id| world.lookup(id))?;
        if !self.policy.avoids(&current.active_effects) {
            return Some(current.id);
        }

        // Effects come and go without notice, so this runs on every evaluation.
        let snapshot = world.hostile_aggroed_units();
        self.selected =
            choose_best_target(Some(&current), &snapshot, &self.policy).map(SelectedTarget::new);
        let Some(selected) = self.selected else {
            tracing::debug!("no safe target available");
            return None;
        };
        let Some(entry) = selected.resolve(&*world) else {
            self.selected = None;
            return None;
        };

        if current.id != entry.id {
            let name = world.describe(entry.id);
            world.post_status(&format!("Selecting new target: {name}"));
            world.set_kill_poi(entry.id);
            world.target(entry.id);
            tracing::info!(unit = %name, distance = entry.distance, "selected new target");
            trace_emit(
                blackboard,
                TraceEvent::new(ctx.tick, "target.select")
                    .with_subject(entry.id)
                    .with_value(f64::from(threat_score(&entry, &self.policy))),
            );
        }

        Some(entry.id)
    }
}

/// Tree for the host's high-priority combat slot.
///
/// While in combat with a target that carries an avoided effect it flags the status line and
/// re-selects, then always reports `Failure` so the host's own combat routine still runs this
/// tick.
pub fn combat_hook<W>(policy: AvoidancePolicy) -> Box<dyn BtNode<W>>
where
    W: CombatWorld + 'static,
{
    let gate = policy.clone();
    let mut selector = TargetSelector::new(policy);
    decorator(
        move |_ctx: &TickContext, world: &W, _bb: &Blackboard| {
            world.in_combat() && current_target_avoided(world, &gate)
        },
        action(move |ctx: &TickContext, world: &mut W, bb: &mut Blackboard| {
            world.post_status(NEW_TARGET_STATUS);
            selector.evaluate(ctx, world, bb);
            BtStatus::Failure
        }),
    )
}
