//! Scripted host: a walk to a vault door, an ambush with one shielded caster, and a lever.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

use ai_bt::BtNode;
use ai_core::{Blackboard, TickContext, WorldMut, WorldView};
use ai_nav::{MoveResult, MovementWorld, Vec3};
use ai_quest::{
    Caster, CombatWorld, EffectId, HookHost, HookId, HostSettings, InteractWorld, InterruptEvent,
    InterruptHandler, QuestLog, QuestStatus, SettingsStore, SpellcastEvents, SpellcastNotice,
    SubscriptionId, ThreatEntry,
};

pub type UnitId = u64;

pub const SHIELD: EffectId = EffectId(118_596);
pub const LEVER_ENTRY: u32 = 211_520;
pub const QUEST_ID: u32 = 30798;

/// World units per second.
const RUN_SPEED: f32 = 7.0;
const CAST_SECONDS: f64 = 2.0;
const DAMAGE_PER_SECOND: f32 = 40.0;
/// Hostiles notice the agent inside this radius.
const AGGRO_RADIUS: f32 = 8.0;

#[derive(Debug, Clone)]
struct SimUnit {
    id: UnitId,
    entry: u32,
    name: String,
    position: Vec3,
    hostile: bool,
    is_elite: bool,
    effects: Vec<EffectId>,
    health: f32,
    aggroed: bool,
    used: bool,
}

impl SimUnit {
    fn hostile(id: UnitId, name: &str, position: Vec3, health: f32) -> Self {
        Self {
            id,
            entry: 60_572,
            name: name.to_string(),
            position,
            hostile: true,
            is_elite: false,
            effects: Vec::new(),
            health,
            aggroed: false,
            used: false,
        }
    }

    fn alive(&self) -> bool {
        self.health > 0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Cast {
    target: UnitId,
    remaining: f64,
}

struct Hook {
    slot: String,
    priority: i32,
    id: HookId,
    tree: Box<dyn BtNode<SimWorld>>,
}

/// Counters reported when the run ends.
#[derive(Debug, Clone, Default)]
pub struct SimStats {
    pub move_commands: u32,
    pub interacts: u32,
    pub interrupts: u32,
    pub retargets: u32,
    pub kills: u32,
}

pub struct SimWorld {
    dt: f64,
    position: Vec3,
    moving: bool,
    units: Vec<SimUnit>,
    current_target: Option<UnitId>,
    kill_poi: Option<UnitId>,
    cast: Option<Cast>,
    handlers: Vec<(InterruptEvent, SubscriptionId, InterruptHandler)>,
    next_subscription: u64,
    hooks: Vec<Hook>,
    next_hook: u64,
    quests: BTreeMap<u32, QuestStatus>,
    settings: HostSettings,
    status: String,
    stats: SimStats,
}

impl SimWorld {
    /// The vault approach. `dt` is the host's tick length in seconds.
    pub fn scenario(dt: f64) -> Self {
        let mut precursor = SimUnit::hostile(1, "Shao-Tien Precursor", Vec3::new(18.0, 4.0, 0.0), 60.0);
        precursor.effects.push(SHIELD);
        let soul_render = SimUnit::hostile(2, "Shao-Tien Soul-Render", Vec3::new(20.0, -3.0, 0.0), 80.0);
        let mut warlord = SimUnit::hostile(3, "Mogu Warlord", Vec3::new(22.0, 2.0, 0.0), 200.0);
        warlord.is_elite = true;
        let lever = SimUnit {
            entry: LEVER_ENTRY,
            hostile: false,
            ..SimUnit::hostile(100, "Vault Lever", Vec3::new(31.0, 1.0, 0.0), 1.0)
        };

        let mut quests = BTreeMap::new();
        quests.insert(
            QUEST_ID,
            QuestStatus {
                name: "Breaking the Emperor's Shield".to_string(),
                is_complete: false,
            },
        );

        Self {
            dt,
            position: Vec3::ZERO,
            moving: false,
            units: vec![precursor, soul_render, warlord, lever],
            current_target: None,
            kill_poi: None,
            cast: None,
            handlers: Vec::new(),
            next_subscription: 1,
            hooks: Vec::new(),
            next_hook: 1,
            quests,
            settings: HostSettings {
                pull_distance: 40.0,
                kill_between_hotspots: false,
            },
            status: String::new(),
            stats: SimStats::default(),
        }
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn host_settings(&self) -> &HostSettings {
        &self.settings
    }

    pub fn quest_complete(&self) -> bool {
        self.quests.get(&QUEST_ID).is_some_and(|q| q.is_complete)
    }

    /// Host bookkeeping before anything is evaluated: hostiles notice the agent.
    pub fn begin_tick(&mut self, ctx: &TickContext) {
        let position = self.position;
        let spotted = self.units.iter().any(|u| {
            u.hostile && u.alive() && !u.aggroed && u.position.distance(position) <= AGGRO_RADIUS
        });
        if !spotted {
            return;
        }

        for unit in self.units.iter_mut().filter(|u| u.hostile && u.alive()) {
            unit.aggroed = true;
        }
        self.moving = false;
        self.current_target = self.nearest_aggroed();
        tracing::info!(
            tick = ctx.tick,
            unit = ?self.current_target.map(|id| self.describe(id)),
            "ambushed"
        );
    }

    /// Evaluate every hook in `slot`, lowest priority first.
    pub fn run_hooks(&mut self, slot: &str, ctx: &TickContext, blackboard: &mut Blackboard) -> usize {
        let mut hooks = std::mem::take(&mut self.hooks);
        hooks.sort_by_key(|h| h.priority);

        let mut ran = 0;
        for hook in hooks.iter_mut().filter(|h| h.slot == slot) {
            let status = hook.tree.tick(ctx, self, blackboard);
            tracing::trace!(slot, id = ?hook.id, ?status, "hook evaluated");
            ran += 1;
        }

        // Keep anything inserted while the hooks ran.
        hooks.append(&mut self.hooks);
        self.hooks = hooks;
        ran
    }

    /// Cancel the agent's cast and tell subscribers, from another thread the way a game client
    /// would. Returns false when nothing was being cast.
    pub fn interrupt_cast(&mut self) -> Result<bool> {
        let Some(cast) = self.cast.take() else {
            return Ok(false);
        };
        self.stats.interrupts += 1;
        tracing::info!(lever = %self.describe(cast.target), "cast interrupted");
        self.deliver(InterruptEvent::SpellcastInterrupted)?;
        Ok(true)
    }

    /// Advance the host by one tick: casts progress and the agent fights.
    pub fn advance(&mut self) {
        if let Some(cast) = self.cast.as_mut() {
            cast.remaining -= self.dt;
            if cast.remaining <= 0.0 {
                let target = cast.target;
                self.cast = None;
                self.complete_cast(target);
            }
        }

        if self.in_combat() {
            self.fight();
        }
    }

    fn complete_cast(&mut self, target: UnitId) {
        if let Some(unit) = self.units.iter_mut().find(|u| u.id == target) {
            unit.used = true;
        }
        if let Some(quest) = self.quests.get_mut(&QUEST_ID) {
            quest.is_complete = true;
        }
        tracing::info!(lever = %self.describe(target), "cast finished, objective complete");
    }

    fn fight(&mut self) {
        let dps = DAMAGE_PER_SECOND * self.dt as f32;
        let Some(target) = self.current_target else {
            self.current_target = self.nearest_aggroed();
            return;
        };
        let Some(index) = self.units.iter().position(|u| u.id == target && u.alive()) else {
            self.current_target = self.nearest_aggroed();
            return;
        };
        let unit = &mut self.units[index];

        if unit.effects.contains(&SHIELD) {
            // Immune; only a target switch helps.
            return;
        }
        unit.health -= dps;
        if unit.alive() {
            return;
        }

        tracing::info!(unit = %unit.name, "killed");
        self.stats.kills += 1;
        if self.kill_poi == Some(target) {
            self.kill_poi = None;
        }
        self.current_target = self.nearest_aggroed();

        // The last survivor loses its shield.
        let survivors: Vec<usize> = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.hostile && u.alive())
            .map(|(i, _)| i)
            .collect();
        if let [last] = survivors.as_slice() {
            let unit = &mut self.units[*last];
            if unit.effects.contains(&SHIELD) {
                unit.effects.retain(|e| *e != SHIELD);
                tracing::info!(unit = %unit.name, "shield collapsed");
            }
        }
    }

    fn nearest_aggroed(&self) -> Option<UnitId> {
        self.units
            .iter()
            .filter(|u| u.hostile && u.aggroed && u.alive())
            .min_by(|a, b| {
                a.position
                    .distance(self.position)
                    .total_cmp(&b.position.distance(self.position))
            })
            .map(|u| u.id)
    }

    fn unit(&self, id: UnitId) -> Option<&SimUnit> {
        self.units.iter().find(|u| u.id == id && u.alive())
    }

    fn threat(&self, unit: &SimUnit) -> ThreatEntry<UnitId> {
        ThreatEntry {
            id: unit.id,
            distance: unit.position.distance(self.position),
            is_elite: unit.is_elite,
            active_effects: unit.effects.clone(),
        }
    }

    fn deliver(&self, event: InterruptEvent) -> Result<()> {
        let handlers: Vec<InterruptHandler> = self
            .handlers
            .iter()
            .filter(|(e, _, _)| *e == event)
            .map(|(_, _, h)| h.clone())
            .collect();
        let notice = SpellcastNotice {
            event,
            caster: Caster::Player,
            spell_name: "Opening".to_string(),
            spell_id: 6478,
        };
        std::thread::spawn(move || {
            for handler in &handlers {
                handler(&notice);
            }
        })
        .join()
        .map_err(|_| anyhow!("event delivery thread panicked"))
    }
}

impl WorldView for SimWorld {
    type Entity = UnitId;

    fn describe(&self, entity: UnitId) -> String {
        self.units
            .iter()
            .find(|u| u.id == entity)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("unit {entity}"))
    }
}

impl WorldMut for SimWorld {
    fn notify_user(&mut self, message: &str) {
        if !message.is_empty() {
            tracing::info!("{message}");
        }
        self.status = message.to_string();
    }

    fn status_text(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn report_error(&mut self, message: &str) {
        tracing::error!("{message}");
    }

    fn set_goal_text(&mut self, text: &str) {
        if text.is_empty() {
            tracing::debug!("goal cleared");
        } else {
            tracing::info!(goal = text, "goal");
        }
    }
}

impl MovementWorld for SimWorld {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_moving(&self) -> bool {
        self.moving
    }

    fn move_to(&mut self, destination: Vec3) -> MoveResult {
        self.stats.move_commands += 1;
        self.moving = true;
        self.position = self
            .position
            .step_towards(destination, RUN_SPEED * self.dt as f32);
        MoveResult::Succeeded
    }

    fn direct_move(&mut self, destination: Vec3) {
        self.stats.move_commands += 1;
        self.moving = true;
        self.position = self
            .position
            .step_towards(destination, RUN_SPEED * self.dt as f32);
    }

    fn stop_moving(&mut self) {
        self.moving = false;
    }
}

impl CombatWorld for SimWorld {
    fn hostile_aggroed_units(&self) -> Vec<ThreatEntry<UnitId>> {
        self.units
            .iter()
            .filter(|u| u.hostile && u.aggroed && u.alive())
            .map(|u| self.threat(u))
            .collect()
    }

    fn lookup(&self, id: UnitId) -> Option<ThreatEntry<UnitId>> {
        self.unit(id).map(|u| self.threat(u))
    }

    fn in_combat(&self) -> bool {
        self.units.iter().any(|u| u.hostile && u.aggroed && u.alive())
    }

    fn current_target(&self) -> Option<UnitId> {
        self.current_target
    }

    fn set_kill_poi(&mut self, id: UnitId) {
        self.kill_poi = Some(id);
    }

    fn target(&mut self, id: UnitId) {
        if self.current_target != Some(id) {
            self.stats.retargets += 1;
        }
        self.current_target = Some(id);
    }
}

impl InteractWorld for SimWorld {
    fn is_viable(&self, entity: UnitId) -> bool {
        self.unit(entity).is_some_and(|u| !u.used)
    }

    fn interact(&mut self, entity: UnitId) {
        self.stats.interacts += 1;
        self.cast = Some(Cast {
            target: entity,
            remaining: CAST_SECONDS,
        });
        tracing::info!(lever = %self.describe(entity), "casting Opening");
    }

    fn has_active_cast(&self) -> bool {
        self.cast.is_some()
    }

    fn find_by_entry(&self, entries: &[u32]) -> Vec<UnitId> {
        let mut found: Vec<&SimUnit> = self
            .units
            .iter()
            .filter(|u| u.alive() && !u.used && entries.contains(&u.entry))
            .collect();
        found.sort_by(|a, b| {
            a.position
                .distance(self.position)
                .total_cmp(&b.position.distance(self.position))
        });
        found.into_iter().map(|u| u.id).collect()
    }
}

impl SpellcastEvents for SimWorld {
    fn subscribe(&mut self, event: InterruptEvent, handler: InterruptHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.handlers.push((event, id, handler));
        id
    }

    fn unsubscribe(&mut self, event: InterruptEvent, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(e, i, _)| !(*e == event && *i == id));
        self.handlers.len() != before
    }
}

impl HookHost<SimWorld> for SimWorld {
    fn insert_hook(&mut self, slot: &str, priority: i32, tree: Box<dyn BtNode<SimWorld>>) -> HookId {
        let id = HookId(self.next_hook);
        self.next_hook += 1;
        self.hooks.push(Hook {
            slot: slot.to_string(),
            priority,
            id,
            tree,
        });
        id
    }

    fn remove_hook(&mut self, slot: &str, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|h| !(h.slot == slot && h.id == id));
        self.hooks.len() != before
    }
}

impl QuestLog for SimWorld {
    fn quest_status(&self, quest_id: u32) -> Option<QuestStatus> {
        self.quests.get(&quest_id).cloned()
    }
}

impl SettingsStore for SimWorld {
    fn settings(&self) -> HostSettings {
        self.settings.clone()
    }

    fn apply_settings(&mut self, settings: HostSettings) {
        tracing::debug!(
            pull_distance = settings.pull_distance,
            kill_between_hotspots = settings.kill_between_hotspots,
            "host settings changed"
        );
        self.settings = settings;
    }
}
