//! Recording host world shared by the quest integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use ai_bt::{BtNode, BtStatus};
use ai_core::{Blackboard, TickContext, WorldMut, WorldView};
use ai_nav::{MoveResult, MovementWorld, Vec3};
use ai_quest::{
    Caster, CombatWorld, EffectId, HookHost, HookId, HostSettings, InteractWorld, InterruptEvent,
    InterruptHandler, QuestLog, QuestStatus, SettingsStore, SpellcastEvents, SpellcastNotice,
    SubscriptionId, ThreatEntry,
};

pub type Unit = u64;

pub const SHIELD: EffectId = EffectId(118_596);

#[derive(Debug, Clone)]
pub struct UnitState {
    pub id: Unit,
    pub entry: u32,
    pub name: String,
    pub distance: f32,
    pub is_elite: bool,
    pub effects: Vec<EffectId>,
    pub alive: bool,
    pub aggroed: bool,
}

impl UnitState {
    pub fn hostile(id: Unit, distance: f32) -> Self {
        Self {
            id,
            entry: 60_572,
            name: format!("unit-{id}"),
            distance,
            is_elite: false,
            effects: Vec::new(),
            alive: true,
            aggroed: true,
        }
    }

    pub fn object(id: Unit, entry: u32, distance: f32) -> Self {
        Self {
            aggroed: false,
            entry,
            ..Self::hostile(id, distance)
        }
    }

    pub fn elite(mut self) -> Self {
        self.is_elite = true;
        self
    }

    pub fn with_effect(mut self, effect: EffectId) -> Self {
        self.effects.push(effect);
        self
    }

    fn threat(&self) -> ThreatEntry<Unit> {
        ThreatEntry {
            id: self.id,
            distance: self.distance,
            is_elite: self.is_elite,
            active_effects: self.effects.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    MoveTo(Vec3),
    DirectMove(Vec3),
    Stop,
    KillPoi(Unit),
    Target(Unit),
    Interact(Unit),
}

pub struct InstalledHook {
    pub slot: String,
    pub priority: i32,
    pub id: HookId,
    pub tree: Box<dyn BtNode<TestWorld>>,
}

pub struct TestWorld {
    pub position: Vec3,
    pub moving: bool,
    pub planner: MoveResult,
    pub units: Vec<UnitState>,
    pub in_combat: bool,
    pub current_target: Option<Unit>,
    pub casting: bool,
    pub cast_on_interact: bool,
    pub commands: Vec<Command>,
    pub notices: Vec<String>,
    pub errors: Vec<String>,
    pub goal: String,
    pub handlers: Vec<(InterruptEvent, SubscriptionId, InterruptHandler)>,
    pub subscribe_calls: Vec<(InterruptEvent, SubscriptionId)>,
    pub unsubscribe_calls: Vec<(InterruptEvent, SubscriptionId)>,
    next_subscription: u64,
    pub hooks: Vec<InstalledHook>,
    pub removed_hooks: Vec<(String, HookId)>,
    next_hook: u64,
    pub quests: BTreeMap<u32, QuestStatus>,
    pub settings: HostSettings,
    pub settings_writes: usize,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            moving: false,
            planner: MoveResult::Succeeded,
            units: Vec::new(),
            in_combat: false,
            current_target: None,
            casting: false,
            cast_on_interact: false,
            commands: Vec::new(),
            notices: Vec::new(),
            errors: Vec::new(),
            goal: String::new(),
            handlers: Vec::new(),
            subscribe_calls: Vec::new(),
            unsubscribe_calls: Vec::new(),
            next_subscription: 1,
            hooks: Vec::new(),
            removed_hooks: Vec::new(),
            next_hook: 1,
            quests: BTreeMap::new(),
            settings: HostSettings {
                pull_distance: 40.0,
                kill_between_hotspots: false,
            },
            settings_writes: 0,
        }
    }
}

impl TestWorld {
    pub fn with_units(units: impl IntoIterator<Item = UnitState>) -> Self {
        Self {
            units: units.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_quest(mut self, quest_id: u32, name: &str) -> Self {
        self.quests.insert(
            quest_id,
            QuestStatus {
                name: name.to_string(),
                is_complete: false,
            },
        );
        self
    }

    pub fn unit_mut(&mut self, id: Unit) -> &mut UnitState {
        self.units
            .iter_mut()
            .find(|u| u.id == id)
            .expect("unknown unit")
    }

    /// Deliver an event the way the host would: from outside tree evaluation.
    pub fn fire(&self, event: InterruptEvent, caster: Caster) {
        let notice = SpellcastNotice {
            event,
            caster,
            spell_name: "Opening".to_string(),
            spell_id: 6478,
        };
        let handlers: Vec<InterruptHandler> = self
            .handlers
            .iter()
            .filter(|(e, _, _)| *e == event)
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(&notice);
        }
    }

    pub fn live_subscriptions(&self) -> usize {
        self.handlers.len()
    }

    /// Evaluate every installed hook once, in priority order.
    pub fn run_hooks(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> Vec<BtStatus> {
        let mut hooks = std::mem::take(&mut self.hooks);
        hooks.sort_by_key(|h| h.priority);
        let mut statuses = Vec::with_capacity(hooks.len());
        for hook in hooks.iter_mut() {
            statuses.push(hook.tree.tick(ctx, self, blackboard));
        }
        self.hooks = hooks;
        statuses
    }

    pub fn count(&self, wanted: fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| wanted(c)).count()
    }

    fn unit(&self, id: Unit) -> Option<&UnitState> {
        self.units.iter().find(|u| u.id == id && u.alive)
    }
}

impl WorldView for TestWorld {
    type Entity = Unit;

    fn describe(&self, entity: Unit) -> String {
        self.units
            .iter()
            .find(|u| u.id == entity)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("{entity}"))
    }
}

impl WorldMut for TestWorld {
    fn notify_user(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn status_text(&self) -> Option<&str> {
        self.notices.last().map(String::as_str)
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn set_goal_text(&mut self, text: &str) {
        self.goal = text.to_string();
    }
}

impl MovementWorld for TestWorld {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_moving(&self) -> bool {
        self.moving
    }

    fn move_to(&mut self, destination: Vec3) -> MoveResult {
        self.commands.push(Command::MoveTo(destination));
        if self.planner == MoveResult::Succeeded {
            self.moving = true;
            self.position = self.position.step_towards(destination, 5.0);
        }
        self.planner
    }

    fn direct_move(&mut self, destination: Vec3) {
        self.commands.push(Command::DirectMove(destination));
        self.moving = true;
        self.position = self.position.step_towards(destination, 5.0);
    }

    fn stop_moving(&mut self) {
        self.commands.push(Command::Stop);
        self.moving = false;
    }
}

impl CombatWorld for TestWorld {
    fn hostile_aggroed_units(&self) -> Vec<ThreatEntry<Unit>> {
        self.units
            .iter()
            .filter(|u| u.alive && u.aggroed)
            .map(UnitState::threat)
            .collect()
    }

    fn lookup(&self, id: Unit) -> Option<ThreatEntry<Unit>> {
        self.unit(id).map(UnitState::threat)
    }

    fn in_combat(&self) -> bool {
        self.in_combat
    }

    fn current_target(&self) -> Option<Unit> {
        self.current_target
    }

    fn set_kill_poi(&mut self, id: Unit) {
        self.commands.push(Command::KillPoi(id));
    }

    fn target(&mut self, id: Unit) {
        self.commands.push(Command::Target(id));
        self.current_target = Some(id);
    }
}

impl InteractWorld for TestWorld {
    fn is_viable(&self, entity: Unit) -> bool {
        self.unit(entity).is_some()
    }

    fn interact(&mut self, entity: Unit) {
        self.commands.push(Command::Interact(entity));
        if self.cast_on_interact {
            self.casting = true;
        }
    }

    fn has_active_cast(&self) -> bool {
        self.casting
    }

    fn find_by_entry(&self, entries: &[u32]) -> Vec<Unit> {
        let mut found: Vec<&UnitState> = self
            .units
            .iter()
            .filter(|u| u.alive && entries.contains(&u.entry))
            .collect();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found.into_iter().map(|u| u.id).collect()
    }
}

impl SpellcastEvents for TestWorld {
    fn subscribe(&mut self, event: InterruptEvent, handler: InterruptHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.handlers.push((event, id, handler));
        self.subscribe_calls.push((event, id));
        id
    }

    fn unsubscribe(&mut self, event: InterruptEvent, id: SubscriptionId) -> bool {
        self.unsubscribe_calls.push((event, id));
        let before = self.handlers.len();
        self.handlers.retain(|(e, i, _)| !(*e == event && *i == id));
        self.handlers.len() != before
    }
}

impl HookHost<TestWorld> for TestWorld {
    fn insert_hook(&mut self, slot: &str, priority: i32, tree: Box<dyn BtNode<TestWorld>>) -> HookId {
        let id = HookId(self.next_hook);
        self.next_hook += 1;
        self.hooks.push(InstalledHook {
            slot: slot.to_string(),
            priority,
            id,
            tree,
        });
        id
    }

    fn remove_hook(&mut self, slot: &str, id: HookId) -> bool {
        self.removed_hooks.push((slot.to_string(), id));
        let before = self.hooks.len();
        self.hooks.retain(|h| !(h.slot == slot && h.id == id));
        self.hooks.len() != before
    }
}

impl QuestLog for TestWorld {
    fn quest_status(&self, quest_id: u32) -> Option<QuestStatus> {
        self.quests.get(&quest_id).cloned()
    }
}

impl SettingsStore for TestWorld {
    fn settings(&self) -> HostSettings {
        self.settings.clone()
    }

    fn apply_settings(&mut self, settings: HostSettings) {
        self.settings = settings;
        self.settings_writes += 1;
    }
}

/// Ticks spaced `dt` apart, starting at time zero.
pub fn clock(dt: f64) -> impl Iterator<Item = TickContext> {
    std::iter::successors(Some(TickContext::new(0, 0.0)), move |ctx| Some(ctx.next(dt)))
}
