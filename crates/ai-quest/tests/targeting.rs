mod support;

use ai_bt::{BtNode, BtStatus};
use ai_core::{Blackboard, TickContext, WorldMut};
use ai_quest::{
    choose_best_target, combat_hook, threat_score, AvoidancePolicy, EffectId, TargetSelector,
    ThreatEntry, NEW_TARGET_STATUS,
};
use ai_tools::{TraceLog, TRACE_LOG};
use proptest::prelude::*;

use support::{Command, TestWorld, UnitState, SHIELD};

fn policy() -> AvoidancePolicy {
    AvoidancePolicy::new([SHIELD])
}

fn entry(id: u64, distance: f32, is_elite: bool, effects: &[EffectId]) -> ThreatEntry<u64> {
    ThreatEntry {
        id,
        distance,
        is_elite,
        active_effects: effects.to_vec(),
    }
}

fn shielded_current() -> ThreatEntry<u64> {
    entry(99, 3.0, false, &[SHIELD])
}

#[test]
fn scenario_a_prefers_the_unshielded_unit() {
    let snapshot = [entry(1, 10.0, false, &[]), entry(2, 5.0, false, &[SHIELD])];
    let current = entry(2, 5.0, false, &[SHIELD]);
    assert_eq!(choose_best_target(Some(&current), &snapshot, &policy()), Some(1));
}

#[test]
fn scenario_b_prefers_the_non_elite_unit() {
    let snapshot = [entry(1, 5.0, true, &[]), entry(2, 6.0, false, &[])];
    assert_eq!(
        choose_best_target(Some(&shielded_current()), &snapshot, &policy()),
        Some(2)
    );
}

#[test]
fn acceptable_current_target_is_never_replaced() {
    let current = entry(7, 80.0, true, &[EffectId(1)]);
    let snapshots = [
        vec![],
        vec![entry(1, 0.5, false, &[])],
        vec![entry(1, 2.0, false, &[]), entry(7, 80.0, true, &[EffectId(1)])],
    ];
    for snapshot in &snapshots {
        assert_eq!(choose_best_target(Some(&current), snapshot, &policy()), Some(7));
    }
}

#[test]
fn empty_snapshot_means_no_safe_target() {
    assert_eq!(choose_best_target(Some(&shielded_current()), &[], &policy()), None);
}

fn threat_entries() -> impl Strategy<Value = Vec<ThreatEntry<u64>>> {
    prop::collection::vec((0.1_f32..200.0, any::<bool>(), any::<bool>()), 1..8).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (distance, is_elite, shielded))| {
                let effects: &[EffectId] = if shielded { &[SHIELD] } else { &[] };
                entry(index as u64, distance, is_elite, effects)
            })
            .collect()
    })
}

/// Lowest score, then unshielded, then earliest.
fn cheapest(snapshot: &[ThreatEntry<u64>], p: &AvoidancePolicy) -> Option<u64> {
    snapshot
        .iter()
        .min_by(|a, b| {
            threat_score(*a, p)
                .partial_cmp(&threat_score(*b, p))
                .unwrap()
                .then(p.avoids(&a.active_effects).cmp(&p.avoids(&b.active_effects)))
        })
        .map(|e| e.id)
}

proptest! {
    #[test]
    fn winner_is_the_cheapest_candidate(snapshot in threat_entries()) {
        let p = policy();
        prop_assert_eq!(
            choose_best_target(Some(&shielded_current()), &snapshot, &p),
            cheapest(&snapshot, &p)
        );
    }

    #[test]
    fn shielded_unit_never_beats_a_clean_unit_scoring_no_worse(snapshot in threat_entries()) {
        let p = policy();
        let winner = choose_best_target(Some(&shielded_current()), &snapshot, &p).unwrap();
        let winner = snapshot.iter().find(|e| e.id == winner).unwrap();
        if p.avoids(&winner.active_effects) {
            let winning_score = threat_score(winner, &p);
            for clean in snapshot.iter().filter(|e| !p.avoids(&e.active_effects)) {
                prop_assert!(threat_score(clean, &p) > winning_score);
            }
        }
    }

    #[test]
    fn moving_the_winner_closer_keeps_it_winning(
        snapshot in threat_entries(),
        factor in 0.01_f32..=1.0,
    ) {
        let p = policy();
        let winner = choose_best_target(Some(&shielded_current()), &snapshot, &p).unwrap();
        let closer: Vec<_> = snapshot
            .iter()
            .cloned()
            .map(|mut e| {
                if e.id == winner {
                    e.distance *= factor;
                }
                e
            })
            .collect();
        prop_assert_eq!(choose_best_target(Some(&shielded_current()), &closer, &p), Some(winner));
    }

    #[test]
    fn clean_current_target_is_kept_whatever_the_snapshot(
        snapshot in threat_entries(),
        distance in 0.1_f32..200.0,
        is_elite in any::<bool>(),
    ) {
        let current = entry(99, distance, is_elite, &[EffectId(7)]);
        prop_assert_eq!(choose_best_target(Some(&current), &snapshot, &policy()), Some(99));
    }
}

#[test]
fn moving_closer_never_worsens_rank() {
    let rival = entry(2, 12.0, false, &[]);
    let mut won_at = None;
    for step in (1..=40).rev() {
        let distance = step as f32;
        let snapshot = [rival.clone(), entry(1, distance, false, &[])];
        let winner = choose_best_target(Some(&shielded_current()), &snapshot, &policy());
        if winner == Some(1) && won_at.is_none() {
            won_at = Some(distance);
        }
        if let Some(first_win) = won_at {
            assert!(distance <= first_win);
            assert_eq!(winner, Some(1), "lost again at distance {distance}");
        }
    }
    assert_eq!(won_at, Some(11.0));
}

#[test]
fn ties_go_to_the_earliest_entry() {
    let snapshot = [
        entry(5, 10.0, false, &[]),
        entry(3, 10.0, false, &[]),
        entry(4, 0.1, true, &[]),
    ];
    assert_eq!(
        choose_best_target(Some(&shielded_current()), &snapshot, &policy()),
        Some(5)
    );
}

#[test]
fn equal_scores_favor_the_unshielded_unit() {
    // 1000 * 0.5 == 500 * 1
    let snapshot = [entry(1, 0.5, false, &[SHIELD]), entry(2, 500.0, false, &[])];
    assert_eq!(
        choose_best_target(Some(&shielded_current()), &snapshot, &policy()),
        Some(2)
    );
}

fn combat_world() -> TestWorld {
    let mut world = TestWorld::with_units([
        UnitState::hostile(1, 10.0),
        UnitState::hostile(2, 5.0).with_effect(SHIELD),
    ]);
    world.in_combat = true;
    world.current_target = Some(2);
    world
}

fn traced() -> Blackboard {
    let mut bb = Blackboard::new();
    bb.set(TRACE_LOG, TraceLog::default());
    bb
}

#[test]
fn combat_hook_retargets_and_lets_the_host_continue() {
    let mut world = combat_world();
    let mut bb = traced();
    let mut hook = combat_hook::<TestWorld>(policy());

    let status = hook.tick(&TickContext::new(0, 0.0), &mut world, &mut bb);

    assert_eq!(status, BtStatus::Failure);
    assert_eq!(world.current_target, Some(1));
    assert_eq!(
        world.commands,
        vec![Command::KillPoi(1), Command::Target(1)]
    );
    assert_eq!(world.notices, vec![NEW_TARGET_STATUS, "Selecting new target: unit-1"]);
    let event = bb.get(TRACE_LOG).unwrap().last("target.select").unwrap();
    assert_eq!(event.subject, Some(1));
    assert_eq!(event.value, 10.0);
}

#[test]
fn combat_hook_is_inert_outside_combat_or_on_a_clean_target() {
    let mut hook = combat_hook::<TestWorld>(policy());
    let mut bb = Blackboard::new();

    let mut out_of_combat = combat_world();
    out_of_combat.in_combat = false;
    assert_eq!(
        hook.tick(&TickContext::new(0, 0.0), &mut out_of_combat, &mut bb),
        BtStatus::Failure
    );
    assert!(out_of_combat.commands.is_empty());

    let mut clean_target = combat_world();
    clean_target.current_target = Some(1);
    assert_eq!(
        hook.tick(&TickContext::new(1, 0.1), &mut clean_target, &mut bb),
        BtStatus::Failure
    );
    assert!(clean_target.commands.is_empty());
}

#[test]
fn selection_follows_effects_as_they_come_and_go() {
    let mut world = combat_world();
    let mut bb = Blackboard::new();
    let mut hook = combat_hook::<TestWorld>(policy());
    let mut ticks = support::clock(0.1);

    hook.tick(&ticks.next().unwrap(), &mut world, &mut bb);
    assert_eq!(world.current_target, Some(1));

    // Unit 1 raises the shield; unit 2 dropped it and is now the better pick.
    world.unit_mut(1).effects.push(SHIELD);
    world.unit_mut(2).effects.clear();
    hook.tick(&ticks.next().unwrap(), &mut world, &mut bb);
    assert_eq!(world.current_target, Some(2));

    // Nothing changes while the current target stays clean.
    world.unit_mut(1).effects.clear();
    world.unit_mut(1).distance = 0.5;
    let before = world.commands.len();
    hook.tick(&ticks.next().unwrap(), &mut world, &mut bb);
    assert_eq!(world.commands.len(), before);
    assert_eq!(world.current_target, Some(2));
}

#[test]
fn selector_revalidates_a_dead_pick() {
    let mut world = combat_world();
    let mut bb = traced();
    let mut selector = TargetSelector::new(policy());
    let ctx = TickContext::new(0, 0.0);

    assert_eq!(selector.evaluate(&ctx, &mut world, &mut bb), Some(1));
    assert_eq!(selector.selected().map(|s| s.id()), Some(1));

    world.unit_mut(1).alive = false;
    assert_eq!(selector.evaluate(&ctx.next(0.1), &mut world, &mut bb), None);
    assert_eq!(selector.selected(), None);
    assert_eq!(bb.get(TRACE_LOG).unwrap().count("target.lost"), 1);

    // The host falls back to the shielded unit; a new clean unit shows up.
    world.current_target = Some(2);
    world.units.push(UnitState::hostile(3, 30.0));
    assert_eq!(selector.evaluate(&ctx.next(0.2), &mut world, &mut bb), Some(3));
    assert_eq!(world.current_target, Some(3));
}

#[test]
fn no_safe_target_leaves_the_host_alone() {
    let mut world = TestWorld::with_units([UnitState::hostile(2, 5.0).with_effect(SHIELD)]);
    world.in_combat = true;
    world.current_target = Some(2);
    world.unit_mut(2).aggroed = false;

    let mut selector = TargetSelector::new(policy());
    let mut bb = Blackboard::new();
    assert_eq!(selector.evaluate(&TickContext::new(0, 0.0), &mut world, &mut bb), None);
    assert!(world.commands.is_empty());
}

#[test]
fn selection_notice_is_compared_with_what_is_on_screen() {
    let mut world = combat_world();
    let mut bb = Blackboard::new();
    let mut selector = TargetSelector::new(policy());
    let ctx = TickContext::new(0, 0.0);

    assert_eq!(selector.evaluate(&ctx, &mut world, &mut bb), Some(1));
    // The host drifts back to the shielded unit; the line on screen already names the pick.
    world.current_target = Some(2);
    assert_eq!(selector.evaluate(&ctx, &mut world, &mut bb), Some(1));
    assert_eq!(world.notices, vec!["Selecting new target: unit-1"]);

    // Once movement has overwritten the line, the same pick is announced again.
    world.notify_user("Moving to start location (distance: 4.0)");
    world.current_target = Some(2);
    assert_eq!(selector.evaluate(&ctx, &mut world, &mut bb), Some(1));
    assert_eq!(
        world.notices.last().map(String::as_str),
        Some("Selecting new target: unit-1")
    );
    assert_eq!(world.notices.len(), 3);
}
