use ai_bt::builder::{always_succeed, condition, priority, sequence, throttle};
use ai_bt::{BtNode, BtPolicy};
use ai_core::{Blackboard, TickContext, WorldMut, WorldView};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Default)]
struct World;

impl WorldView for World {
    type Entity = u64;
}

impl WorldMut for World {}

fn always_true(_ctx: &TickContext, _world: &World, _bb: &Blackboard) -> bool {
    true
}

fn always_false(_ctx: &TickContext, _world: &World, _bb: &Blackboard) -> bool {
    false
}

fn bench_bt_tick(c: &mut Criterion) {
    let conditions = (0..32)
        .map(|_| condition(always_true))
        .collect::<Vec<Box<dyn BtNode<World>>>>();

    let mut policy = BtPolicy::new(sequence(conditions));
    let mut world = World;
    let mut bb = Blackboard::new();

    let mut ctx = TickContext::new(0, 0.0);
    c.bench_function("ai-bt/tick(sequence, conditions=32)", |b| {
        b.iter(|| {
            black_box(policy.tick(&ctx, &mut world, &mut bb));
            ctx = ctx.next(0.1);
        })
    });
}

fn bench_priority_fallthrough(c: &mut Criterion) {
    let mut children = (0..31)
        .map(|_| condition(always_false))
        .collect::<Vec<Box<dyn BtNode<World>>>>();
    children.push(always_succeed(throttle(1.0, condition(always_true))));

    let mut policy = BtPolicy::new(priority(children));
    let mut world = World;
    let mut bb = Blackboard::new();

    let mut ctx = TickContext::new(0, 0.0);
    c.bench_function("ai-bt/tick(priority, fallthrough=31)", |b| {
        b.iter(|| {
            black_box(policy.tick(&ctx, &mut world, &mut bb));
            ctx = ctx.next(0.1);
        })
    });
}

criterion_group!(benches, bench_bt_tick, bench_priority_fallthrough);
criterion_main!(benches);
