use ai_core::{Blackboard, TickContext, WorldMut};

use crate::bt::{BtNode, BtStatus};

/// Runs children in order, remembering where it stopped.
///
/// - `Failure` from a child stops the pass and returns `Failure`.
/// - `Running` from a child returns `Running`; the next tick resumes at that same child, so the
///   side effects of earlier children are not repeated.
/// - `Success` only once every child succeeded within one logical pass.
pub struct Sequence<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Box<dyn BtNode<W>>>,
    index: usize,
}

impl<W> Sequence<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Box<dyn BtNode<W>>>) -> Self {
        Self { children, index: 0 }
    }

    /// Index of the child the next tick will resume at.
    pub fn cursor(&self) -> usize {
        self.index
    }
}

impl<W> BtNode<W> for Sequence<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        while self.index < self.children.len() {
            let status = self.children[self.index].tick(ctx, world, blackboard);
            match status {
                BtStatus::Running => return BtStatus::Running,
                BtStatus::Failure => {
                    self.reset(world);
                    return BtStatus::Failure;
                }
                BtStatus::Success => self.index += 1,
            }
        }

        self.reset(world);
        BtStatus::Success
    }

    fn reset(&mut self, world: &mut W) {
        self.index = 0;
        for c in self.children.iter_mut() {
            c.reset(world);
        }
    }
}

/// "First applicable strategy wins".
///
/// Re-evaluated from the first child on every tick and returns the first `Success` or
/// `Running`; `Failure` only when every child failed. When a higher-priority child starts
/// running while a lower one was mid-flight, the lower one is reset so it releases whatever it
/// held.
pub struct PrioritySelector<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Box<dyn BtNode<W>>>,
    running: Option<usize>,
}

impl<W> PrioritySelector<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Box<dyn BtNode<W>>>) -> Self {
        Self {
            children,
            running: None,
        }
    }

    /// Child currently holding the `Running` slot, if any.
    pub fn running_child(&self) -> Option<usize> {
        self.running
    }
}

impl<W> BtNode<W> for PrioritySelector<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        for i in 0..self.children.len() {
            let status = self.children[i].tick(ctx, world, blackboard);
            match status {
                BtStatus::Failure => continue,
                BtStatus::Success => {
                    self.reset(world);
                    return BtStatus::Success;
                }
                BtStatus::Running => {
                    if self.running != Some(i) {
                        if let Some(prev) = self.running {
                            tracing::trace!(from = prev, to = i, "priority branch preempted");
                            self.children[prev].reset(world);
                        }
                        self.running = Some(i);
                    }
                    return BtStatus::Running;
                }
            }
        }

        self.reset(world);
        BtStatus::Failure
    }

    fn reset(&mut self, world: &mut W) {
        self.running = None;
        for c in self.children.iter_mut() {
            c.reset(world);
        }
    }
}

/// Leaf that maps a predicate to `Success` / `Failure`.
pub struct Condition<F> {
    cond: F,
}

impl<F> Condition<F> {
    pub fn new(cond: F) -> Self {
        Self { cond }
    }
}

impl<F, W> BtNode<W> for Condition<F>
where
    F: FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        BtStatus::from_bool((self.cond)(ctx, &*world, &*blackboard))
    }

    fn reset(&mut self, _world: &mut W) {}
}

/// Leaf running a caller-supplied closure with write access to the world.
///
/// The closure decides the status; a closure returning `Running` is ticked again next time.
pub struct Action<F> {
    run: F,
}

impl<F> Action<F> {
    pub fn new(run: F) -> Self {
        Self { run }
    }
}

impl<F, W> BtNode<W> for Action<F>
where
    F: FnMut(&TickContext, &mut W, &mut Blackboard) -> BtStatus + 'static,
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        (self.run)(ctx, world, blackboard)
    }

    fn reset(&mut self, _world: &mut W) {}
}

/// Leaf that always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct Succeed;

impl<W> BtNode<W> for Succeed
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, _ctx: &TickContext, _world: &mut W, _bb: &mut Blackboard) -> BtStatus {
        BtStatus::Success
    }

    fn reset(&mut self, _world: &mut W) {}
}

/// Leaf that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fail;

impl<W> BtNode<W> for Fail
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, _ctx: &TickContext, _world: &mut W, _bb: &mut Blackboard) -> BtStatus {
        BtStatus::Failure
    }

    fn reset(&mut self, _world: &mut W) {}
}
