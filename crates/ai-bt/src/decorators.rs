//! Predicate gates and result rewriting around a single child.
//!
//! Gates are checked when the child is about to start a fresh run. Once admitted, a `Running`
//! child keeps running on later ticks without re-checking the predicate, so a multi-tick child
//! is never cut off halfway by a predicate that its own side effects flipped.

use ai_core::{Blackboard, TickContext, WorldMut};

use crate::bt::{BtNode, BtStatus, Predicate};

/// Runs the child only when the predicate holds; otherwise `Failure` without touching the
/// child.
pub struct Decorator<W>
where
    W: WorldMut + 'static,
{
    predicate: Predicate<W>,
    child: Box<dyn BtNode<W>>,
    admitted: bool,
}

impl<W> Decorator<W>
where
    W: WorldMut + 'static,
{
    pub fn new(
        predicate: impl FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
        child: Box<dyn BtNode<W>>,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            child,
            admitted: false,
        }
    }
}

impl<W> BtNode<W> for Decorator<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        gated_tick(
            &mut self.predicate,
            &mut self.child,
            &mut self.admitted,
            BtStatus::Failure,
            ctx,
            world,
            blackboard,
        )
    }

    fn reset(&mut self, world: &mut W) {
        self.admitted = false;
        self.child.reset(world);
    }
}

/// Like [`Decorator`], but a false predicate yields `Success`: "nothing to do here, carry on".
///
/// Use it inside a `Sequence` for optional steps whose skipping must not abort the sequence;
/// when the predicate holds, the child's own result (including `Failure`) is passed through.
pub struct DecoratorContinue<W>
where
    W: WorldMut + 'static,
{
    predicate: Predicate<W>,
    child: Box<dyn BtNode<W>>,
    admitted: bool,
}

impl<W> DecoratorContinue<W>
where
    W: WorldMut + 'static,
{
    pub fn new(
        predicate: impl FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
        child: Box<dyn BtNode<W>>,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            child,
            admitted: false,
        }
    }
}

impl<W> BtNode<W> for DecoratorContinue<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        gated_tick(
            &mut self.predicate,
            &mut self.child,
            &mut self.admitted,
            BtStatus::Success,
            ctx,
            world,
            blackboard,
        )
    }

    fn reset(&mut self, world: &mut W) {
        self.admitted = false;
        self.child.reset(world);
    }
}

fn gated_tick<W>(
    predicate: &mut Predicate<W>,
    child: &mut Box<dyn BtNode<W>>,
    admitted: &mut bool,
    skipped: BtStatus,
    ctx: &TickContext,
    world: &mut W,
    blackboard: &mut Blackboard,
) -> BtStatus
where
    W: WorldMut + 'static,
{
    if !*admitted && !(*predicate)(ctx, &*world, &*blackboard) {
        return skipped;
    }

    let status = child.tick(ctx, world, blackboard);
    *admitted = status.is_running();
    status
}

/// Runs the child and reports `Success` once it finishes, whatever it returned.
///
/// `Running` is passed through unchanged.
pub struct AlwaysSucceed<W>
where
    W: WorldMut + 'static,
{
    child: Box<dyn BtNode<W>>,
}

impl<W> AlwaysSucceed<W>
where
    W: WorldMut + 'static,
{
    pub fn new(child: Box<dyn BtNode<W>>) -> Self {
        Self { child }
    }
}

impl<W> BtNode<W> for AlwaysSucceed<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        match self.child.tick(ctx, world, blackboard) {
            BtStatus::Running => BtStatus::Running,
            BtStatus::Success | BtStatus::Failure => BtStatus::Success,
        }
    }

    fn reset(&mut self, world: &mut W) {
        self.child.reset(world);
    }
}
