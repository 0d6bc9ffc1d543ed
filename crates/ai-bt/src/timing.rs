//! Time-aware nodes: rate limiting and cooperative waits.
//!
//! None of these block. Time is read from [`TickContext::now_seconds`] and compared against
//! per-instance timestamps, so their resolution is the host's tick cadence.

use ai_core::{Blackboard, TickContext, WorldMut};
use ai_tools::{emit as trace_emit, TraceEvent};

use crate::bt::{BtNode, BtStatus, Predicate};
use crate::nodes::{Fail, Succeed};

/// Runs its child at most once per `interval_seconds`.
///
/// Between runs it returns `Failure` without touching the child ("no-op, fall through"); wrap it
/// in `AlwaysSucceed` when used as an optional step of a `Sequence`. The timer restarts at the
/// moment the child is started and is deliberately kept across `reset`, so a tree that restarts
/// every tick is still rate limited.
pub struct Throttle<W>
where
    W: WorldMut + 'static,
{
    interval_seconds: f64,
    child: Box<dyn BtNode<W>>,
    last_run: Option<f64>,
    running: bool,
}

impl<W> Throttle<W>
where
    W: WorldMut + 'static,
{
    pub fn new(interval_seconds: f64, child: Box<dyn BtNode<W>>) -> Self {
        Self {
            interval_seconds: interval_seconds.max(0.0),
            child,
            last_run: None,
            running: false,
        }
    }

    pub fn interval_seconds(&self) -> f64 {
        self.interval_seconds
    }

    /// Host time at which the child was last started.
    pub fn last_run(&self) -> Option<f64> {
        self.last_run
    }
}

impl<W> BtNode<W> for Throttle<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        if !self.running {
            if let Some(last) = self.last_run {
                if ctx.seconds_since(last) < self.interval_seconds {
                    return BtStatus::Failure;
                }
            }
            self.last_run = Some(ctx.now_seconds);
            trace_emit(
                blackboard,
                TraceEvent::new(ctx.tick, "bt.throttle.run").with_value(self.interval_seconds),
            );
        }

        let status = self.child.tick(ctx, world, blackboard);
        self.running = status.is_running();
        status
    }

    fn reset(&mut self, world: &mut W) {
        self.running = false;
        self.child.reset(world);
    }
}

struct TimedWait<W>
where
    W: WorldMut + 'static,
{
    timeout_seconds: f64,
    condition: Predicate<W>,
    child: Box<dyn BtNode<W>>,
    started_at: Option<f64>,
    child_running: bool,
}

impl<W> TimedWait<W>
where
    W: WorldMut + 'static,
{
    fn new(timeout_seconds: f64, condition: Predicate<W>, child: Box<dyn BtNode<W>>) -> Self {
        Self {
            timeout_seconds: timeout_seconds.max(0.0),
            condition,
            child,
            started_at: None,
            child_running: false,
        }
    }

    fn tick(
        &mut self,
        on_timeout: BtStatus,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        if !self.child_running {
            let started = *self.started_at.get_or_insert(ctx.now_seconds);
            if !(self.condition)(ctx, &*world, &*blackboard) {
                if ctx.seconds_since(started) >= self.timeout_seconds {
                    self.started_at = None;
                    return on_timeout;
                }
                return BtStatus::Running;
            }
        }

        let status = self.child.tick(ctx, world, blackboard);
        if status.is_running() {
            self.child_running = true;
            return BtStatus::Running;
        }

        self.started_at = None;
        self.child_running = false;
        status
    }

    fn reset(&mut self, world: &mut W) {
        self.started_at = None;
        self.child_running = false;
        self.child.reset(world);
    }
}

/// Waits until `condition` holds, then runs the child and reports its result.
///
/// If the timeout expires first it resolves to `Failure`. With a condition that never holds this
/// is a deliberate "pause, then fail" used to abort an enclosing `Sequence` after letting the
/// world settle.
pub struct Wait<W>
where
    W: WorldMut + 'static,
{
    inner: TimedWait<W>,
}

impl<W> Wait<W>
where
    W: WorldMut + 'static,
{
    pub fn new(
        timeout_seconds: f64,
        condition: impl FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
        child: Box<dyn BtNode<W>>,
    ) -> Self {
        Self {
            inner: TimedWait::new(timeout_seconds, Box::new(condition), child),
        }
    }

    /// Pause for `seconds`, then fail.
    pub fn for_seconds(seconds: f64) -> Self {
        Self::new(seconds, |_, _, _| false, Box::new(Fail))
    }
}

impl<W> BtNode<W> for Wait<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        self.inner.tick(BtStatus::Failure, ctx, world, blackboard)
    }

    fn reset(&mut self, world: &mut W) {
        self.inner.reset(world);
    }
}

/// Waits until `condition` holds, then runs the child and reports its result.
///
/// Unlike [`Wait`], an expired timeout resolves to `Success`: "nothing (more) to wait for".
pub struct WaitContinue<W>
where
    W: WorldMut + 'static,
{
    inner: TimedWait<W>,
}

impl<W> WaitContinue<W>
where
    W: WorldMut + 'static,
{
    pub fn new(
        timeout_seconds: f64,
        condition: impl FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
        child: Box<dyn BtNode<W>>,
    ) -> Self {
        Self {
            inner: TimedWait::new(timeout_seconds, Box::new(condition), child),
        }
    }

    /// Pause for `seconds`, then succeed.
    pub fn for_seconds(seconds: f64) -> Self {
        Self::new(seconds, |_, _, _| false, Box::new(Succeed))
    }
}

impl<W> BtNode<W> for WaitContinue<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        self.inner.tick(BtStatus::Success, ctx, world, blackboard)
    }

    fn reset(&mut self, world: &mut W) {
        self.inner.reset(world);
    }
}
