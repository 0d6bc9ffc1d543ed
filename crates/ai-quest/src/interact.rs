//! Interruptible world interaction.
//!
//! ```text
//! AcquireTarget -> StartInteract -> AfterInteract -> AwaitCast -> CheckInterrupt -> Recover | Complete
//! ```
//!
//! `StartInteract`, `CheckInterrupt` and `Complete` are instantaneous and run in the same tick as
//! the phase before them; the other phases may span many ticks and resume where they left off.

use ai_bt::{BtNode, BtStatus, Succeed, Wait, WaitContinue};
use ai_core::{Blackboard, TickContext, WorldMut};
use ai_tools::{emit as trace_emit, TraceEvent};

use crate::events::{InterruptFlag, InterruptSubscription, SpellcastEvents};

/// Interaction queries and commands.
pub trait InteractWorld: WorldMut {
    /// Exists, is alive and can be interacted with right now.
    fn is_viable(&self, entity: Self::Entity) -> bool;

    fn interact(&mut self, entity: Self::Entity);

    /// The agent is casting or channeling.
    fn has_active_cast(&self) -> bool;

    /// Objects and units whose entry id is one of `entries`, nearest first.
    fn find_by_entry(&self, entries: &[u32]) -> Vec<Self::Entity>;
}

/// Phase the protocol will resume in on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractPhase {
    AcquireTarget,
    AfterInteract,
    AwaitCast,
    Recover,
}

pub struct Interact<W>
where
    W: InteractWorld + SpellcastEvents + 'static,
{
    target: Box<dyn FnMut(&TickContext, &W, &Blackboard) -> Option<W::Entity>>,
    on_interacted: Box<dyn FnMut(&TickContext, &mut W, &mut Blackboard, W::Entity)>,
    flag: InterruptFlag,
    subscription: InterruptSubscription,
    phase: InteractPhase,
    entity: Option<W::Entity>,
    after_interact: WaitContinue<W>,
    await_cast: WaitContinue<W>,
    recover: Wait<W>,
}

impl<W> Interact<W>
where
    W: InteractWorld + SpellcastEvents + 'static,
{
    pub const AFTER_INTERACT_SECONDS: f64 = 0.1;
    pub const CAST_TIMEOUT_SECONDS: f64 = 15.0;
    pub const RECOVER_SECONDS: f64 = 1.5;

    /// `target` is asked once per run; `on_interacted` is called with the entity when the
    /// interaction went through uninterrupted.
    pub fn new(
        target: impl FnMut(&TickContext, &W, &Blackboard) -> Option<W::Entity> + 'static,
        on_interacted: impl FnMut(&TickContext, &mut W, &mut Blackboard, W::Entity) + 'static,
    ) -> Self {
        Self {
            target: Box::new(target),
            on_interacted: Box::new(on_interacted),
            flag: InterruptFlag::new(),
            subscription: InterruptSubscription::default(),
            phase: InteractPhase::AcquireTarget,
            entity: None,
            after_interact: WaitContinue::for_seconds(Self::AFTER_INTERACT_SECONDS),
            await_cast: Self::await_cast(Self::CAST_TIMEOUT_SECONDS),
            recover: Wait::for_seconds(Self::RECOVER_SECONDS),
        }
    }

    fn await_cast(timeout_seconds: f64) -> WaitContinue<W> {
        // Some interactions never show a cast; the timeout then just lets the protocol proceed.
        WaitContinue::new(
            timeout_seconds,
            |_ctx: &TickContext, world: &W, _bb: &Blackboard| !world.has_active_cast(),
            Box::new(Succeed),
        )
    }

    pub fn with_after_interact_delay(mut self, seconds: f64) -> Self {
        self.after_interact = WaitContinue::for_seconds(seconds);
        self
    }

    pub fn with_cast_timeout(mut self, seconds: f64) -> Self {
        self.await_cast = Self::await_cast(seconds);
        self
    }

    pub fn with_recover_delay(mut self, seconds: f64) -> Self {
        self.recover = Wait::for_seconds(seconds);
        self
    }

    pub fn phase(&self) -> InteractPhase {
        self.phase
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_active()
    }

    fn unsubscribe(&mut self, ctx: &TickContext, world: &mut W, blackboard: &mut Blackboard) {
        if self.subscription.release(world) {
            trace_emit(blackboard, TraceEvent::new(ctx.tick, "interact.unsubscribe"));
        }
    }

    fn finish(&mut self) {
        self.phase = InteractPhase::AcquireTarget;
        self.entity = None;
    }
}

impl<W> BtNode<W> for Interact<W>
where
    W: InteractWorld + SpellcastEvents + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        loop {
            match self.phase {
                InteractPhase::AcquireTarget => {
                    let candidate = (self.target)(ctx, &*world, &*blackboard);
                    let Some(entity) = candidate.filter(|e| world.is_viable(*e)) else {
                        tracing::warn!(unit = ?candidate, "target is not viable");
                        trace_emit(blackboard, TraceEvent::new(ctx.tick, "interact.not_viable"));
                        return BtStatus::Failure;
                    };

                    // Subscribe before interacting, or an immediate interruption is missed.
                    debug_assert!(!self.subscription.is_active());
                    self.flag.clear();
                    self.subscription = InterruptSubscription::subscribe(world, &self.flag);
                    tracing::debug!(unit = %world.describe(entity), "interacting");
                    world.interact(entity);
                    trace_emit(
                        blackboard,
                        TraceEvent::new(ctx.tick, "interact.start").with_subject(entity),
                    );
                    self.entity = Some(entity);
                    self.phase = InteractPhase::AfterInteract;
                }
                InteractPhase::AfterInteract => {
                    if self.after_interact.tick(ctx, world, blackboard).is_running() {
                        return BtStatus::Running;
                    }
                    self.phase = InteractPhase::AwaitCast;
                }
                InteractPhase::AwaitCast => {
                    if self.await_cast.tick(ctx, world, blackboard).is_running() {
                        return BtStatus::Running;
                    }

                    // Unsubscribe first, then read: nothing can raise the flag after this point.
                    self.unsubscribe(ctx, world, blackboard);
                    let Some(entity) = self.entity else {
                        self.finish();
                        return BtStatus::Failure;
                    };

                    if self.flag.is_raised() {
                        tracing::info!(unit = %world.describe(entity), "interaction interrupted");
                        trace_emit(
                            blackboard,
                            TraceEvent::new(ctx.tick, "interact.interrupted").with_subject(entity),
                        );
                        self.phase = InteractPhase::Recover;
                        continue;
                    }

                    tracing::debug!(unit = %world.describe(entity), "interaction succeeded");
                    (self.on_interacted)(ctx, world, blackboard, entity);
                    trace_emit(
                        blackboard,
                        TraceEvent::new(ctx.tick, "interact.complete").with_subject(entity),
                    );
                    self.finish();
                    return BtStatus::Success;
                }
                InteractPhase::Recover => {
                    // Settle, then fail. Retrying is the caller's decision.
                    if self.recover.tick(ctx, world, blackboard).is_running() {
                        return BtStatus::Running;
                    }
                    self.finish();
                    return BtStatus::Failure;
                }
            }
        }
    }

    fn reset(&mut self, world: &mut W) {
        if self.subscription.release(world) {
            tracing::debug!(phase = ?self.phase, "interaction abandoned, subscription released");
        }
        self.after_interact.reset(world);
        self.await_cast.reset(world);
        self.recover.reset(world);
        self.finish();
    }
}
