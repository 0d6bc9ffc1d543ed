use std::sync::Arc;

use ai_bt::builder::{action, always_succeed, decorator_continue, sequence, throttle};
use ai_bt::{BtNode, BtStatus, WaitContinue};
use ai_core::{Blackboard, TickContext};
use ai_tools::{emit as trace_emit, TraceEvent};

use crate::{MovementWorld, Vec3};

/// Value computed from the tick context, the world and the caller's blackboard.
///
/// Providers are captured at tree-construction time and re-evaluated every tick, so a moving
/// destination (an escorted unit, say) is followed without rebuilding the tree.
pub type Provider<W, T> = Arc<dyn Fn(&TickContext, &W, &Blackboard) -> T + Send + Sync>;

/// Subtree that walks the agent to within `precision` of a destination.
///
/// Result convention (matches the fall-through reading of `Decorator`):
/// - `Success` / `Running` while movement is in progress,
/// - `Failure` once already at the destination ("nothing to do"), after stopping any residual
///   movement.
///
/// Each pass issues a throttled progress notification (skipped when the status line already
/// shows it), asks the planner to move (falling back
/// to direct movement when it fails), then holds for a short settle delay so the host's
/// client-side movement pacing is respected.
pub struct MoveWithinRange<W>
where
    W: MovementWorld + 'static,
{
    destination: Provider<W, Vec3>,
    label: Provider<W, String>,
    precision: Option<Provider<W, f32>>,
    notify_interval_seconds: f64,
    settle_seconds: f64,
}

impl<W> MoveWithinRange<W>
where
    W: MovementWorld + 'static,
{
    pub const NOTIFY_INTERVAL_SECONDS: f64 = 1.0;
    pub const SETTLE_SECONDS: f64 = 0.1;

    pub fn new(
        destination: impl Fn(&TickContext, &W, &Blackboard) -> Vec3 + Send + Sync + 'static,
        label: impl Fn(&TickContext, &W, &Blackboard) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            destination: Arc::new(destination),
            label: Arc::new(label),
            precision: None,
            notify_interval_seconds: Self::NOTIFY_INTERVAL_SECONDS,
            settle_seconds: Self::SETTLE_SECONDS,
        }
    }

    /// Fixed destination with a fixed label.
    pub fn to_point(destination: Vec3, label: impl Into<String>) -> Self {
        let label = label.into();
        Self::new(move |_, _, _| destination, move |_, _, _| label.clone())
    }

    /// Override the arrival tolerance; defaults to [`MovementWorld::path_precision`].
    pub fn with_precision(
        mut self,
        precision: impl Fn(&TickContext, &W, &Blackboard) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.precision = Some(Arc::new(precision));
        self
    }

    pub fn with_notify_interval(mut self, seconds: f64) -> Self {
        self.notify_interval_seconds = seconds;
        self
    }

    pub fn with_settle_delay(mut self, seconds: f64) -> Self {
        self.settle_seconds = seconds;
        self
    }

    pub fn build(self) -> Box<dyn BtNode<W>> {
        let Self {
            destination,
            label,
            precision,
            notify_interval_seconds,
            settle_seconds,
        } = self;

        let arrived = {
            let destination = destination.clone();
            move |ctx: &TickContext, world: &W, bb: &Blackboard| {
                let tolerance = match &precision {
                    Some(p) => p(ctx, world, bb),
                    None => world.path_precision(),
                };
                world.position().distance(destination(ctx, world, bb)) <= tolerance
            }
        };

        let stop_residual = action(|ctx: &TickContext, world: &mut W, bb: &mut Blackboard| {
            if world.is_moving() {
                world.stop_moving();
            }
            trace_emit(bb, TraceEvent::new(ctx.tick, "nav.arrived"));
            // Failing here is the "already there" signal.
            BtStatus::Failure
        });

        let notify = {
            let destination = destination.clone();
            action(move |ctx: &TickContext, world: &mut W, bb: &mut Blackboard| {
                let target = destination(ctx, &*world, &*bb);
                let distance = world.position().distance(target);
                let mut name = label(ctx, &*world, &*bb);
                if name.is_empty() {
                    name = target.to_string();
                }
                world.post_status(&format!("Moving to {name} (distance: {distance:.1})"));
                BtStatus::Success
            })
        };

        let step = action(move |ctx: &TickContext, world: &mut W, bb: &mut Blackboard| {
            let target = destination(ctx, &*world, &*bb);
            let result = world.move_to(target);
            if result.needs_fallback() {
                tracing::debug!(?result, %target, "planner failed, falling back to direct movement");
                world.direct_move(target);
            }
            trace_emit(
                bb,
                TraceEvent::new(ctx.tick, "nav.move")
                    .with_value(world.position().distance(target) as f64),
            );
            BtStatus::Success
        });

        sequence(vec![
            decorator_continue(arrived, stop_residual),
            always_succeed(throttle(notify_interval_seconds, notify)),
            step,
            Box::new(WaitContinue::for_seconds(settle_seconds)),
        ])
    }
}
