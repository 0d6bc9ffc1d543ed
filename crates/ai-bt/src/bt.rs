use ai_core::{Blackboard, TickContext, WorldMut};

/// Tri-state node result; the only signaling channel between nodes.
///
/// `Failure` is a convention, not an error: depending on the node it means either "this went
/// wrong" or "nothing to contribute this tick". Use `Decorator` / `DecoratorContinue` to make
/// the intended reading explicit at each point of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BtStatus {
    Running,
    Success,
    Failure,
}

impl BtStatus {
    pub fn is_running(self) -> bool {
        matches!(self, BtStatus::Running)
    }

    pub fn is_done(self) -> bool {
        !self.is_running()
    }

    pub fn from_bool(ok: bool) -> Self {
        if ok {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }
}

/// A schedulable unit of work.
///
/// `tick` must return after a bounded amount of work; waiting is expressed by returning
/// `Running` and being ticked again. A node may only mutate its own instance state plus
/// whatever it does to `world` / `blackboard` explicitly.
pub trait BtNode<W>: 'static
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &TickContext, world: &mut W, blackboard: &mut Blackboard)
        -> BtStatus;

    /// Drop any in-progress state so the next `tick` starts a fresh logical pass.
    ///
    /// Nodes holding external registrations (event subscriptions) release them here, which is
    /// why the world is passed in. Must be idempotent.
    fn reset(&mut self, world: &mut W);
}

impl<W> BtNode<W> for Box<dyn BtNode<W>>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        (**self).tick(ctx, world, blackboard)
    }

    fn reset(&mut self, world: &mut W) {
        (**self).reset(world)
    }
}

/// Predicate over the tick context, a read-only world and the caller's blackboard.
pub type Predicate<W> = Box<dyn FnMut(&TickContext, &W, &Blackboard) -> bool>;
