use ai_core::{Blackboard, TickContext, WorldMut};

use crate::bt::{BtNode, BtStatus};

/// Tick entry point for a tree owned by the host.
///
/// Each call evaluates the root once. When the root finishes (Success or Failure) it is reset so
/// the next tick starts a fresh pass; a `Running` root resumes where it left off.
pub struct BtPolicy<W>
where
    W: WorldMut + 'static,
{
    root: Box<dyn BtNode<W>>,
    last: Option<BtStatus>,
    ticks: u64,
}

impl<W> BtPolicy<W>
where
    W: WorldMut + 'static,
{
    pub fn new(root: Box<dyn BtNode<W>>) -> Self {
        Self {
            root,
            last: None,
            ticks: 0,
        }
    }

    /// Result of the most recent tick, `None` before the first one.
    pub fn last_status(&self) -> Option<BtStatus> {
        self.last
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        let status = self.root.tick(ctx, world, blackboard);
        self.ticks = self.ticks.saturating_add(1);
        self.last = Some(status);
        if status.is_done() {
            self.root.reset(world);
        }
        status
    }

    /// Abandon whatever the tree is doing, releasing external registrations.
    pub fn reset(&mut self, world: &mut W) {
        self.root.reset(world);
        self.last = None;
    }
}
