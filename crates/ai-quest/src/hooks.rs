use ai_bt::BtNode;
use ai_core::WorldMut;

/// Host slot evaluated ahead of the host's own combat routine.
pub const COMBAT_MAIN_SLOT: &str = "Combat_Main";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HookId(pub u64);

/// Host-managed priority slots that evaluate injected trees.
pub trait HookHost<W>
where
    W: WorldMut + 'static,
{
    /// Lower `priority` runs first within a slot.
    fn insert_hook(&mut self, slot: &str, priority: i32, tree: Box<dyn BtNode<W>>) -> HookId;

    /// Returns false if no such hook was registered.
    fn remove_hook(&mut self, slot: &str, id: HookId) -> bool;
}

/// Handle for one inserted hook; removed at most once.
#[derive(Debug, Default)]
pub struct HookRegistration {
    active: Option<(String, HookId)>,
}

impl HookRegistration {
    pub fn insert<W, H>(host: &mut H, slot: &str, priority: i32, tree: Box<dyn BtNode<W>>) -> Self
    where
        W: WorldMut + 'static,
        H: HookHost<W> + ?Sized,
    {
        let id = host.insert_hook(slot, priority, tree);
        tracing::debug!(slot, priority, ?id, "hook inserted");
        Self {
            active: Some((slot.to_string(), id)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Remove the hook from the host. Idempotent; returns false once already released.
    pub fn release<W, H>(&mut self, host: &mut H) -> bool
    where
        W: WorldMut + 'static,
        H: HookHost<W> + ?Sized,
    {
        let Some((slot, id)) = self.active.take() else {
            return false;
        };
        if !host.remove_hook(&slot, id) {
            tracing::warn!(slot = %slot, ?id, "host no longer had the hook");
        }
        true
    }
}
