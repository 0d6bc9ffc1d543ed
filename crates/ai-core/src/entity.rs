use core::fmt::Debug;

/// Identity of a world entity (unit, game object) as seen by the tree runtime.
///
/// Entities are never owned by a tree. Nodes hold the identifier and look the entity up again
/// on every use, because the underlying object may despawn or die between ticks.
///
/// Requirements:
/// - stable ordering (`Ord`) so snapshots and logs are deterministic
/// - a stable numeric ID (`stable_id`) for trace events
pub trait EntityId: Copy + Ord + Eq + Debug + 'static {
    fn stable_id(self) -> u64;
}

impl EntityId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl EntityId for u32 {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

impl EntityId for usize {
    fn stable_id(self) -> u64 {
        self as u64
    }
}
