//! Engine-agnostic primitives shared by the behavior tree crates.
//!
//! Everything here is plain data or a narrow trait: the tick context handed to every node,
//! the caller-owned blackboard used to thread parameters through a tree, and the world
//! traits that external collaborators implement.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod entity;
pub mod tick;
pub mod world;

pub use blackboard::{BbKey, Blackboard};
pub use entity::EntityId;
pub use tick::TickContext;
pub use world::{WorldMut, WorldView};
