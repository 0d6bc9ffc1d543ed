//! Movement primitives for behavior trees.
//!
//! Path planning itself is the host's business; this crate only decides *when* to ask for
//! movement, when to stop, and how to fall back when the planner gives up.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod math;
pub mod move_within_range;
pub mod world;

pub use math::Vec3;
pub use move_within_range::{MoveWithinRange, Provider};
pub use world::{MoveResult, MovementWorld};
