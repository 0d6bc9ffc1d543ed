//! Cooperative, re-entrant behavior tree runtime built on `ai-core`.
//!
//! Every node is ticked by a single logical evaluation thread and must return promptly with a
//! [`BtStatus`]. Multi-tick work is expressed as `Running` plus per-instance state (a child
//! index, a timestamp, a latch); nothing here sleeps or spawns.
//!
//! - Composites: [`Sequence`] (resumes at the running child), [`PrioritySelector`]
//!   (re-evaluated from the top every tick)
//! - Gates: [`Decorator`], [`DecoratorContinue`], [`Throttle`]
//! - Cooperative waits: [`Wait`], [`WaitContinue`]
//! - Leaves: [`Condition`], [`Action`], [`Succeed`], [`Fail`]

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod builder;
pub mod decorators;
pub mod nodes;
pub mod policy;
pub mod timing;

pub use bt::{BtNode, BtStatus, Predicate};
pub use decorators::{AlwaysSucceed, Decorator, DecoratorContinue};
pub use nodes::{Action, Condition, Fail, PrioritySelector, Sequence, Succeed};
pub use policy::BtPolicy;
pub use timing::{Throttle, Wait, WaitContinue};
