//! Boxed constructors for terser tree literals.
//!
//! `sequence(vec![...])` instead of `Box::new(Sequence::new(vec![...]))`. The closure-taking
//! helpers also pin down closure signatures, so call sites need no type annotations.

use ai_core::{Blackboard, TickContext, WorldMut};

use crate::bt::{BtNode, BtStatus};
use crate::decorators::{AlwaysSucceed, Decorator, DecoratorContinue};
use crate::nodes::{Action, Condition, PrioritySelector, Sequence};
use crate::timing::{Throttle, Wait, WaitContinue};

pub fn sequence<W: WorldMut + 'static>(children: Vec<Box<dyn BtNode<W>>>) -> Box<dyn BtNode<W>> {
    Box::new(Sequence::new(children))
}

pub fn priority<W: WorldMut + 'static>(children: Vec<Box<dyn BtNode<W>>>) -> Box<dyn BtNode<W>> {
    Box::new(PrioritySelector::new(children))
}

pub fn condition<W, F>(cond: F) -> Box<dyn BtNode<W>>
where
    W: WorldMut + 'static,
    F: FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
{
    Box::new(Condition::new(cond))
}

pub fn action<W, F>(run: F) -> Box<dyn BtNode<W>>
where
    W: WorldMut + 'static,
    F: FnMut(&TickContext, &mut W, &mut Blackboard) -> BtStatus + 'static,
{
    Box::new(Action::new(run))
}

pub fn decorator<W, F>(predicate: F, child: Box<dyn BtNode<W>>) -> Box<dyn BtNode<W>>
where
    W: WorldMut + 'static,
    F: FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
{
    Box::new(Decorator::new(predicate, child))
}

pub fn decorator_continue<W, F>(predicate: F, child: Box<dyn BtNode<W>>) -> Box<dyn BtNode<W>>
where
    W: WorldMut + 'static,
    F: FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
{
    Box::new(DecoratorContinue::new(predicate, child))
}

pub fn always_succeed<W: WorldMut + 'static>(child: Box<dyn BtNode<W>>) -> Box<dyn BtNode<W>> {
    Box::new(AlwaysSucceed::new(child))
}

pub fn throttle<W: WorldMut + 'static>(
    interval_seconds: f64,
    child: Box<dyn BtNode<W>>,
) -> Box<dyn BtNode<W>> {
    Box::new(Throttle::new(interval_seconds, child))
}

pub fn wait<W, F>(timeout_seconds: f64, until: F, child: Box<dyn BtNode<W>>) -> Box<dyn BtNode<W>>
where
    W: WorldMut + 'static,
    F: FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
{
    Box::new(Wait::new(timeout_seconds, until, child))
}

pub fn wait_continue<W, F>(
    timeout_seconds: f64,
    until: F,
    child: Box<dyn BtNode<W>>,
) -> Box<dyn BtNode<W>>
where
    W: WorldMut + 'static,
    F: FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
{
    Box::new(WaitContinue::new(timeout_seconds, until, child))
}
