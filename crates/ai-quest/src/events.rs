//! Asynchronous interruption signals and the single cell they may write.
//!
//! Handlers run outside tree evaluation, possibly on another thread. Their whole effect is one
//! atomic store into an [`InterruptFlag`]; the tree reads it on its own schedule.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Host events that mean "the agent's cast did not go through".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InterruptEvent {
    SpellcastFailed,
    SpellcastInterrupted,
}

impl InterruptEvent {
    pub const ALL: [InterruptEvent; 2] = [
        InterruptEvent::SpellcastFailed,
        InterruptEvent::SpellcastInterrupted,
    ];

    /// Host-side event name.
    pub fn name(self) -> &'static str {
        match self {
            InterruptEvent::SpellcastFailed => "UNIT_SPELLCAST_FAILED",
            InterruptEvent::SpellcastInterrupted => "UNIT_SPELLCAST_INTERRUPTED",
        }
    }
}

impl fmt::Display for InterruptEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whose cast an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caster {
    /// The agent itself.
    Player,
    Other,
}

/// Payload delivered with an [`InterruptEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpellcastNotice {
    pub event: InterruptEvent,
    pub caster: Caster,
    pub spell_name: String,
    pub spell_id: u32,
}

pub type InterruptHandler = Arc<dyn Fn(&SpellcastNotice) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Event subscription surface of the host.
pub trait SpellcastEvents {
    fn subscribe(&mut self, event: InterruptEvent, handler: InterruptHandler) -> SubscriptionId;

    /// Returns false if `id` was not subscribed to `event`.
    fn unsubscribe(&mut self, event: InterruptEvent, id: SubscriptionId) -> bool;
}

/// Boolean shared between asynchronous handlers and the evaluating tree.
///
/// Writers only ever `raise` (a single release store). The tree clears it before it subscribes
/// and reads it after it has unsubscribed, so every raise made while subscribed is observed.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Handler that raises this flag for the agent's own casts and ignores everyone else's.
    pub fn handler(&self) -> InterruptHandler {
        let flag = self.clone();
        Arc::new(move |notice: &SpellcastNotice| {
            if notice.caster != Caster::Player {
                return;
            }
            tracing::debug!(
                spell = %notice.spell_name,
                spell_id = notice.spell_id,
                event = %notice.event,
                "cast interrupted"
            );
            flag.raise();
        })
    }
}

/// Live subscription of one handler to every [`InterruptEvent`].
///
/// Released explicitly; `release` is idempotent, so every exit path may call it.
#[derive(Debug, Default)]
pub struct InterruptSubscription {
    active: Option<[(InterruptEvent, SubscriptionId); 2]>,
}

impl InterruptSubscription {
    pub fn subscribe<H>(host: &mut H, flag: &InterruptFlag) -> Self
    where
        H: SpellcastEvents + ?Sized,
    {
        let [first, second] = InterruptEvent::ALL;
        let active = [
            (first, host.subscribe(first, flag.handler())),
            (second, host.subscribe(second, flag.handler())),
        ];
        Self {
            active: Some(active),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Unsubscribe everything. Returns false if there was nothing to release.
    pub fn release<H>(&mut self, host: &mut H) -> bool
    where
        H: SpellcastEvents + ?Sized,
    {
        let Some(active) = self.active.take() else {
            return false;
        };
        for (event, id) in active {
            if !host.unsubscribe(event, id) {
                tracing::warn!(%event, ?id, "host had already dropped the subscription");
            }
        }
        true
    }
}
