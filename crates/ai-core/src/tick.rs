/// Per-tick execution context.
///
/// Created fresh by the driver for every evaluation pass and discarded afterwards. It carries
/// only the clock; caller-supplied parameters travel through the [`crate::Blackboard`] or
/// through providers captured at tree-construction time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickContext {
    pub tick: u64,
    /// Monotonic host time in seconds. Timed nodes only ever compare differences of this value,
    /// so their accuracy is bounded by the tick cadence.
    pub now_seconds: f64,
}

impl TickContext {
    pub fn new(tick: u64, now_seconds: f64) -> Self {
        Self { tick, now_seconds }
    }

    /// Context for the following tick, `dt_seconds` later.
    pub fn next(&self, dt_seconds: f64) -> Self {
        Self {
            tick: self.tick.wrapping_add(1),
            now_seconds: self.now_seconds + dt_seconds.max(0.0),
        }
    }

    /// Seconds elapsed since `earlier`, clamped at zero if the host clock went backwards.
    pub fn seconds_since(&self, earlier: f64) -> f64 {
        (self.now_seconds - earlier).max(0.0)
    }
}
