//! Decision trace.
//!
//! Nodes report what they decided through [`emit`]; the driver picks where events go by
//! installing a [`TraceLog`] and/or a [`TraceSink`] on the blackboard. With neither installed,
//! nothing is recorded.

use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ai_core::{BbKey, Blackboard, EntityId};

/// One decision: on which tick, what (a dotted tag such as `"target.select"`), about whom.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    /// Stable id of the entity the decision was about.
    pub subject: Option<u64>,
    /// A score, a distance or a count; 0 when there is nothing to report.
    pub value: f64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            subject: None,
            value: 0.0,
        }
    }

    pub fn with_subject(self, subject: impl EntityId) -> Self {
        Self {
            subject: Some(subject.stable_id()),
            ..self
        }
    }

    pub fn with_value(self, value: f64) -> Self {
        Self { value, ..self }
    }

    /// First segment of the tag: `"interact"` for `"interact.start"`.
    pub fn area(&self) -> &str {
        self.tag.split('.').next().unwrap_or_default()
    }
}

/// Streaming destination installed under [`TRACE_SINK`].
pub trait TraceSink {
    fn record(&mut self, event: &TraceEvent);
}

/// Forwards every event to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&mut self, event: &TraceEvent) {
        tracing::debug!(
            tick = event.tick,
            tag = %event.tag,
            subject = ?event.subject,
            value = event.value,
            "decision"
        );
    }
}

/// In-memory history installed under [`TRACE_LOG`], queried by tag.
#[derive(Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn count(&self, tag: &str) -> usize {
        self.events.iter().filter(|e| e.tag == tag).count()
    }

    /// Most recent event carrying `tag`.
    pub fn last(&self, tag: &str) -> Option<&TraceEvent> {
        self.events.iter().rev().find(|e| e.tag == tag)
    }

    /// Tags in recording order.
    pub fn tags(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.tag.as_ref()).collect()
    }

    pub fn in_area<'a>(&'a self, area: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.area() == area)
    }
}

pub const TRACE_LOG: BbKey<TraceLog> = BbKey::new(0xA11D_7ACE_0000_0001, "trace.log");

pub const TRACE_SINK: BbKey<Box<dyn TraceSink>> =
    BbKey::new(0xA11D_7ACE_0000_0002, "trace.sink");

/// Hand `event` to the installed sink, then append it to the installed log.
pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(sink) = blackboard.get_mut(TRACE_SINK) {
        sink.record(&event);
    }
    if let Some(log) = blackboard.get_mut(TRACE_LOG) {
        log.push(event);
    }
}
