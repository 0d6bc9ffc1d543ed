//! Decision tracing for behavior trees.
//!
//! Trees record which choices they made on which tick into the caller's blackboard, so a test
//! can assert on them and a driver can stream them into its log.

#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{emit, LogSink, TraceEvent, TraceLog, TraceSink, TRACE_LOG, TRACE_SINK};
