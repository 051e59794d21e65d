//! # Taskweave Trace
//!
//! Append-only audit records for plan runs: one `Run` per user request,
//! one `Step` per scheduling phase, one `ToolCall` per capability
//! invocation. The engine writes each record in two phases (create,
//! then update with the outcome) through a [`TraceSink`], which is a
//! single-writer resource scoped to one run.

pub mod record;
pub mod sink;

pub use record::{RunId, RunRecord, StepId, StepRecord, ToolCallId, ToolCallRecord, TraceStatus};
pub use sink::{InMemoryTraceSink, NoopTraceSink, TraceSink};
