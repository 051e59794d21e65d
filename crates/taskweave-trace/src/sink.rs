//! Trace sinks: where audit records go.
//!
//! The engine holds exactly one sink per run and writes to it
//! synchronously, so backends need no locking discipline beyond keeping
//! their own interior state consistent.

use crate::record::{
    RunId, RunRecord, StepId, StepRecord, ToolCallId, ToolCallRecord, TraceStatus,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

/// Sink for run/step/tool-call audit records.
///
/// Every record is written in two phases: a `create` that returns the
/// record id, then an `update` carrying the outcome.
pub trait TraceSink: Send + Sync {
    /// Open a run record for a user question.
    fn start_run(&self, question: &str) -> RunId;

    /// Close a run record with its terminal status.
    fn end_run(&self, run: RunId, status: TraceStatus);

    /// Open a step record under a run.
    fn create_step(&self, run: RunId, name: &str, input: Value) -> StepId;

    /// Update a step with a status and optional output.
    fn update_step(&self, step: StepId, status: TraceStatus, output: Option<Value>);

    /// Open a tool-call record under a step.
    fn create_tool_call(&self, step: StepId, capability: &str, input: Value) -> ToolCallId;

    /// Update a tool call with its status and output-or-error outcome.
    fn update_tool_call(&self, call: ToolCallId, status: TraceStatus, outcome: Result<Value, String>);
}

/// A sink that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn start_run(&self, _question: &str) -> RunId {
        RunId::new()
    }

    fn end_run(&self, _run: RunId, _status: TraceStatus) {}

    fn create_step(&self, _run: RunId, _name: &str, _input: Value) -> StepId {
        StepId::new()
    }

    fn update_step(&self, _step: StepId, _status: TraceStatus, _output: Option<Value>) {}

    fn create_tool_call(&self, _step: StepId, _capability: &str, _input: Value) -> ToolCallId {
        ToolCallId::new()
    }

    fn update_tool_call(
        &self,
        _call: ToolCallId,
        _status: TraceStatus,
        _outcome: Result<Value, String>,
    ) {
    }
}

#[derive(Debug, Default)]
struct TraceStore {
    runs: Vec<RunRecord>,
    steps: Vec<StepRecord>,
    calls: Vec<ToolCallRecord>,
}

/// An introspectable in-memory sink, for tests and drivers.
///
/// Records are held behind a mutex; accessors clone them out so callers
/// can assert on trace contents after a run.
#[derive(Debug, Default)]
pub struct InMemoryTraceSink {
    store: Mutex<TraceStore>,
}

impl InMemoryTraceSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, TraceStore> {
        // A poisoned lock only means a writer panicked mid-append; the
        // records themselves are still whole.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of all run records.
    pub fn runs(&self) -> Vec<RunRecord> {
        self.store().runs.clone()
    }

    /// Snapshot of all step records.
    pub fn steps(&self) -> Vec<StepRecord> {
        self.store().steps.clone()
    }

    /// Snapshot of all tool-call records.
    pub fn tool_calls(&self) -> Vec<ToolCallRecord> {
        self.store().calls.clone()
    }

    /// Snapshot of the tool calls recorded under one step.
    pub fn tool_calls_for(&self, step: StepId) -> Vec<ToolCallRecord> {
        self.store()
            .calls
            .iter()
            .filter(|call| call.step_id == step)
            .cloned()
            .collect()
    }
}

impl TraceSink for InMemoryTraceSink {
    fn start_run(&self, question: &str) -> RunId {
        let id = RunId::new();
        self.store().runs.push(RunRecord {
            id,
            question: question.to_string(),
            status: TraceStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
        });
        id
    }

    fn end_run(&self, run: RunId, status: TraceStatus) {
        let mut store = self.store();
        if let Some(record) = store.runs.iter_mut().find(|record| record.id == run) {
            record.status = status;
            record.ended_at = Some(Utc::now());
        }
    }

    fn create_step(&self, run: RunId, name: &str, input: Value) -> StepId {
        let id = StepId::new();
        self.store().steps.push(StepRecord {
            id,
            run_id: run,
            name: name.to_string(),
            input,
            output: None,
            status: TraceStatus::Started,
            created_at: Utc::now(),
        });
        id
    }

    fn update_step(&self, step: StepId, status: TraceStatus, output: Option<Value>) {
        let mut store = self.store();
        if let Some(record) = store.steps.iter_mut().find(|record| record.id == step) {
            record.status = status;
            if output.is_some() {
                record.output = output;
            }
        }
    }

    fn create_tool_call(&self, step: StepId, capability: &str, input: Value) -> ToolCallId {
        let id = ToolCallId::new();
        self.store().calls.push(ToolCallRecord {
            id,
            step_id: step,
            capability: capability.to_string(),
            input,
            output: None,
            error: None,
            status: TraceStatus::Started,
            started_at: Utc::now(),
            ended_at: None,
        });
        id
    }

    fn update_tool_call(
        &self,
        call: ToolCallId,
        status: TraceStatus,
        outcome: Result<Value, String>,
    ) {
        let mut store = self.store();
        if let Some(record) = store.calls.iter_mut().find(|record| record.id == call) {
            record.status = status;
            match outcome {
                Ok(output) => record.output = Some(output),
                Err(error) => record.error = Some(error),
            }
            record.ended_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_records_follow_the_two_phase_lifecycle() {
        let sink = InMemoryTraceSink::new();
        let run = sink.start_run("which segment is most engaged?");

        let runs = sink.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, TraceStatus::Running);
        assert!(runs[0].ended_at.is_none());

        sink.end_run(run, TraceStatus::Completed);
        let runs = sink.runs();
        assert_eq!(runs[0].status, TraceStatus::Completed);
        assert!(runs[0].ended_at.is_some());
    }

    #[test]
    fn steps_and_tool_calls_nest_under_their_parents() {
        let sink = InMemoryTraceSink::new();
        let run = sink.start_run("q");
        let step = sink.create_step(run, "run_plan", json!({ "plan": [] }));
        let call = sink.create_tool_call(step, "get_segment_description", json!({ "segment_id": 3 }));

        sink.update_tool_call(call, TraceStatus::Success, Ok(json!({ "segment_id": 3 })));
        sink.update_step(step, TraceStatus::Success, Some(json!({ "t1": {} })));

        let steps = sink.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].run_id, run);
        assert_eq!(steps[0].name, "run_plan");
        assert_eq!(steps[0].status, TraceStatus::Success);

        let calls = sink.tool_calls_for(step);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].capability, "get_segment_description");
        assert_eq!(calls[0].status, TraceStatus::Success);
        assert!(calls[0].ended_at.is_some());
    }

    #[test]
    fn tool_call_errors_are_kept_separately_from_output() {
        let sink = InMemoryTraceSink::new();
        let run = sink.start_run("q");
        let step = sink.create_step(run, "run_plan", json!(null));
        let call = sink.create_tool_call(step, "bad_tool", json!({}));

        sink.update_tool_call(call, TraceStatus::Error, Err("boom".to_string()));

        let calls = sink.tool_calls();
        assert_eq!(calls[0].status, TraceStatus::Error);
        assert_eq!(calls[0].error.as_deref(), Some("boom"));
        assert!(calls[0].output.is_none());
    }

    #[test]
    fn noop_sink_returns_fresh_ids() {
        let sink = NoopTraceSink;
        let run = sink.start_run("q");
        let step = sink.create_step(run, "run_plan", json!(null));
        let call = sink.create_tool_call(step, "t", json!(null));
        sink.update_tool_call(call, TraceStatus::Success, Ok(json!(null)));
        sink.end_run(run, TraceStatus::Completed);
    }
}
