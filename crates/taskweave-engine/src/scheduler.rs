//! The round-based scheduling loop.
//!
//! One logical loop per run. Each round scans the remaining plan in
//! order and executes every task whose dependencies are satisfied;
//! completing a checkpoint task abandons the rest of the round, runs
//! the replanning controller, and restarts scanning against the
//! (possibly replaced) remaining plan. A full scan with no progress
//! while tasks remain fails the run. Execution is synchronous and
//! single-threaded: no task ever runs concurrently with another, and a
//! hanging capability or oracle call blocks the run.

use crate::error::{EngineError, EngineResult};
use crate::outputs::ExecutionOutputs;
use crate::plan::{Plan, PlanHistory, Task};
use crate::replan::{Oracle, attempt_revision};
use crate::resolver::resolve_arguments;
use serde_json::json;
use std::sync::Arc;
use taskweave_core::{CapabilityRegistry, CapabilitySignature, TaskId, Value};
use taskweave_trace::{StepId, TraceSink, TraceStatus};

/// A single plan execution request.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// The user question driving the run; forwarded to the oracle at
    /// checkpoints.
    pub question: String,
    /// The initial plan, assumed validated.
    pub plan: Plan,
}

impl RunRequest {
    /// Create a request.
    pub fn new(question: impl Into<String>, plan: Plan) -> Self {
        Self {
            question: question.into(),
            plan,
        }
    }
}

/// Final state of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// One normalized output per executed task.
    pub outputs: ExecutionOutputs,
    /// Every plan snapshot produced, the initial plan first.
    pub versions: PlanHistory,
}

/// Drives plan execution against a capability registry.
///
/// The scheduler owns exactly one remaining plan at a time; an accepted
/// revision replaces that owned value atomically, and the history keeps
/// each snapshot. Capabilities execute synchronously, the oracle is
/// consulted only at checkpoints, and every invocation is audited
/// through the trace sink.
pub struct Scheduler {
    registry: Arc<dyn CapabilityRegistry>,
    oracle: Arc<dyn Oracle>,
    trace: Arc<dyn TraceSink>,
}

impl Scheduler {
    /// Create a scheduler over a registry, oracle, and trace sink.
    pub fn new(
        registry: Arc<dyn CapabilityRegistry>,
        oracle: Arc<dyn Oracle>,
        trace: Arc<dyn TraceSink>,
    ) -> Self {
        Self {
            registry,
            oracle,
            trace,
        }
    }

    /// Execute a plan to completion.
    ///
    /// The initial plan should have passed
    /// [`validate_plan`](crate::validator::validate_plan) first; the
    /// runtime keeps its own defensive invariants and fails the run on
    /// violations. An empty plan is a legitimate no-op. On success the
    /// outcome holds one output per executed task plus the full version
    /// history; on failure the error is recorded on the active trace
    /// records and surfaced to the caller.
    pub fn run(&self, request: RunRequest) -> EngineResult<RunOutcome> {
        let run_id = self.trace.start_run(&request.question);
        let step_input = json!({
            "question": request.question,
            "plan": request.plan.to_wire(),
        });
        let step_id = self.trace.create_step(run_id, "run_plan", step_input);

        match self.execute(&request.question, request.plan, step_id) {
            Ok(outcome) => {
                self.trace
                    .update_step(step_id, TraceStatus::Success, Some(outcome.outputs.to_value()));
                self.trace.end_run(run_id, TraceStatus::Completed);
                Ok(outcome)
            }
            Err(err) => {
                self.trace
                    .update_step(step_id, TraceStatus::Error, Some(Value::String(err.to_string())));
                self.trace.end_run(run_id, TraceStatus::Failed);
                Err(err)
            }
        }
    }

    fn execute(&self, question: &str, plan: Plan, step_id: StepId) -> EngineResult<RunOutcome> {
        let mut history = PlanHistory::initial(plan.clone());
        let mut remaining = plan;
        let mut outputs = ExecutionOutputs::new();
        let mut round = 0u32;

        while !remaining.is_empty() {
            round += 1;
            let mut progress = false;
            tracing::debug!(round, remaining = remaining.len(), "scanning remaining plan");

            let scan: Vec<TaskId> = remaining.iter().map(|task| task.id.clone()).collect();
            for id in scan {
                let Some(task) = remaining.find(&id).cloned() else {
                    continue;
                };
                if !task.dependencies.iter().all(|dep| outputs.contains(dep)) {
                    continue;
                }

                let value = self.execute_task(&task, &outputs, step_id)?;
                outputs
                    .insert(task.id.clone(), value.clone())
                    .map_err(|source| EngineError::Dependency {
                        task: task.id.clone(),
                        source,
                    })?;
                remaining.remove(&task.id);
                progress = true;
                tracing::info!(task = %task.id, capability = %task.capability, "task executed");

                if task.is_checkpoint() {
                    if let Some(revised) = attempt_revision(
                        self.oracle.as_ref(),
                        &self.registry.known_names(),
                        question,
                        &remaining,
                        &task,
                        &value,
                        &outputs,
                    ) {
                        history.push_revision(revised.clone());
                        remaining = revised;
                        tracing::info!(
                            task = %task.id,
                            version = history.len(),
                            "remaining plan revised"
                        );
                    }
                    // Abandon the rest of this round and rescan from
                    // the (possibly replaced) remaining plan.
                    break;
                }
            }

            if !progress && !remaining.is_empty() {
                return Err(EngineError::Unschedulable {
                    remaining: remaining.iter().map(|task| task.id.clone()).collect(),
                });
            }
        }

        Ok(RunOutcome {
            outputs,
            versions: history,
        })
    }

    fn execute_task(
        &self,
        task: &Task,
        outputs: &ExecutionOutputs,
        step_id: StepId,
    ) -> EngineResult<Value> {
        // Resolution happens before the unknown-capability check; an
        // unregistered capability declares nothing, so nothing coerces.
        let capability = self.registry.lookup(&task.capability);
        let signature = capability
            .as_ref()
            .map(|capability| capability.signature())
            .unwrap_or_else(CapabilitySignature::new);
        let args = resolve_arguments(task, outputs, &signature)?;

        let Some(capability) = capability else {
            return Err(EngineError::UnknownCapability {
                task: task.id.clone(),
                capability: task.capability.clone(),
            });
        };

        let call_id = self
            .trace
            .create_tool_call(step_id, &task.capability, args.to_value());
        match capability.invoke(&args) {
            Ok(result) => {
                let value = result.into_transport();
                self.trace
                    .update_tool_call(call_id, TraceStatus::Success, Ok(value.clone()));
                Ok(value)
            }
            Err(source) => {
                self.trace
                    .update_tool_call(call_id, TraceStatus::Error, Err(source.to_string()));
                Err(EngineError::Capability {
                    task: task.id.clone(),
                    capability: task.capability.clone(),
                    source,
                })
            }
        }
    }
}
