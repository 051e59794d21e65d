//! Checkpoint replanning.
//!
//! When a checkpoint task completes, the controller extracts a target
//! value from its output, asks the oracle to revise the not-yet-run
//! remainder of the plan, and accepts the revision only if it validates
//! against the known capability set. Every failure along the way
//! (oracle unavailable, unstructurable text, a rejected or unparsable
//! candidate) is absorbed: the prior remaining plan is kept and
//! scheduling continues. Replanning never aborts a run.

use crate::outputs::ExecutionOutputs;
use crate::plan::{Plan, Task};
use crate::validator::validate_plan;
use std::collections::BTreeSet;
use std::fmt;
use taskweave_core::Value;

/// Everything the oracle sees when asked to revise the remaining plan.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionRequest {
    /// The user question driving the run.
    pub question: String,
    /// Wire-shape serialization of the remaining plan (the completed
    /// checkpoint task is already excluded).
    pub remaining_plan: Value,
    /// The checkpoint task's target-extracted output.
    pub latest_output: Value,
    /// Ids of every output recorded so far, in production order.
    pub prior_output_keys: Vec<String>,
}

/// Errors from the oracle boundary. Never fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle could not be reached or declined to answer.
    Unavailable { reason: String },
    /// The oracle's free-form text could not be structured into a plan.
    Structuring { reason: String },
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::Unavailable { reason } => write!(f, "oracle unavailable: {}", reason),
            OracleError::Structuring { reason } => {
                write!(f, "oracle output could not be structured: {}", reason)
            }
        }
    }
}

impl std::error::Error for OracleError {}

/// External reasoning collaborator that proposes plan revisions.
///
/// Both calls are synchronous and blocking; the engine gives no
/// liveness guarantee against an oracle that never returns.
pub trait Oracle: Send + Sync {
    /// Produce free-form revision text for the given request.
    fn propose_revision(&self, request: &RevisionRequest) -> Result<String, OracleError>;

    /// Structure free-form text into a candidate plan: a JSON array of
    /// wire-shape task objects.
    fn structure(&self, raw: &str) -> Result<Value, OracleError>;
}

/// An oracle that always declines to revise.
///
/// Checkpoint tasks still complete normally; the remaining plan is
/// simply never replaced. Useful for drivers that execute plans without
/// a reasoning backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl Oracle for NullOracle {
    fn propose_revision(&self, _request: &RevisionRequest) -> Result<String, OracleError> {
        Err(OracleError::Unavailable {
            reason: "plan revision is disabled".to_string(),
        })
    }

    fn structure(&self, _raw: &str) -> Result<Value, OracleError> {
        Err(OracleError::Unavailable {
            reason: "plan revision is disabled".to_string(),
        })
    }
}

/// Ask the oracle to revise `remaining` after a checkpoint completion.
///
/// Returns the validated replacement plan, or `None` when the candidate
/// must be discarded (with the reason logged).
pub(crate) fn attempt_revision(
    oracle: &dyn Oracle,
    known_capabilities: &BTreeSet<String>,
    question: &str,
    remaining: &Plan,
    checkpoint_task: &Task,
    output: &Value,
    outputs: &ExecutionOutputs,
) -> Option<Plan> {
    let request = RevisionRequest {
        question: question.to_string(),
        remaining_plan: remaining.to_wire(),
        latest_output: checkpoint_target(checkpoint_task, output),
        prior_output_keys: outputs.key_strings(),
    };

    let raw = match oracle.propose_revision(&request) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(
                task = %checkpoint_task.id,
                error = %err,
                "oracle call failed, keeping current plan"
            );
            return None;
        }
    };

    let candidate = match oracle.structure(&raw) {
        Ok(candidate) => candidate,
        Err(err) => {
            tracing::warn!(
                task = %checkpoint_task.id,
                error = %err,
                "revision text could not be structured, keeping current plan"
            );
            return None;
        }
    };

    let validation = validate_plan(&candidate, known_capabilities);
    if !validation.ok {
        tracing::warn!(
            task = %checkpoint_task.id,
            errors = ?validation.errors,
            "revised plan failed validation, keeping current plan"
        );
        return None;
    }

    match Plan::from_wire(&candidate) {
        Ok(plan) => Some(plan),
        Err(err) => {
            tracing::warn!(
                task = %checkpoint_task.id,
                error = %err,
                "revised plan could not be parsed, keeping current plan"
            );
            None
        }
    }
}

/// Extract the checkpoint's target value from a completed output.
///
/// Falls back to the whole output when the configured path cannot be
/// applied; extraction failure is logged, never fatal.
fn checkpoint_target(task: &Task, output: &Value) -> Value {
    let Some(checkpoint) = &task.checkpoint else {
        return output.clone();
    };
    match &checkpoint.target {
        None => output.clone(),
        Some(path) => match path.resolve(output) {
            Ok(value) => value.clone(),
            Err(err) => {
                tracing::warn!(
                    task = %task.id,
                    error = %err,
                    "checkpoint target extraction failed, using full output"
                );
                output.clone()
            }
        },
    }
}
