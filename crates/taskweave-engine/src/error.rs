//! Engine error taxonomy.
//!
//! Three channels, kept deliberately separate:
//!
//! - structural plan defects are returned as
//!   [`crate::validator::ValidationResult`] data and never raised;
//! - oracle and replan-validation failures are absorbed by the
//!   replanning controller, which keeps the prior remaining plan;
//! - everything here is the fatal channel: a failure inside the
//!   scheduling/execution path aborts the run and is recorded on the
//!   active trace records as `error`.

use std::fmt;
use taskweave_core::{CapabilityError, CastError, PathError, TaskId};

/// A scheduling invariant was violated.
///
/// These are defensive: a correct scheduler never presents a task as
/// ready with a missing dependency output, and never records two
/// outputs under one id.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencyError {
    /// A ready task referenced a dependency with no recorded output.
    MissingOutput {
        task: TaskId,
        argument: String,
        dependency: TaskId,
    },

    /// A second output was recorded under an already-written task id.
    DuplicateOutput { task: TaskId },
}

impl fmt::Display for DependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyError::MissingOutput {
                task,
                argument,
                dependency,
            } => write!(
                f,
                "task '{}' argument '{}' references dependency '{}' with no recorded output",
                task, argument, dependency
            ),
            DependencyError::DuplicateOutput { task } => {
                write!(f, "output for task '{}' was already recorded", task)
            }
        }
    }
}

impl std::error::Error for DependencyError {}

/// Fatal errors raised from the scheduling/execution path.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A full round completed without progress while tasks remain:
    /// a dependency cycle, or dependencies that can never be satisfied.
    Unschedulable { remaining: Vec<TaskId> },

    /// A task names a capability absent from the registry.
    UnknownCapability { task: TaskId, capability: String },

    /// A capability invocation failed.
    Capability {
        task: TaskId,
        capability: String,
        source: CapabilityError,
    },

    /// A scheduling invariant was violated.
    Dependency { task: TaskId, source: DependencyError },

    /// A property path could not be applied while resolving arguments
    /// for a currently executing task.
    Path { task: TaskId, source: PathError },

    /// An argument could not be coerced to its declared type.
    Cast {
        task: TaskId,
        key: String,
        source: CastError,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Unschedulable { remaining } => {
                let ids: Vec<&str> = remaining.iter().map(TaskId::as_str).collect();
                write!(
                    f,
                    "no task became ready in a full round; {} tasks remain: {}",
                    remaining.len(),
                    ids.join(", ")
                )
            }
            EngineError::UnknownCapability { task, capability } => {
                write!(f, "task '{}' names unknown capability '{}'", task, capability)
            }
            EngineError::Capability {
                task,
                capability,
                source,
            } => write!(
                f,
                "capability '{}' failed for task '{}': {}",
                capability, task, source
            ),
            EngineError::Dependency { source, .. } => {
                write!(f, "scheduling invariant violated: {}", source)
            }
            EngineError::Path { task, source } => write!(f, "task '{}': {}", task, source),
            EngineError::Cast { task, key, source } => {
                write!(f, "task '{}' argument '{}': {}", task, key, source)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Unschedulable { .. } | EngineError::UnknownCapability { .. } => None,
            EngineError::Capability { source, .. } => Some(source),
            EngineError::Dependency { source, .. } => Some(source),
            EngineError::Path { source, .. } => Some(source),
            EngineError::Cast { source, .. } => Some(source),
        }
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
