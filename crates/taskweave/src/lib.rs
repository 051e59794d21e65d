//! # Taskweave
//!
//! Taskweave is an adaptive plan execution engine for analytical
//! assistants. A structured, dependency-annotated task plan is executed
//! in rounds against a registry of named analytic capabilities; tasks
//! flagged as checkpoints can hand the not-yet-run remainder of the
//! plan to an external reasoning oracle for revision, with every
//! accepted revision validated, versioned, and audited.
//!
//! ## Core Components
//!
//! - **[`Plan`]**: ordered tasks forming a dependency graph, parsed
//!   from the wire shape via [`Plan::from_wire`]
//! - **[`Capability`]**: a named, typed analytic function, dispatched
//!   through a [`CapabilityRegistry`]
//! - **[`Scheduler`]**: the round-based execution loop producing
//!   per-task outputs and a [`PlanHistory`]
//! - **[`Oracle`]**: external collaborator proposing plan revisions at
//!   checkpoints
//! - **[`TraceSink`]**: append-only Run/Step/ToolCall audit records
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use taskweave::{
//!     Capability, CapabilityArgs, CapabilityResult, CapabilitySignature, ExpectedType,
//!     InMemoryCapabilityRegistry, NativeValue, NoopTraceSink, NullOracle, Plan,
//!     RunRequest, Scheduler,
//! };
//!
//! struct Doubler;
//!
//! impl Capability for Doubler {
//!     fn name(&self) -> &str {
//!         "double"
//!     }
//!
//!     fn signature(&self) -> CapabilitySignature {
//!         CapabilitySignature::new().arg("value", ExpectedType::Int)
//!     }
//!
//!     fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
//!         Ok(NativeValue::Int(args.require_i64("value")? * 2))
//!     }
//! }
//!
//! let registry = Arc::new(InMemoryCapabilityRegistry::new().with_capability(Arc::new(Doubler)));
//! let plan = Plan::from_wire(&json!([
//!     { "task": "double", "id": "t1", "args": [{ "key": "value", "value": "21" }] }
//! ]))
//! .expect("well-formed plan");
//!
//! let scheduler = Scheduler::new(registry, Arc::new(NullOracle), Arc::new(NoopTraceSink));
//! let outcome = scheduler
//!     .run(RunRequest::new("double it", plan))
//!     .expect("plan executes");
//! assert_eq!(outcome.outputs.len(), 1);
//! ```

// ============================================================================
// Module aliases for namespaced access
// ============================================================================

pub use taskweave_capabilities as capabilities;
pub use taskweave_core as core;
pub use taskweave_engine as engine;
pub use taskweave_trace as trace;

#[cfg(feature = "testing")]
pub use taskweave_testing as testing;

// ============================================================================
// Core types - values, paths, capabilities
// ============================================================================

pub use taskweave_core::{
    Capability, CapabilityArgs, CapabilityError, CapabilityRegistry, CapabilityResult,
    CapabilitySignature, CastError, ExpectedType, InMemoryCapabilityRegistry, NativeValue,
    PathError, PathParseError, PathSegment, PropertyPath, Table, TaskId, TaskIdError, Value,
    coerce,
};

// ============================================================================
// Engine - plans, validation, scheduling, replanning
// ============================================================================

pub use taskweave_engine::{
    ArgumentSpec, ArgumentValue, Checkpoint, DEP_PREFIX, DependencyError, EngineError,
    EngineResult, ExecutionOutputs, NullOracle, Oracle, OracleError, Plan, PlanHistory,
    PlanParseError, PlanVersion, RevisionRequest, RunOutcome, RunRequest, Scheduler, Task,
    ValidationResult, validate_plan,
};

// ============================================================================
// Trace - audit records
// ============================================================================

pub use taskweave_trace::{
    InMemoryTraceSink, NoopTraceSink, RunId, RunRecord, StepId, StepRecord, ToolCallId,
    ToolCallRecord, TraceSink, TraceStatus,
};

// ============================================================================
// Standard capabilities
// ============================================================================

pub use taskweave_capabilities::{AnalyticsDataset, DatasetError, standard_registry};
