//! The plan execution harness.
//!
//! Runs a wire-shape plan through the full pipeline (validate, parse,
//! execute) with an in-memory trace sink captured for assertions.

use std::fmt;
use std::sync::Arc;
use taskweave_core::{CapabilityRegistry, Value};
use taskweave_engine::{
    EngineError, NullOracle, Oracle, Plan, PlanParseError, RunOutcome, RunRequest, Scheduler,
    validate_plan,
};
use taskweave_trace::InMemoryTraceSink;

/// Errors surfaced by a harness run.
#[derive(Debug)]
pub enum HarnessError {
    /// The plan failed structural validation.
    InvalidPlan { errors: Vec<String> },
    /// The plan passed validation but did not parse into the typed model.
    Parse(PlanParseError),
    /// Execution failed.
    Engine(EngineError),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::InvalidPlan { errors } => {
                write!(f, "plan failed validation: {}", errors.join("; "))
            }
            HarnessError::Parse(err) => write!(f, "plan failed to parse: {}", err),
            HarnessError::Engine(err) => write!(f, "run failed: {}", err),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::InvalidPlan { .. } => None,
            HarnessError::Parse(err) => Some(err),
            HarnessError::Engine(err) => Some(err),
        }
    }
}

/// Harness binding a registry, an oracle, and a captured trace.
pub struct PlanHarness {
    registry: Arc<dyn CapabilityRegistry>,
    oracle: Arc<dyn Oracle>,
    trace: Arc<InMemoryTraceSink>,
}

impl PlanHarness {
    /// Create a harness over a registry, with replanning disabled.
    pub fn new(registry: Arc<dyn CapabilityRegistry>) -> Self {
        Self {
            registry,
            oracle: Arc::new(NullOracle),
            trace: Arc::new(InMemoryTraceSink::new()),
        }
    }

    /// Use the given oracle for checkpoint replanning.
    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// The captured trace sink.
    pub fn trace(&self) -> Arc<InMemoryTraceSink> {
        Arc::clone(&self.trace)
    }

    /// Validate, parse, and execute a wire-shape plan.
    pub fn run_wire(&self, question: &str, plan: &Value) -> Result<RunOutcome, HarnessError> {
        let validation = validate_plan(plan, &self.registry.known_names());
        if !validation.ok {
            return Err(HarnessError::InvalidPlan {
                errors: validation.errors,
            });
        }
        let plan = Plan::from_wire(plan).map_err(HarnessError::Parse)?;
        let scheduler = Scheduler::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.oracle),
            self.trace(),
        );
        scheduler
            .run(RunRequest::new(question, plan))
            .map_err(HarnessError::Engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_capabilities::MockRegistry;
    use serde_json::json;

    #[test]
    fn harness_rejects_invalid_plans_before_running() {
        let registry = MockRegistry::new().with_success_capability("known");
        let harness = PlanHarness::new(Arc::new(registry));

        let err = harness
            .run_wire("q", &json!([{ "task": "unknown", "id": "t1" }]))
            .unwrap_err();
        match err {
            HarnessError::InvalidPlan { errors } => {
                assert!(errors[0].contains("unknown capability"));
            }
            other => panic!("expected InvalidPlan, got {:?}", other),
        }
        // Nothing ran.
        assert!(harness.trace().runs().is_empty());
    }

    #[test]
    fn harness_runs_valid_plans_and_captures_the_trace() {
        let registry = MockRegistry::new().with_success_capability("known");
        let harness = PlanHarness::new(Arc::new(registry));

        let outcome = harness
            .run_wire("q", &json!([{ "task": "known", "id": "t1" }]))
            .unwrap();
        assert_eq!(outcome.outputs.len(), 1);
        assert_eq!(harness.trace().runs().len(), 1);
        assert_eq!(harness.trace().tool_calls().len(), 1);
    }
}
