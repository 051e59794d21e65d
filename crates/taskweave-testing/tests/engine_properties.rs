//! Scheduling properties of the engine, driven through the harness.

use serde_json::json;
use std::sync::Arc;
use taskweave_engine::{DependencyError, EngineError};
use taskweave_testing::{HarnessError, MockCapability, MockRegistry, PlanHarness, ScriptedOracle};
use taskweave_trace::TraceStatus;

fn registry() -> MockRegistry {
    MockRegistry::new()
        .with_success_capability("alpha")
        .with_success_capability("beta")
        .with_success_capability("gamma")
}

#[test]
fn acyclic_plans_produce_one_output_per_task_in_dependency_order() {
    let registry = registry();
    let harness = PlanHarness::new(Arc::new(registry.clone()));

    // t3 is declared first but depends on both of the others.
    let outcome = harness
        .run_wire(
            "q",
            &json!([
                { "task": "gamma", "id": "t3", "dep": ["t1", "t2"] },
                { "task": "alpha", "id": "t1" },
                { "task": "beta", "id": "t2" }
            ]),
        )
        .unwrap();

    assert_eq!(outcome.outputs.len(), 3);
    assert_eq!(outcome.outputs.key_strings(), vec!["t1", "t2", "t3"]);
    assert_eq!(outcome.versions.len(), 1);
}

#[test]
fn cyclic_plans_are_unschedulable_after_independent_tasks_run() {
    let registry = registry();
    let harness = PlanHarness::new(Arc::new(registry.clone()));

    let err = harness
        .run_wire(
            "q",
            &json!([
                { "task": "alpha", "id": "a", "dep": ["b"] },
                { "task": "beta", "id": "b", "dep": ["a"] },
                { "task": "gamma", "id": "c" }
            ]),
        )
        .unwrap_err();

    match err {
        HarnessError::Engine(EngineError::Unschedulable { remaining }) => {
            let ids: Vec<&str> = remaining.iter().map(|id| id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b"]);
        }
        other => panic!("expected Unschedulable, got {:?}", other),
    }

    // The independent task executed before the round stalled; nothing
    // else did.
    assert_eq!(registry.get("gamma").unwrap().call_count(), 1);
    assert_eq!(registry.get("alpha").unwrap().call_count(), 0);

    let trace = harness.trace();
    assert_eq!(trace.runs()[0].status, TraceStatus::Failed);
    assert_eq!(trace.steps()[0].status, TraceStatus::Error);
}

#[test]
fn empty_plans_are_a_successful_noop() {
    let harness = PlanHarness::new(Arc::new(registry()));
    let outcome = harness.run_wire("q", &json!([])).unwrap();

    assert!(outcome.outputs.is_empty());
    assert_eq!(outcome.versions.len(), 1);
    assert_eq!(harness.trace().runs()[0].status, TraceStatus::Completed);
}

#[test]
fn capability_failures_fail_the_run_and_mark_the_trace() {
    let registry = MockRegistry::new()
        .with_success_capability("alpha")
        .with_failure_capability("broken");
    let harness = PlanHarness::new(Arc::new(registry));

    let err = harness
        .run_wire(
            "q",
            &json!([
                { "task": "alpha", "id": "t1" },
                { "task": "broken", "id": "t2", "dep": ["t1"] }
            ]),
        )
        .unwrap_err();
    assert!(matches!(err, HarnessError::Engine(EngineError::Capability { .. })));

    let trace = harness.trace();
    let calls = trace.tool_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].status, TraceStatus::Success);
    assert_eq!(calls[1].status, TraceStatus::Error);
    assert!(calls[1].error.is_some());
}

#[test]
fn a_revision_reviving_a_completed_id_trips_the_write_once_invariant() {
    let registry = MockRegistry::new().with_success_capability("alpha");
    let oracle = ScriptedOracle::new().with_revision(json!([
        { "task": "alpha", "id": "t1" }
    ]));
    let harness = PlanHarness::new(Arc::new(registry.clone())).with_oracle(Arc::new(oracle));

    // t1 completes, checkpoints, and the accepted revision names t1
    // again; re-executing it must not overwrite the recorded output.
    let err = harness
        .run_wire(
            "q",
            &json!([{ "task": "alpha", "id": "t1", "analyze_answer": true }]),
        )
        .unwrap_err();

    match err {
        HarnessError::Engine(EngineError::Dependency { source, .. }) => {
            assert!(matches!(source, DependencyError::DuplicateOutput { .. }));
        }
        other => panic!("expected a dependency invariant violation, got {:?}", other),
    }
    assert_eq!(registry.get("alpha").unwrap().call_count(), 2);
}

#[test]
fn structurally_invalid_plans_never_reach_the_scheduler() {
    let harness = PlanHarness::new(Arc::new(registry()));

    let err = harness
        .run_wire(
            "q",
            &json!([
                { "task": "alpha", "id": "t1" },
                { "task": "nonexistent", "id": "t1", "dep": ["ghost"] }
            ]),
        )
        .unwrap_err();

    match err {
        HarnessError::InvalidPlan { errors } => {
            assert_eq!(errors.len(), 3);
            assert!(errors.iter().any(|e| e.contains("duplicate task id")));
            assert!(errors.iter().any(|e| e.contains("unknown capability")));
            assert!(errors.iter().any(|e| e.contains("missing task 'ghost'")));
        }
        other => panic!("expected InvalidPlan, got {:?}", other),
    }
    assert!(harness.trace().runs().is_empty());
}

#[test]
fn coercion_failures_abort_the_run() {
    let registry = MockRegistry::new().with_capability(
        MockCapability::new("typed").with_signature(
            taskweave_core::CapabilitySignature::new()
                .arg("top_n", taskweave_core::ExpectedType::Int),
        ),
    );
    let harness = PlanHarness::new(Arc::new(registry));

    let err = harness
        .run_wire(
            "q",
            &json!([{
                "task": "typed",
                "id": "t1",
                "args": [{ "key": "top_n", "value": "abc" }]
            }]),
        )
        .unwrap_err();
    assert!(matches!(err, HarnessError::Engine(EngineError::Cast { .. })));
}
