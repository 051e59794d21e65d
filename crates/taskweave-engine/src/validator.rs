//! Structural plan validation.
//!
//! Validation judges a candidate plan in its raw wire form, so the same
//! checker covers the initial plan and whatever the oracle proposes
//! mid-run, including output that is not well-typed enough to parse.
//! Every defect is accumulated and returned as data; validation is
//! never raised as an error.

use serde_json::Value;
use std::collections::BTreeSet;
use taskweave_core::kind;

/// Outcome of validating a candidate plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the plan passed every check.
    pub ok: bool,
    /// Every defect found, in plan order.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// A passing result.
    pub fn valid() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    /// A failing result carrying the accumulated defects.
    pub fn invalid(errors: Vec<String>) -> Self {
        Self { ok: false, errors }
    }

    fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::valid()
        } else {
            Self::invalid(errors)
        }
    }
}

/// Validate a wire-shape plan against the known capability set.
///
/// Checks, accumulating every failure rather than stopping at the
/// first:
///
/// - every task id is a string, and unique within the plan
/// - every task's capability name is known
/// - `dep` is a list, and every entry names a task present in the plan
///   (forward references are allowed)
/// - `args` is a list
///
/// Pure: callable on the initial plan and on any replanning candidate.
pub fn validate_plan(plan: &Value, known_capabilities: &BTreeSet<String>) -> ValidationResult {
    let Some(tasks) = plan.as_array() else {
        return ValidationResult::invalid(vec![format!(
            "plan must be a list of tasks, got {}",
            kind(plan)
        )]);
    };

    // Ids declared anywhere in the plan; dependencies may point forward.
    let declared: BTreeSet<&str> = tasks
        .iter()
        .filter_map(|task| task.get("id").and_then(Value::as_str))
        .collect();

    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();

    for task in tasks {
        let label = task
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<missing id>")
            .to_string();

        match task.get("id") {
            Some(Value::String(id)) => {
                if !seen.insert(id.clone()) {
                    errors.push(format!("duplicate task id: {}", id));
                }
            }
            Some(other) => errors.push(format!("task id must be a string: {}", other)),
            None => errors.push("task is missing an id".to_string()),
        }

        match task.get("task").and_then(Value::as_str) {
            Some(name) if known_capabilities.contains(name) => {}
            Some(name) => errors.push(format!("unknown capability: {}", name)),
            None => errors.push(format!("task '{}' is missing a capability name", label)),
        }

        match task.get("dep") {
            None => {}
            Some(Value::Array(deps)) => {
                for dep in deps {
                    match dep.as_str() {
                        Some(dep) if declared.contains(dep) => {}
                        Some(dep) => errors.push(format!(
                            "task '{}' depends on missing task '{}'",
                            label, dep
                        )),
                        None => errors.push(format!(
                            "task '{}' has a non-string dependency: {}",
                            label, dep
                        )),
                    }
                }
            }
            Some(other) => errors.push(format!(
                "dependencies must be a list for task '{}', got {}",
                label,
                kind(other)
            )),
        }

        match task.get("args") {
            None | Some(Value::Array(_)) => {}
            Some(other) => errors.push(format!(
                "args must be a list for task '{}', got {}",
                label,
                kind(other)
            )),
        }
    }

    ValidationResult::from_errors(errors)
}
