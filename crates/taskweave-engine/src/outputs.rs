//! Execution outputs: the per-task results of one run.
//!
//! Outputs accumulate for the lifetime of a run and are write-once: a
//! task's normalized result is recorded exactly when the task completes
//! and never mutated afterwards. Insertion order is preserved because
//! "output keys produced so far" is part of what the oracle sees at
//! checkpoints.

use crate::error::DependencyError;
use indexmap::IndexMap;
use serde_json::Map;
use taskweave_core::{TaskId, Value};

/// Append-only map from task id to that task's normalized result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionOutputs {
    entries: IndexMap<TaskId, Value>,
}

impl ExecutionOutputs {
    /// Create an empty outputs map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a task's result. Write-once: recording under an existing
    /// id is an invariant violation.
    pub(crate) fn insert(&mut self, task: TaskId, value: Value) -> Result<(), DependencyError> {
        if self.entries.contains_key(&task) {
            return Err(DependencyError::DuplicateOutput { task });
        }
        self.entries.insert(task, value);
        Ok(())
    }

    /// Get a task's recorded output.
    pub fn get(&self, task: &TaskId) -> Option<&Value> {
        self.entries.get(task)
    }

    /// Whether an output exists for a task id.
    pub fn contains(&self, task: &TaskId) -> bool {
        self.entries.contains_key(task)
    }

    /// Task ids in production order.
    pub fn keys(&self) -> impl Iterator<Item = &TaskId> {
        self.entries.keys()
    }

    /// Task ids in production order, as strings.
    pub fn key_strings(&self) -> Vec<String> {
        self.entries.keys().map(|id| id.as_str().to_string()).collect()
    }

    /// Number of recorded outputs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no outputs have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(task id, output)` pairs in production order.
    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &Value)> {
        self.entries.iter()
    }

    /// Render the outputs as a transport object keyed by task id.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (task, value) in &self.entries {
            object.insert(task.as_str().to_string(), value.clone());
        }
        Value::Object(object)
    }
}
