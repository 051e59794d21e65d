//! The plan wire shape.
//!
//! This is the form plans take at both external boundaries: the initial
//! planning step and the oracle's structured revisions. A plan is a JSON
//! list of task objects:
//!
//! ```json
//! [{
//!   "task": "get_topic_transitions",
//!   "id": "t2",
//!   "dep": ["t1"],
//!   "args": [
//!     { "key": "segment_id", "value": "DEP_t1", "property": "segment_id" },
//!     { "key": "top_n", "value": "5" }
//!   ],
//!   "analyze_answer": true,
//!   "analyze_target_property": "0.to_topic"
//! }]
//! ```
//!
//! `dep` and `args` default to empty. An argument value is a dependency
//! reference exactly when it is a string carrying the reserved `DEP_`
//! prefix; `property` narrows the referenced output and is ignored on
//! literals.

use crate::plan::{ArgumentSpec, ArgumentValue, Checkpoint, Plan, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use taskweave_core::{PathParseError, PropertyPath, TaskId, TaskIdError};

/// Reserved prefix marking an argument value as a dependency reference.
pub const DEP_PREFIX: &str = "DEP_";

/// Wire form of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTask {
    /// Capability name.
    #[serde(rename = "task")]
    pub capability: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dep: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<WireArg>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub analyze_answer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyze_target_property: Option<String>,
}

/// Wire form of one argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireArg {
    pub key: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Errors converting a wire-shape plan into the typed model.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanParseError {
    /// The JSON did not match the wire shape at all.
    Shape { message: String },
    /// A task or dependency id failed id validation.
    InvalidTaskId { id: String, source: TaskIdError },
    /// A property path string failed to parse.
    InvalidPath {
        task: String,
        path: String,
        source: PathParseError,
    },
}

impl fmt::Display for PlanParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanParseError::Shape { message } => {
                write!(f, "plan does not match the wire shape: {}", message)
            }
            PlanParseError::InvalidTaskId { id, source } => {
                write!(f, "invalid task id '{}': {}", id, source)
            }
            PlanParseError::InvalidPath { task, path, source } => {
                write!(f, "task '{}' has invalid path '{}': {}", task, path, source)
            }
        }
    }
}

impl std::error::Error for PlanParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanParseError::Shape { .. } => None,
            PlanParseError::InvalidTaskId { source, .. } => Some(source),
            PlanParseError::InvalidPath { source, .. } => Some(source),
        }
    }
}

impl Plan {
    /// Parse a wire-shape plan: a JSON array of task objects.
    pub fn from_wire(value: &Value) -> Result<Self, PlanParseError> {
        let wire: Vec<WireTask> = serde_json::from_value(value.clone())
            .map_err(|err| PlanParseError::Shape {
                message: err.to_string(),
            })?;
        let mut tasks = Vec::with_capacity(wire.len());
        for task in wire {
            tasks.push(task.into_task()?);
        }
        Ok(Plan::new(tasks))
    }

    /// Render the plan back into its wire shape.
    pub fn to_wire(&self) -> Value {
        let wire: Vec<WireTask> = self.tasks().iter().map(WireTask::from_task).collect();
        serde_json::to_value(wire).expect("wire tasks serialize to JSON")
    }
}

impl WireTask {
    fn into_task(self) -> Result<Task, PlanParseError> {
        let raw_id = self.id;
        let id = TaskId::parse(&raw_id).map_err(|source| PlanParseError::InvalidTaskId {
            id: raw_id.clone(),
            source,
        })?;

        let mut dependencies = Vec::with_capacity(self.dep.len());
        for dep in self.dep {
            dependencies.push(TaskId::parse(&dep).map_err(|source| {
                PlanParseError::InvalidTaskId { id: dep, source }
            })?);
        }

        let mut arguments = Vec::with_capacity(self.args.len());
        for arg in self.args {
            arguments.push(arg.into_spec(&raw_id)?);
        }

        let checkpoint = if self.analyze_answer {
            let target = match self.analyze_target_property {
                None => None,
                Some(path) => Some(PropertyPath::parse(&path).map_err(|source| {
                    PlanParseError::InvalidPath {
                        task: raw_id.clone(),
                        path,
                        source,
                    }
                })?),
            };
            Some(Checkpoint { target })
        } else {
            None
        };

        Ok(Task {
            id,
            capability: self.capability,
            dependencies,
            arguments,
            checkpoint,
        })
    }

    fn from_task(task: &Task) -> Self {
        let args = task.arguments.iter().map(WireArg::from_spec).collect();
        let (analyze_answer, analyze_target_property) = match &task.checkpoint {
            None => (false, None),
            Some(checkpoint) => (
                true,
                checkpoint.target.as_ref().map(PropertyPath::to_string),
            ),
        };
        WireTask {
            capability: task.capability.clone(),
            id: task.id.as_str().to_string(),
            dep: task
                .dependencies
                .iter()
                .map(|dep| dep.as_str().to_string())
                .collect(),
            args,
            analyze_answer,
            analyze_target_property,
        }
    }
}

impl WireArg {
    fn into_spec(self, task: &str) -> Result<ArgumentSpec, PlanParseError> {
        let referenced = match &self.value {
            Value::String(text) if text.starts_with(DEP_PREFIX) => {
                Some(text[DEP_PREFIX.len()..].to_string())
            }
            // `property` is only meaningful on references.
            _ => None,
        };

        let value = match referenced {
            None => ArgumentValue::Literal(self.value),
            Some(referenced) => {
                let dependency = TaskId::parse(&referenced).map_err(|source| {
                    PlanParseError::InvalidTaskId {
                        id: referenced,
                        source,
                    }
                })?;
                let path = match self.property {
                    None => None,
                    Some(path) => Some(PropertyPath::parse(&path).map_err(|source| {
                        PlanParseError::InvalidPath {
                            task: task.to_string(),
                            path,
                            source,
                        }
                    })?),
                };
                ArgumentValue::Reference {
                    task: dependency,
                    path,
                }
            }
        };
        Ok(ArgumentSpec {
            key: self.key,
            value,
        })
    }

    fn from_spec(spec: &ArgumentSpec) -> Self {
        match &spec.value {
            ArgumentValue::Literal(value) => WireArg {
                key: spec.key.clone(),
                value: value.clone(),
                property: None,
            },
            ArgumentValue::Reference { task, path } => WireArg {
                key: spec.key.clone(),
                value: Value::String(format!("{}{}", DEP_PREFIX, task)),
                property: path.as_ref().map(PropertyPath::to_string),
            },
        }
    }
}
