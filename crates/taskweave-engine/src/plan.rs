//! The typed plan model: tasks, dependencies, checkpoints, versions.
//!
//! Plans arrive from the planning boundary in wire form (see
//! [`crate::wire`]) and are converted into these owned, tagged types
//! before execution, so missing or oddly-typed fields are a parse-time
//! concern rather than something the scheduler trips over mid-run.

use taskweave_core::{PropertyPath, TaskId, Value};

/// A single capability invocation within a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique id within the owning plan.
    pub id: TaskId,
    /// Name of the capability to invoke.
    pub capability: String,
    /// Ids of tasks whose outputs must exist before this task is ready.
    pub dependencies: Vec<TaskId>,
    /// Argument specs resolved at execution time.
    pub arguments: Vec<ArgumentSpec>,
    /// Present when completing this task triggers replanning.
    pub checkpoint: Option<Checkpoint>,
}

impl Task {
    /// Whether this task triggers replanning on completion.
    pub fn is_checkpoint(&self) -> bool {
        self.checkpoint.is_some()
    }
}

/// Replanning marker on a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// Path extracting the value the oracle should reason about from
    /// the task's output; the whole output when absent.
    pub target: Option<PropertyPath>,
}

/// One named argument of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    pub key: String,
    pub value: ArgumentValue,
}

/// An argument's value source.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// A literal transport value, used verbatim (before coercion).
    Literal(Value),
    /// Another task's output, optionally narrowed by a property path.
    Reference {
        task: TaskId,
        path: Option<PropertyPath>,
    },
}

/// An ordered list of tasks forming a dependency graph.
///
/// Order matters: when several tasks become ready in the same round,
/// they execute in plan order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    tasks: Vec<Task>,
}

impl Plan {
    /// Create a plan from tasks in execution tie-break order.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Borrow the tasks in order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks remaining in the plan.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the plan has no tasks. An empty plan is a legitimate
    /// terminal state, not a fault.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Find a task by id.
    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Whether the plan contains a task with the given id.
    pub fn contains(&self, id: &TaskId) -> bool {
        self.find(id).is_some()
    }

    /// Iterate over tasks in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Remove a task by id, preserving the order of the rest.
    pub(crate) fn remove(&mut self, id: &TaskId) {
        self.tasks.retain(|task| &task.id != id);
    }
}

/// An immutable, sequence-numbered snapshot of a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanVersion {
    /// 1-based version sequence; the initial plan is version 1.
    pub sequence: u32,
    pub plan: Plan,
}

/// Append-only history of the plan snapshots produced during one run.
///
/// The first version is the initial plan; each accepted revision appends
/// the next. Completed tasks and their recorded outputs are never
/// rewritten by a new version.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanHistory {
    versions: Vec<PlanVersion>,
}

impl PlanHistory {
    /// Start a history from the initial plan.
    pub fn initial(plan: Plan) -> Self {
        Self {
            versions: vec![PlanVersion { sequence: 1, plan }],
        }
    }

    /// Append an accepted revision as the next version.
    pub(crate) fn push_revision(&mut self, plan: Plan) {
        let sequence = self.versions.len() as u32 + 1;
        self.versions.push(PlanVersion { sequence, plan });
    }

    /// All versions, oldest first.
    pub fn versions(&self) -> &[PlanVersion] {
        &self.versions
    }

    /// Number of versions produced so far (at least 1).
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// A history always holds at least the initial plan.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The most recent version.
    pub fn latest(&self) -> &PlanVersion {
        // Constructed non-empty and only ever appended to.
        &self.versions[self.versions.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> Task {
        Task {
            id: TaskId::new_unchecked(id),
            capability: "noop".to_string(),
            dependencies: Vec::new(),
            arguments: Vec::new(),
            checkpoint: None,
        }
    }

    #[test]
    fn plan_preserves_declaration_order() {
        let plan = Plan::new(vec![task("b"), task("a")]);
        let ids: Vec<&str> = plan.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn remove_keeps_relative_order() {
        let mut plan = Plan::new(vec![task("a"), task("b"), task("c")]);
        plan.remove(&TaskId::new_unchecked("b"));
        let ids: Vec<&str> = plan.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(!plan.contains(&TaskId::new_unchecked("b")));
    }

    #[test]
    fn history_numbers_versions_from_one() {
        let mut history = PlanHistory::initial(Plan::new(vec![task("a")]));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().sequence, 1);

        history.push_revision(Plan::new(vec![task("b")]));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().sequence, 2);
        assert_eq!(history.versions()[0].plan.tasks()[0].id.as_str(), "a");
    }
}
