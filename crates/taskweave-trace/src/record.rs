//! Audit record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a run record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a fresh run id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a step record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(Uuid);

impl StepId {
    /// Generate a fresh step id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a tool-call record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallId(Uuid);

impl ToolCallId {
    /// Generate a fresh tool-call id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ToolCallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ToolCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a trace record.
///
/// Runs move `queued → running → completed | failed`; steps and tool
/// calls move `started → running → success | error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    Queued,
    Started,
    Running,
    Success,
    Error,
    Completed,
    Failed,
}

impl TraceStatus {
    /// The status as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceStatus::Queued => "queued",
            TraceStatus::Started => "started",
            TraceStatus::Running => "running",
            TraceStatus::Success => "success",
            TraceStatus::Error => "error",
            TraceStatus::Completed => "completed",
            TraceStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TraceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One agent run: a single user request end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: RunId,
    pub question: String,
    pub status: TraceStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// One scheduling phase within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub id: StepId,
    pub run_id: RunId,
    pub name: String,
    pub input: Value,
    pub output: Option<Value>,
    pub status: TraceStatus,
    pub created_at: DateTime<Utc>,
}

/// One capability invocation within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: ToolCallId,
    pub step_id: StepId,
    pub capability: String,
    pub input: Value,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub status: TraceStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(TraceStatus::Started.as_str(), "started");
        assert_eq!(
            serde_json::to_string(&TraceStatus::Success).unwrap(),
            "\"success\""
        );
        let status: TraceStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(status, TraceStatus::Error);
    }

    #[test]
    fn record_ids_are_distinct() {
        assert_ne!(RunId::new(), RunId::new());
        assert_ne!(StepId::new(), StepId::new());
        assert_ne!(ToolCallId::new(), ToolCallId::new());
    }
}
