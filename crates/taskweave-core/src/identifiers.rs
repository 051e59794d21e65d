//! Validated identifier types shared across the engine.
//!
//! Task identifiers arrive from a planning boundary that is free-form by
//! nature, so validation is deliberately light: emptiness, surrounding
//! whitespace, and length are rejected, but no character set is imposed.
//! The newtype still prevents mixing task ids with other strings at
//! compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for a task identifier.
pub const MAX_TASK_ID_LENGTH: usize = 128;

/// Error type for task identifier validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIdError {
    /// The identifier string is empty.
    Empty,
    /// The identifier is whitespace-only or has surrounding whitespace.
    Whitespace,
    /// The identifier exceeds the maximum length.
    TooLong { length: usize, max: usize },
}

impl fmt::Display for TaskIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskIdError::Empty => write!(f, "Task id cannot be empty"),
            TaskIdError::Whitespace => {
                write!(f, "Task id cannot be blank or have surrounding whitespace")
            }
            TaskIdError::TooLong { length, max } => {
                write!(f, "Task id too long ({} chars, max {})", length, max)
            }
        }
    }
}

impl std::error::Error for TaskIdError {}

/// Unique identifier for a task within one plan.
///
/// # Examples
///
/// ```rust
/// use taskweave_core::TaskId;
///
/// let id = TaskId::parse("t1").unwrap();
/// assert_eq!(id.as_str(), "t1");
///
/// assert!(TaskId::parse("").is_err());
/// assert!(TaskId::parse("  t1  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Parse and validate a task id from a string.
    pub fn parse(id: impl AsRef<str>) -> Result<Self, TaskIdError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(TaskIdError::Empty);
        }
        if id.trim().is_empty() || id.trim() != id {
            return Err(TaskIdError::Whitespace);
        }
        if id.len() > MAX_TASK_ID_LENGTH {
            return Err(TaskIdError::TooLong {
                length: id.len(),
                max: MAX_TASK_ID_LENGTH,
            });
        }
        Ok(Self(id.to_string()))
    }

    /// Get the task id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create a task id without validation (for testing only).
    #[doc(hidden)]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl TryFrom<String> for TaskId {
    type Error = TaskIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}
