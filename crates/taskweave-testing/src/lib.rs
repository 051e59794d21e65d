//! # Taskweave Testing
//!
//! Controlled doubles and harnesses for exercising the plan execution
//! engine: mock capabilities with canned responses and call tracking, a
//! scripted oracle for replanning scenarios, a deterministic sample
//! dataset, and a harness that validates, parses, and runs wire-shape
//! plans while capturing the audit trace.

pub mod fixtures;
pub mod harness;
pub mod mock_capabilities;
pub mod oracle;

pub use fixtures::sample_dataset;
pub use harness::{HarnessError, PlanHarness};
pub use mock_capabilities::{MockCapability, MockRegistry};
pub use oracle::{FailingOracle, ScriptedOracle};
