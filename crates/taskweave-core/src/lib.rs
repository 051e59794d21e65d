//! # Taskweave Core
//!
//! Core types for the Taskweave plan execution engine: the transport
//! value model, the property-path sublanguage used to extract nested
//! results, and the capability contract (named, typed analytic functions
//! plus the registries that dispatch to them).

pub mod capability;
pub mod identifiers;
pub mod path;
pub mod registry;
pub mod signature;
pub mod value;

pub use capability::{Capability, CapabilityArgs, CapabilityError, CapabilityResult};
pub use identifiers::{TaskId, TaskIdError};
pub use path::{PathError, PathParseError, PathSegment, PropertyPath};
pub use registry::{CapabilityRegistry, InMemoryCapabilityRegistry};
pub use signature::{CapabilitySignature, CastError, ExpectedType, coerce};
pub use value::{NativeValue, Table, kind};

/// Transport-safe value tree: the form every capability result takes
/// before it is stored in execution outputs or handed to a caller.
pub use serde_json::Value;
