//! Capability lookup and registration.

use crate::capability::Capability;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Trait for capability lookup.
///
/// Registries maintain the set of capabilities a run may invoke and
/// resolve names to implementations. The scheduler treats a failed
/// lookup as fatal for the requesting task; the validator consults
/// [`CapabilityRegistry::known_names`] to reject plans naming anything
/// outside the registry before execution starts.
pub trait CapabilityRegistry: Send + Sync {
    /// Resolve a capability by name.
    fn lookup(&self, name: &str) -> Option<Arc<dyn Capability>>;

    /// All registered capability names.
    fn capability_names(&self) -> Vec<String>;

    /// The registered names as a set, for plan validation.
    fn known_names(&self) -> BTreeSet<String> {
        self.capability_names().into_iter().collect()
    }
}

/// In-memory capability registry for single-process engines.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use taskweave_core::{
///     Capability, CapabilityArgs, CapabilityResult, CapabilityRegistry,
///     InMemoryCapabilityRegistry, NativeValue,
/// };
///
/// struct Echo;
///
/// impl Capability for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
///         Ok(NativeValue::from(args.to_value()))
///     }
/// }
///
/// let registry = InMemoryCapabilityRegistry::new().with_capability(Arc::new(Echo));
/// assert!(registry.lookup("echo").is_some());
/// assert!(registry.lookup("missing").is_none());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryCapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl InMemoryCapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under its own name, builder-style.
    pub fn with_capability(mut self, capability: Arc<dyn Capability>) -> Self {
        self.register(capability);
        self
    }

    /// Register a capability under its own name.
    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.capabilities
            .insert(capability.name().to_string(), capability);
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl CapabilityRegistry for InMemoryCapabilityRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }

    fn capability_names(&self) -> Vec<String> {
        self.capabilities.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilityArgs, CapabilityResult};
    use crate::value::NativeValue;

    struct Constant(i64);

    impl Capability for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn invoke(&self, _args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
            Ok(NativeValue::Int(self.0))
        }
    }

    struct Upper;

    impl Capability for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
            Ok(NativeValue::from(args.require_str("text")?.to_uppercase()))
        }
    }

    #[test]
    fn registry_resolves_registered_capabilities() {
        let registry = InMemoryCapabilityRegistry::new()
            .with_capability(Arc::new(Constant(7)))
            .with_capability(Arc::new(Upper));

        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("constant").is_some());
        assert!(registry.lookup("upper").is_some());
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn known_names_collects_every_registration() {
        let registry = InMemoryCapabilityRegistry::new()
            .with_capability(Arc::new(Constant(1)))
            .with_capability(Arc::new(Upper));

        let names = registry.known_names();
        assert!(names.contains("constant"));
        assert!(names.contains("upper"));
        assert_eq!(names.len(), 2);
    }
}
