//! Mock capabilities with predictable responses.
//!
//! Mocks return canned [`NativeValue`] responses, optionally keyed on
//! an argument value, and track call counts and argument history for
//! assertions. Cloned mocks share their tracking state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use taskweave_core::{
    Capability, CapabilityArgs, CapabilityError, CapabilityRegistry, CapabilityResult,
    CapabilitySignature, NativeValue, Value,
};

#[derive(Clone)]
struct ArgMatcher {
    key: String,
    value: Value,
    response: NativeValue,
}

/// A mock capability with canned responses and call tracking.
#[derive(Clone)]
pub struct MockCapability {
    name: String,
    signature: CapabilitySignature,
    matchers: Arc<Vec<ArgMatcher>>,
    default_response: Option<NativeValue>,
    failure: Option<CapabilityError>,
    call_count: Arc<Mutex<usize>>,
    call_args: Arc<Mutex<Vec<Value>>>,
}

impl MockCapability {
    /// Create a mock with the given name.
    ///
    /// With no configured responses, invocations succeed with a map
    /// echoing the capability name and arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: CapabilitySignature::new(),
            matchers: Arc::new(Vec::new()),
            default_response: None,
            failure: None,
            call_count: Arc::new(Mutex::new(0)),
            call_args: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Declare the mock's argument signature.
    pub fn with_signature(mut self, signature: CapabilitySignature) -> Self {
        self.signature = signature;
        self
    }

    /// Set the response for every unmatched invocation.
    pub fn with_response(mut self, response: NativeValue) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Respond with `response` whenever argument `key` equals `value`.
    pub fn with_response_for(
        mut self,
        key: impl Into<String>,
        value: Value,
        response: NativeValue,
    ) -> Self {
        let matchers = Arc::make_mut(&mut self.matchers);
        matchers.push(ArgMatcher {
            key: key.into(),
            value,
            response,
        });
        self
    }

    /// Make every invocation fail with an internal error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(CapabilityError::Internal {
            message: message.into(),
        });
        self
    }

    /// Number of invocations so far.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The argument maps of every invocation, in order.
    pub fn call_args(&self) -> Vec<Value> {
        self.call_args.lock().unwrap().clone()
    }

    /// Whether any invocation carried `key == value`.
    pub fn was_called_with(&self, key: &str, value: &Value) -> bool {
        self.call_args
            .lock()
            .unwrap()
            .iter()
            .any(|args| args.get(key) == Some(value))
    }
}

impl Capability for MockCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "mock capability"
    }

    fn signature(&self) -> CapabilitySignature {
        self.signature.clone()
    }

    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
        *self.call_count.lock().unwrap() += 1;
        self.call_args.lock().unwrap().push(args.to_value());

        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        for matcher in self.matchers.iter() {
            if args.get(&matcher.key) == Some(&matcher.value) {
                return Ok(matcher.response.clone());
            }
        }
        if let Some(response) = &self.default_response {
            return Ok(response.clone());
        }
        Ok(NativeValue::map([
            ("capability", NativeValue::from(self.name.as_str())),
            ("args", NativeValue::from(args.to_value())),
        ]))
    }
}

/// A registry of mock capabilities.
#[derive(Clone, Default)]
pub struct MockRegistry {
    capabilities: HashMap<String, Arc<MockCapability>>,
}

impl MockRegistry {
    /// Create an empty mock registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock capability, builder-style.
    pub fn with_capability(mut self, capability: MockCapability) -> Self {
        self.capabilities
            .insert(capability.name.clone(), Arc::new(capability));
        self
    }

    /// Add a mock that always succeeds with an `{"ok": true}` map.
    pub fn with_success_capability(self, name: impl Into<String>) -> Self {
        self.with_capability(
            MockCapability::new(name)
                .with_response(NativeValue::map([("ok", NativeValue::Bool(true))])),
        )
    }

    /// Add a mock that always fails.
    pub fn with_failure_capability(self, name: impl Into<String>) -> Self {
        self.with_capability(MockCapability::new(name).with_failure("mock failure"))
    }

    /// Get a registered mock for assertions.
    pub fn get(&self, name: &str) -> Option<Arc<MockCapability>> {
        self.capabilities.get(name).cloned()
    }
}

impl CapabilityRegistry for MockRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities
            .get(name)
            .cloned()
            .map(|capability| capability as Arc<dyn Capability>)
    }

    fn capability_names(&self) -> Vec<String> {
        self.capabilities.keys().cloned().collect()
    }
}
