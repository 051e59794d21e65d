//! Argument resolution.
//!
//! Turns a task's argument specs into the concrete map its capability
//! is invoked with. Per argument, in order: resolve the dependency
//! reference against recorded outputs, extract the property path, then
//! coerce to the declared expected type. Literals are used verbatim;
//! keys with no declared type pass through uncoerced.

use crate::error::{DependencyError, EngineError, EngineResult};
use crate::outputs::ExecutionOutputs;
use crate::plan::{ArgumentValue, Task};
use taskweave_core::{CapabilityArgs, CapabilitySignature, coerce};

/// Build the concrete argument map for one task.
///
/// A reference to a dependency absent from `outputs` is a
/// [`DependencyError`]: the scheduler must not have presented the task
/// as ready. A property-path failure here is fatal for the run, since
/// the task is already executing.
pub fn resolve_arguments(
    task: &Task,
    outputs: &ExecutionOutputs,
    signature: &CapabilitySignature,
) -> EngineResult<CapabilityArgs> {
    let mut args = CapabilityArgs::new();
    for spec in &task.arguments {
        let mut value = match &spec.value {
            ArgumentValue::Literal(value) => value.clone(),
            ArgumentValue::Reference {
                task: dependency,
                path,
            } => {
                let output = outputs.get(dependency).ok_or_else(|| EngineError::Dependency {
                    task: task.id.clone(),
                    source: DependencyError::MissingOutput {
                        task: task.id.clone(),
                        argument: spec.key.clone(),
                        dependency: dependency.clone(),
                    },
                })?;
                match path {
                    None => output.clone(),
                    Some(path) => path
                        .resolve(output)
                        .map_err(|source| EngineError::Path {
                            task: task.id.clone(),
                            source,
                        })?
                        .clone(),
                }
            }
        };

        if let Some(expected) = signature.expected_for(&spec.key) {
            value = coerce(value, expected).map_err(|source| EngineError::Cast {
                task: task.id.clone(),
                key: spec.key.clone(),
                source,
            })?;
        }

        args.insert(spec.key.clone(), value);
    }
    Ok(args)
}
