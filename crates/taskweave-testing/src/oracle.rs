//! Scripted oracles for replanning scenarios.

use std::collections::VecDeque;
use std::sync::Mutex;
use taskweave_core::Value;
use taskweave_engine::{Oracle, OracleError, RevisionRequest};

/// An oracle that replays a queue of scripted revisions.
///
/// Each `propose_revision` call pops the next scripted raw text (and
/// records the request for assertions); `structure` parses raw text as
/// JSON. An exhausted script reports the oracle as unavailable, which
/// the engine absorbs.
#[derive(Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<RevisionRequest>>,
}

impl ScriptedOracle {
    /// Create an oracle with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a revision given as a wire-shape plan value.
    pub fn with_revision(self, plan: Value) -> Self {
        self.script.lock().unwrap().push_back(plan.to_string());
        self
    }

    /// Queue a revision given as raw text (possibly not valid JSON).
    pub fn with_raw(self, raw: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(raw.into());
        self
    }

    /// Every request the engine made, in order.
    pub fn requests(&self) -> Vec<RevisionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Oracle for ScriptedOracle {
    fn propose_revision(&self, request: &RevisionRequest) -> Result<String, OracleError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| OracleError::Unavailable {
                reason: "revision script exhausted".to_string(),
            })
    }

    fn structure(&self, raw: &str) -> Result<Value, OracleError> {
        serde_json::from_str(raw).map_err(|err| OracleError::Structuring {
            reason: err.to_string(),
        })
    }
}

/// An oracle whose calls always fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingOracle;

impl Oracle for FailingOracle {
    fn propose_revision(&self, _request: &RevisionRequest) -> Result<String, OracleError> {
        Err(OracleError::Unavailable {
            reason: "oracle is down".to_string(),
        })
    }

    fn structure(&self, _raw: &str) -> Result<Value, OracleError> {
        Err(OracleError::Unavailable {
            reason: "oracle is down".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> RevisionRequest {
        RevisionRequest {
            question: "q".to_string(),
            remaining_plan: json!([]),
            latest_output: json!(null),
            prior_output_keys: Vec::new(),
        }
    }

    #[test]
    fn scripted_revisions_replay_in_order() {
        let oracle = ScriptedOracle::new()
            .with_revision(json!([{ "task": "a", "id": "t1" }]))
            .with_raw("not json");

        let first = oracle.propose_revision(&request()).unwrap();
        assert!(oracle.structure(&first).is_ok());

        let second = oracle.propose_revision(&request()).unwrap();
        assert!(matches!(
            oracle.structure(&second),
            Err(OracleError::Structuring { .. })
        ));

        assert!(matches!(
            oracle.propose_revision(&request()),
            Err(OracleError::Unavailable { .. })
        ));
        assert_eq!(oracle.requests().len(), 3);
    }
}
