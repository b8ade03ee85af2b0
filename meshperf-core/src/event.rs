use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event pushed by the backend while a run is in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StreamEvent {
    Info {
        #[serde(default)]
        message: String,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    Success {
        #[serde(default)]
        result: Option<TestResult>,
    },
}

impl StreamEvent {
    pub fn status(&self) -> &'static str {
        match self {
            StreamEvent::Info { .. } => "info",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Success { .. } => "success",
        }
    }
}

/// Result of a completed run. Everything besides the fields read here is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meshery_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_results: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestResult {
    pub fn has_runner_results(&self) -> bool {
        matches!(&self.runner_results, Some(v) if !v.is_null())
    }
}
