use serde::{Deserialize, Serialize};

/// The part of the user preferences document this crate cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPrefs {
    #[serde(rename = "loadTestPrefs", default)]
    pub load_test_prefs: Option<LoadTestPrefs>,
}

/// Default load test parameters saved by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadTestPrefs {
    #[serde(default)]
    pub qps: u32,
    #[serde(default)]
    pub c: u32,
    #[serde(default)]
    pub t: String,
    #[serde(default)]
    pub gen: String,
}
