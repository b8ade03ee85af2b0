use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Pre-configured telemetry boards for cluster and node metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticBoardConfig {
    #[serde(default)]
    pub cluster: BoardConfig,
    #[serde(default)]
    pub node: BoardConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub panels: Vec<Value>,
    /// Run token the board is persisted against.
    #[serde(rename = "testUUID", default, skip_serializing_if = "Option::is_none")]
    pub test_uuid: Option<Uuid>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StaticBoardConfig {
    /// Only boards with panels for both the cluster and the node are usable.
    pub fn is_complete(&self) -> bool {
        !self.cluster.panels.is_empty() && !self.node.panels.is_empty()
    }

    /// Copy of the boards with the cluster board tagged with the given run token.
    pub fn for_run(&self, test_uuid: Uuid) -> Self {
        let mut boards = self.clone();
        boards.cluster.test_uuid = Some(test_uuid);
        boards
    }
}
