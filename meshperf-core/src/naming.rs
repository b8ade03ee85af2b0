use crate::constants::{NONE_MESH, NO_MESH_LABEL};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Name used for a profile or a run.
///
/// A non-blank user supplied name is kept as is. Otherwise a display name is derived from the
/// selected mesh and the current time in milliseconds. Uniqueness is not checked.
pub fn generate_test_name(name: &str, mesh: &str) -> String {
    if !name.trim().is_empty() {
        return name.to_string();
    }

    let mesh = if mesh.is_empty() || mesh == NONE_MESH {
        NO_MESH_LABEL
    } else {
        mesh
    };
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    format!("{mesh}_{millis}")
}

/// Fresh per-run correlation token.
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}
