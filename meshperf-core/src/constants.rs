use std::time::Duration;

/// Default Meshery server address used when none is configured.
pub const DEFAULT_SERVER: &str = "http://localhost:9081";

/// Duration pre-filled into a fresh form.
pub const DEFAULT_TEST_DURATION: &str = "30s";

/// Timeout for plain request/response calls. Run streams are not bound by it.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Mesh label used in generated names when no mesh is selected.
pub const NO_MESH_LABEL: &str = "No mesh";

/// Mesh value which must never reach the backend as a mesh name.
pub const NONE_MESH: &str = "None";

pub const MSG_PROFILE_SAVE_FAILED: &str = "Failed to create performance profile";
pub const MSG_TEST_SUBMITTED: &str = "Load test has been submitted";
pub const MSG_TEST_FAILED: &str = "Load test did not run with msg";
pub const MSG_RESULT_FETCHED: &str = "fetched the data.";
pub const MSG_DISCONNECTED: &str = "Connection to the server got disconnected. Load test might be running in the background. Please check the results page in a few.";
pub const MSG_BOARDS_UNAVAILABLE: &str = "Unable to fetch pre-configured boards: No Kubernetes cluster is connected, so statistics will not be gathered from cluster";
pub const MSG_MESHES_UNAVAILABLE: &str = "unable to fetch SMP meshes";
