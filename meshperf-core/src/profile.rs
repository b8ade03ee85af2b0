use serde::{Deserialize, Serialize};

/// Saved, reusable load test configuration as exchanged with the backend.
///
/// `id` is assigned by the server on first save and sent back on every later save so the
/// backend updates the same record instead of creating another one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub load_generators: Vec<String>,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub service_mesh: String,
    #[serde(default)]
    pub concurrent_request: u32,
    #[serde(default)]
    pub qps: u32,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub request_headers: String,
    #[serde(default)]
    pub request_body: String,
    #[serde(default)]
    pub request_cookies: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub metadata: ProfileMetadata,

    // Server managed bookkeeping, never required on requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    #[serde(default)]
    pub additional_options: Vec<String>,
    #[serde(default)]
    pub ca_certificate: CaCertificate,
}

/// CA certificate uploaded with a profile. `file` holds the PEM text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaCertificate {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub name: String,
}

/// One page of `GET /api/user/performance/profiles`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePage {
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub page_size: u64,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub profiles: Vec<PerformanceProfile>,
}
