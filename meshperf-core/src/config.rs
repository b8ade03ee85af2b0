use crate::constants::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_SERVER};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;
use url::Url;

/// Connection settings for a Meshery server.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server: Url,
    /// Kubernetes contexts every context-scoped request is made against.
    #[serde(default)]
    pub contexts: Vec<String>,
    /// Cluster ids handed to control plane discovery.
    #[serde(default)]
    pub cluster_ids: Vec<String>,
    /// Control plane discovery only runs against a configured cluster.
    #[serde(default)]
    pub cluster_configured: bool,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_timeout")]
    pub request_timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            contexts: vec![],
            cluster_ids: vec![],
            cluster_configured: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(server: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            server: parse_server(server)?,
            ..Default::default()
        })
    }
}

/// `DEFAULT_SERVER` is a constant http URL, so this never fails.
fn default_server() -> Url {
    parse_server(DEFAULT_SERVER).expect("DEFAULT_SERVER is a valid http URL")
}

/// Server URLs must be http(s) so routes can be appended to their path.
pub fn parse_server(server: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(server)?;
    match url.scheme() {
        "http" | "https" if !url.cannot_be_a_base() => Ok(url),
        _ => Err(ConfigError::UnsupportedServer(server.to_string())),
    }
}
