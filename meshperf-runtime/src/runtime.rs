//! Runtime configuration
//!
//! [`MeshperfRuntime`] collects the backend connection settings and the notification sink, and
//! builds the [`Orchestrator`] that drives load tests.
use crate::{error::RuntimeError, orchestrator::Orchestrator, ApiClient};
use clap::Parser;
use meshperf_core::{parse_server, ClientConfig, Notify, TracingNotifier, DEFAULT_SERVER};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Parser, Debug)]
#[command(version, about = "Run performance profiles against a Meshery server")]
pub struct MeshperfCli {
    /// Meshery server to talk to.
    #[arg(short, long, env = "MESHERY_SERVER", default_value = DEFAULT_SERVER, value_parser = parse_server)]
    pub server: Url,

    /// Kubernetes context to run against. Repeat for several.
    #[arg(short = 'x', long = "context")]
    pub contexts: Vec<String>,

    /// Timeout of plain API calls, e.g. `10s` or `1m 30s`.
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Discover mesh control planes on the connected cluster.
    #[arg(long)]
    pub cluster_configured: bool,

    /// Cluster ids used for control plane discovery.
    #[arg(long = "cluster-id")]
    pub cluster_ids: Vec<String>,
}

/// Default meshperf runtime. (requires `rt` feature)
///
/// # Example
///
/// ```ignore
/// use meshperf::prelude::*;
///
/// #[tokio::main]
/// async fn main() {
///     let mut orchestrator = MeshperfRuntime::new()
///         .with_args()
///         .build()
///         .expect("valid client configuration");
///     orchestrator.refresh().await;
/// }
/// ```
pub struct MeshperfRuntime {
    config: ClientConfig,
    notifier: Arc<dyn Notify>,
}

impl Default for MeshperfRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshperfRuntime {
    pub fn new() -> Self {
        MeshperfRuntime {
            config: ClientConfig::default(),
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Use the default CLI arguments.
    ///
    /// `-s`, `--server` for the Meshery server (default `http://localhost:9081`, env `MESHERY_SERVER`)
    ///
    /// `-x`, `--context` to scope requests to a Kubernetes context
    ///
    /// `--timeout` for API calls, `--cluster-configured` and `--cluster-id` for mesh discovery
    ///
    /// # Example
    /// ```ignore
    /// $ ./run-profile -s http://meshery.local:9081 -x ctx-a -x ctx-b
    /// $ ./run-profile --timeout 1m --cluster-configured --cluster-id c1
    /// ```
    pub fn with_args(self) -> Self {
        self.with_cli(MeshperfCli::parse())
    }

    pub fn with_cli(mut self, args: MeshperfCli) -> Self {
        debug!("Runtime arguments: {args:?}");
        self.config.server = args.server;
        self.config.contexts = args.contexts;
        self.config.request_timeout = args.timeout;
        self.config.cluster_configured = args.cluster_configured || !args.cluster_ids.is_empty();
        self.config.cluster_ids = args.cluster_ids;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn server(mut self, server: Url) -> Self {
        self.config.server = server;
        self
    }

    pub fn context(mut self, context: &str) -> Self {
        self.config.contexts.push(context.to_string());
        self
    }

    /// Mark the cluster as configured and discover control planes on the given clusters.
    pub fn cluster(mut self, cluster_ids: &[String]) -> Self {
        self.config.cluster_configured = true;
        self.config.cluster_ids = cluster_ids.to_vec();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Where notifications go. Defaults to [`TracingNotifier`].
    pub fn notifier(mut self, notifier: impl Notify + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build(self) -> Result<Orchestrator, RuntimeError> {
        let client = ApiClient::new(self.config)?;
        Ok(Orchestrator::new(client, self.notifier))
    }
}
