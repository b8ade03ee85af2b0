//! Typed calls against the Meshery backend
use crate::error::ClientError;
use meshperf_core::{
    endpoints, ClientConfig, ControlPlane, LoadTestPrefs, PerformanceProfile, ProfilePage,
    RunRequest, SmpMeshes, StaticBoardConfig, UserPrefs,
};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, trace};

const CONTROL_PLANES_QUERY: &str = r#"query ControlPlanesQuery($filter: ServiceMeshFilter) {
  controlPlanesState(filter: $filter) {
    name
    members {
      name
      version
      component
      namespace
    }
  }
}"#;

/// Thin HTTP client for the endpoints a load test touches.
///
/// Plain calls carry the configured request timeout. The run stream does not, as it stays open
/// for the whole load test.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn get(&self, url: url::Url) -> RequestBuilder {
        self.http.get(url).timeout(self.config.request_timeout)
    }

    #[instrument(skip_all, fields(name = %profile.name, id = ?profile.id))]
    pub async fn save_profile(
        &self,
        profile: &PerformanceProfile,
    ) -> Result<PerformanceProfile, ClientError> {
        let res = self
            .http
            .post(endpoints::profiles(&self.config.server))
            .timeout(self.config.request_timeout)
            .json(profile)
            .send()
            .await?;
        decode(res).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_profile(&self, id: &str) -> Result<PerformanceProfile, ClientError> {
        let res = self
            .get(endpoints::profile(&self.config.server, id))
            .send()
            .await?;
        decode(res).await
    }

    #[instrument(skip(self))]
    pub async fn list_profiles(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<ProfilePage, ClientError> {
        let res = self
            .get(endpoints::profiles(&self.config.server))
            .query(&[("page", page), ("pagesize", page_size)])
            .send()
            .await?;
        decode(res).await
    }

    /// The user's saved load test defaults, if any were saved.
    #[instrument(skip(self))]
    pub async fn load_test_prefs(&self) -> Result<Option<LoadTestPrefs>, ClientError> {
        let url = endpoints::user_prefs(&self.config.server, &self.config.contexts);
        let prefs: UserPrefs = decode(self.get(url).send().await?).await?;
        Ok(prefs.load_test_prefs)
    }

    #[instrument(skip(self))]
    pub async fn static_board(&self) -> Result<StaticBoardConfig, ClientError> {
        let res = self
            .get(endpoints::static_board(&self.config.server))
            .send()
            .await?;
        decode(res).await
    }

    #[instrument(skip(self))]
    pub async fn smp_meshes(&self) -> Result<Vec<String>, ClientError> {
        let res = self
            .get(endpoints::smp_meshes(&self.config.server))
            .send()
            .await?;
        let meshes: SmpMeshes = decode(res).await?;
        Ok(meshes.available_meshes)
    }

    /// Control planes of every mesh found on the configured clusters.
    #[instrument(skip(self))]
    pub async fn control_planes(&self) -> Result<Vec<ControlPlane>, ClientError> {
        let body = json!({
            "query": CONTROL_PLANES_QUERY,
            "variables": {
                "filter": {
                    "type": "ALL_MESH",
                    "k8sClusterIDs": self.config.cluster_ids,
                }
            }
        });
        let res = self
            .http
            .post(endpoints::graphql(&self.config.server))
            .timeout(self.config.request_timeout)
            .json(&body)
            .send()
            .await?;

        let res: GraphQlResponse<ControlPlanesState> = decode(res).await?;
        if let Some(error) = res.errors.first() {
            return Err(ClientError::GraphQl(error.message.clone()));
        }
        res.data
            .map(|data| data.control_planes_state)
            .ok_or_else(|| ClientError::GraphQl("response carried no data".to_string()))
    }

    /// Raw result document of a completed run.
    #[instrument(skip(self))]
    pub async fn download_result(&self, result_id: &str) -> Result<Vec<u8>, ClientError> {
        let res = self
            .get(endpoints::result(&self.config.server, result_id))
            .send()
            .await?;
        let bytes = check(res).await?.bytes().await?;
        debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Start a run and return the open event stream response.
    #[instrument(skip(self, request), fields(uuid = ?request.get("uuid")))]
    pub async fn open_run_stream(
        &self,
        profile_id: &str,
        request: &RunRequest,
    ) -> Result<Response, ClientError> {
        let url = endpoints::run(
            &self.config.server,
            profile_id,
            &self.config.contexts,
            request,
        );
        trace!("GET {url}");
        let res = self
            .http
            .get(url)
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        check(res).await
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ControlPlanesState {
    #[serde(rename = "controlPlanesState", default)]
    control_planes_state: Vec<ControlPlane>,
}

async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        Ok(res)
    } else {
        let body = res.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let bytes = check(res).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
