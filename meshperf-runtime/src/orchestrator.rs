//! Load test orchestration
//!
//! The [`Orchestrator`] performs the network side of every session transition: it saves the
//! profile, opens the run stream and feeds stream messages back into the [`Session`]. Session
//! state is only ever mutated here, one message at a time.
use crate::channel::{ChannelMessage, ChannelSlot, PushChannel};
use crate::{ApiClient, RuntimeError};
use meshperf_core::{
    endpoints, LoadTestForm, Notification, Notify, PerformanceProfile, Phase, ProfilePage,
    Session, SessionMessage, StreamEvent, TestResult, MSG_BOARDS_UNAVAILABLE,
    MSG_MESHES_UNAVAILABLE,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// How a followed run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(TestResult),
    /// The backend reported success without runner results.
    NoResults,
    /// The backend reported an error.
    Failed(String),
    /// The stream dropped before a terminal event.
    Disconnected(String),
}

pub struct Orchestrator {
    client: ApiClient,
    session: Session,
    slot: ChannelSlot,
    notifier: Arc<dyn Notify>,
    outcome: Option<RunOutcome>,
}

impl Orchestrator {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notify>) -> Self {
        Self {
            client,
            session: Session::default(),
            slot: ChannelSlot::new(),
            notifier,
            outcome: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn form_mut(&mut self) -> &mut LoadTestForm {
        self.session.form_mut()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn is_streaming(&self) -> bool {
        self.slot.is_open()
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(&notification);
    }

    fn apply(&mut self, message: SessionMessage) {
        for notification in self.session.dispatch(message) {
            self.notify(notification);
        }
    }

    /// Load user preferences, static boards and mesh options. Failures only raise warnings.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self) {
        self.load_prefs().await;
        self.load_static_board().await;
        self.load_meshes().await;
    }

    pub async fn load_prefs(&mut self) {
        match self.client.load_test_prefs().await {
            Ok(Some(prefs)) => {
                debug!("Applying load test preferences {prefs:?}");
                self.session.form_mut().apply_prefs(&prefs);
            }
            Ok(None) => debug!("No load test preferences saved"),
            Err(err) => warn!("Unable to fetch load test preferences: {err}"),
        }
    }

    /// Fetch the static boards unless a usable config is already held.
    pub async fn load_static_board(&mut self) {
        if self.session.has_static_board() {
            return;
        }
        match self.client.static_board().await {
            Ok(boards) => {
                self.session.set_static_board(boards);
            }
            Err(err) => self.notify(
                Notification::warning(MSG_BOARDS_UNAVAILABLE).with_details(err.to_string()),
            ),
        }
    }

    pub async fn load_meshes(&mut self) {
        if self.client.config().cluster_configured {
            match self.client.control_planes().await {
                Ok(planes) => self.session.meshes_mut().set_control_planes(&planes),
                Err(err) => error!("Unable to fetch control planes: {err}"),
            }
        }

        match self.client.smp_meshes().await {
            Ok(meshes) => self.session.meshes_mut().set_smp_meshes(meshes),
            Err(err) => self.notify(
                Notification::error(MSG_MESHES_UNAVAILABLE).with_details(err.to_string()),
            ),
        }
    }

    /// Replace the form with a saved profile.
    #[instrument(skip(self))]
    pub async fn load_profile(&mut self, id: &str) -> Result<(), RuntimeError> {
        let profile = self.client.fetch_profile(id).await?;
        *self.session.form_mut() = LoadTestForm::from_profile(&profile);
        Ok(())
    }

    pub async fn list_profiles(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<ProfilePage, RuntimeError> {
        Ok(self.client.list_profiles(page, page_size).await?)
    }

    /// Validate the form and save it as a performance profile without running it.
    #[instrument(skip_all)]
    pub async fn save_profile(&mut self) -> Result<PerformanceProfile, RuntimeError> {
        if let Err(errors) = self.session.form_mut().validate() {
            warn!("Profile not saved: {errors}");
            return Err(errors.into());
        }
        let profile = self.session.form().profile();
        self.persist(profile).await
    }

    async fn persist(
        &mut self,
        profile: PerformanceProfile,
    ) -> Result<PerformanceProfile, RuntimeError> {
        match self.client.save_profile(&profile).await {
            Ok(saved) => {
                #[cfg(feature = "metrics")]
                metrics::counter!("meshperf.profile.saved").increment(1);
                self.apply(SessionMessage::ProfileSaved(saved.clone()));
                Ok(saved)
            }
            Err(err) => {
                self.apply(SessionMessage::ProfileSaveFailed(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Validate the form, save it when it has no profile yet and open the run stream.
    ///
    /// Nothing is sent when validation fails. Any previous push channel is closed before the
    /// run request goes out.
    #[instrument(skip_all)]
    pub async fn submit(&mut self) -> Result<(), RuntimeError> {
        let submission = match self.session.begin_submit() {
            Ok(submission) => submission,
            Err(err) => {
                warn!("Load test not submitted: {err}");
                return Err(err.into());
            }
        };

        if let Some(profile) = submission.profile {
            self.persist(profile).await?;
        }
        let Some(profile_id) = self.session.profile_id().map(str::to_string) else {
            self.apply(SessionMessage::ProfileSaveFailed(
                RuntimeError::MissingProfileId.to_string(),
            ));
            return Err(RuntimeError::MissingProfileId);
        };

        let request = self.session.run_request(submission.duration);
        self.slot.close().await;
        self.outcome = None;

        let response = match self.client.open_run_stream(&profile_id, &request).await {
            Ok(response) => response,
            Err(err) => {
                self.apply(SessionMessage::Disconnected(err.to_string()));
                return Err(err.into());
            }
        };

        info!(
            "Started load test {} of profile {profile_id}",
            self.session.test_uuid()
        );
        #[cfg(feature = "metrics")]
        metrics::counter!("meshperf.run.started").increment(1);

        self.slot
            .replace(PushChannel::open(response.bytes_stream()))
            .await;
        self.apply(SessionMessage::StreamOpened);
        Ok(())
    }

    /// Apply the next message of the open run stream. `None` when no stream is open.
    ///
    /// The stream is closed as soon as the run leaves the active phases.
    pub async fn next_update(&mut self) -> Option<Phase> {
        if !self.slot.is_open() {
            return None;
        }

        let message = match self.slot.recv().await.unwrap_or(ChannelMessage::Closed) {
            ChannelMessage::Event(event) => {
                #[cfg(feature = "metrics")]
                metrics::counter!("meshperf.run.events", "status" => event.status())
                    .increment(1);
                SessionMessage::Event(event)
            }
            ChannelMessage::TransportError(err) => SessionMessage::Disconnected(err),
            ChannelMessage::Closed => SessionMessage::Disconnected(
                "stream ended before the load test finished".to_string(),
            ),
        };

        let outcome = match &message {
            SessionMessage::Event(StreamEvent::Error { message }) => {
                Some(RunOutcome::Failed(message.clone()))
            }
            SessionMessage::Disconnected(details) => {
                Some(RunOutcome::Disconnected(details.clone()))
            }
            _ => None,
        };
        self.apply(message);

        let phase = self.session.phase();
        if !phase.is_active() {
            self.slot.close().await;
            self.outcome = match (phase, outcome) {
                (Phase::ShowingResults, _) => {
                    self.session.result().cloned().map(RunOutcome::Completed)
                }
                (_, Some(outcome)) => Some(outcome),
                _ => Some(RunOutcome::NoResults),
            };
        }
        Some(phase)
    }

    /// Submit and follow the run until it ends.
    #[instrument(skip_all)]
    pub async fn run(&mut self) -> Result<RunOutcome, RuntimeError> {
        self.submit().await?;
        while let Some(phase) = self.next_update().await {
            if !phase.is_active() {
                break;
            }
        }
        self.outcome.take().ok_or(RuntimeError::ChannelClosed)
    }

    pub fn close_results(&mut self) {
        self.apply(SessionMessage::CloseResults);
    }

    /// Clear the form. The open stream and stored results are left alone.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Download link of the current result.
    pub fn result_url(&self) -> Option<Url> {
        let id = self.session.result()?.meshery_id.as_deref()?;
        Some(endpoints::result(&self.client.config().server, id))
    }

    pub async fn download_result(&self) -> Result<Vec<u8>, RuntimeError> {
        let id = self
            .session
            .result()
            .and_then(|result| result.meshery_id.as_deref())
            .ok_or(RuntimeError::NoResult)?;
        Ok(self.client.download_result(id).await?)
    }
}
