//! Run session state machine
//!
//! A [`Session`] owns the form and everything a run produces. Every transition goes through
//! [`Session::dispatch`], which returns the notifications the transition raised.
//!
//! ```text
//!  Idle ──submit──▶ Validating ──stream opened──▶ Streaming ──success──▶ ShowingResults
//!   ▲                   │                            │                       │
//!   └──invalid / save failed / disconnect / error────┘◀──────close results───┘
//! ```
use crate::board::StaticBoardConfig;
use crate::constants::{
    MSG_DISCONNECTED, MSG_PROFILE_SAVE_FAILED, MSG_RESULT_FETCHED, MSG_TEST_FAILED,
    MSG_TEST_SUBMITTED,
};
use crate::error::FieldErrors;
use crate::event::{StreamEvent, TestResult};
use crate::form::LoadTestForm;
use crate::generator::LoadGenerator;
use crate::mesh::MeshOptions;
use crate::naming::{generate_test_name, generate_uuid};
use crate::notification::Notification;
use crate::profile::PerformanceProfile;
use crate::run::RunRequest;
use crate::validation::TestDuration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Form accepted, profile being saved and channel being opened.
    Validating,
    /// Push channel open. `announced` flips on the first info event.
    Streaming { announced: bool },
    ShowingResults,
}

impl Phase {
    pub fn submit_enabled(&self) -> bool {
        matches!(self, Phase::Idle | Phase::ShowingResults)
    }

    /// "Test is running" indicator.
    pub fn running(&self) -> bool {
        matches!(self, Phase::Streaming { announced: true })
    }

    pub fn results_visible(&self) -> bool {
        matches!(self, Phase::ShowingResults)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Validating | Phase::Streaming { .. })
    }
}

/// Inputs of the session state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMessage {
    ProfileSaved(PerformanceProfile),
    ProfileSaveFailed(String),
    StreamOpened,
    Event(StreamEvent),
    /// Transport failure or end of stream before a terminal event.
    Disconnected(String),
    CloseResults,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("A load test is already in progress")]
    Busy,

    #[error("{0}")]
    Invalid(#[from] FieldErrors),
}

/// What the caller has to do to get a validated submission running.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Profile to save first; `None` when the form is already backed by a saved profile.
    pub profile: Option<PerformanceProfile>,
    pub duration: TestDuration,
}

/// Snapshot of the last successful load test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestRecord {
    pub test_name: String,
    pub mesh_name: String,
    pub url: String,
    pub qps: String,
    pub c: String,
    pub t: String,
    pub load_generator: LoadGenerator,
    pub result: TestResult,
}

#[derive(Debug, Clone)]
pub struct Session {
    form: LoadTestForm,
    phase: Phase,
    test_uuid: Uuid,
    result: Option<TestResult>,
    last_load_test: Option<LoadTestRecord>,
    static_board: Option<StaticBoardConfig>,
    meshes: MeshOptions,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(LoadTestForm::default())
    }
}

impl Session {
    pub fn new(form: LoadTestForm) -> Self {
        Self {
            form,
            phase: Phase::Idle,
            test_uuid: generate_uuid(),
            result: None,
            last_load_test: None,
            static_board: None,
            meshes: MeshOptions::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn form(&self) -> &LoadTestForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LoadTestForm {
        &mut self.form
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.form.profile_id.as_deref()
    }

    /// Correlation token of the next (or current) run.
    pub fn test_uuid(&self) -> Uuid {
        self.test_uuid
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn last_load_test(&self) -> Option<&LoadTestRecord> {
        self.last_load_test.as_ref()
    }

    pub fn meshes(&self) -> &MeshOptions {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut MeshOptions {
        &mut self.meshes
    }

    pub fn has_static_board(&self) -> bool {
        self.static_board.is_some()
    }

    /// Keep a fetched board config if it is complete. Returns whether it was kept.
    pub fn set_static_board(&mut self, boards: StaticBoardConfig) -> bool {
        if boards.is_complete() {
            self.static_board = Some(boards);
            true
        } else {
            debug!("Ignoring static board config without panels");
            false
        }
    }

    /// Boards to render next to the results, tagged with the current run token.
    pub fn static_board(&self) -> Option<StaticBoardConfig> {
        self.static_board
            .as_ref()
            .map(|boards| boards.for_run(self.test_uuid))
    }

    /// Validate the form and move to `Validating`.
    ///
    /// Nothing changes besides the form's field errors when validation fails, so no network
    /// call must follow an `Err`.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        if !self.phase.submit_enabled() {
            return Err(SubmitError::Busy);
        }

        let duration = self.form.validate()?;
        let profile = match self.form.profile_id {
            Some(_) => None,
            None => Some(self.form.profile()),
        };

        self.phase = Phase::Validating;
        Ok(Submission { profile, duration })
    }

    /// Build the run request for the current form, fixing the test name for later runs.
    pub fn run_request(&mut self, duration: TestDuration) -> RunRequest {
        let name = generate_test_name(&self.form.test_name, &self.form.mesh);
        self.form.test_name = name.clone();
        RunRequest::new(&self.form, &name, duration, self.test_uuid)
    }

    /// Clear the form and forget the saved profile. Results are kept.
    pub fn reset(&mut self) {
        self.form.reset();
    }

    pub fn dispatch(&mut self, message: SessionMessage) -> Vec<Notification> {
        trace!("{:?} <- {:?}", self.phase, message);
        match message {
            SessionMessage::ProfileSaved(profile) => {
                if profile.id.is_some() {
                    self.form.profile_id = profile.id.clone();
                }
                vec![Notification::success(format!(
                    "Performance profile {} has been created",
                    profile.name
                ))]
            }
            SessionMessage::ProfileSaveFailed(details) => {
                if self.phase == Phase::Validating {
                    self.phase = Phase::Idle;
                }
                vec![Notification::error(MSG_PROFILE_SAVE_FAILED).with_details(details)]
            }
            SessionMessage::StreamOpened => {
                self.phase = Phase::Streaming { announced: false };
                vec![Notification::success(MSG_TEST_SUBMITTED)]
            }
            SessionMessage::Event(event) => self.on_event(event),
            SessionMessage::Disconnected(details) => {
                if !self.phase.is_active() {
                    debug!("Ignoring disconnect outside of a run: {details}");
                    return vec![];
                }
                self.phase = Phase::Idle;
                vec![Notification::warning(MSG_DISCONNECTED).with_details(details)]
            }
            SessionMessage::CloseResults => {
                if self.phase == Phase::ShowingResults {
                    self.phase = Phase::Idle;
                }
                vec![]
            }
        }
    }

    fn on_event(&mut self, event: StreamEvent) -> Vec<Notification> {
        let Phase::Streaming { announced } = self.phase else {
            debug!("Dropping {} event outside of a run", event.status());
            return vec![];
        };

        match event {
            StreamEvent::Info { message } => {
                if !announced {
                    info!("Load test {} is running", self.test_uuid);
                    self.phase = Phase::Streaming { announced: true };
                }
                vec![Notification::info(message)]
            }
            StreamEvent::Error { message } => {
                self.phase = Phase::Idle;
                vec![Notification::error(format!("{MSG_TEST_FAILED}: {message}")).with_details(message)]
            }
            StreamEvent::Success {
                result: Some(result),
            } if result.has_runner_results() => {
                self.last_load_test = Some(LoadTestRecord {
                    test_name: self.form.test_name.clone(),
                    mesh_name: self.form.mesh.clone(),
                    url: self.form.url.clone(),
                    qps: self.form.qps.clone(),
                    c: self.form.concurrency.clone(),
                    t: self.form.duration.clone(),
                    load_generator: self.form.load_generator,
                    result: result.clone(),
                });
                self.result = Some(result);
                self.test_uuid = generate_uuid();
                self.phase = Phase::ShowingResults;
                vec![Notification::success(MSG_RESULT_FETCHED)]
            }
            StreamEvent::Success { .. } => {
                warn!("Load test finished without runner results");
                self.phase = Phase::Idle;
                vec![]
            }
        }
    }
}
