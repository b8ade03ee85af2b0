//! Load test form state and the profile payload built from it
use crate::constants::DEFAULT_TEST_DURATION;
use crate::error::{FieldErrors, FormError};
use crate::generator::LoadGenerator;
use crate::naming::generate_test_name;
use crate::prefs::LoadTestPrefs;
use crate::profile::{CaCertificate, PerformanceProfile, ProfileMetadata};
use crate::validation::{validate_additional_options, validate_url, TestDuration};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Form fields that can be set by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ProfileName,
    TestName,
    Mesh,
    Url,
    Qps,
    Concurrency,
    Duration,
    LoadGenerator,
    AdditionalOptions,
    Headers,
    Cookies,
    Body,
    ContentType,
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "profileName" | "profile_name" => Field::ProfileName,
            "testName" | "test_name" | "name" => Field::TestName,
            "meshName" | "mesh" => Field::Mesh,
            "url" => Field::Url,
            "qps" => Field::Qps,
            "c" | "concurrency" => Field::Concurrency,
            "t" | "duration" => Field::Duration,
            "loadGenerator" | "load_generator" | "gen" => Field::LoadGenerator,
            "additional_options" | "additionalOptions" => Field::AdditionalOptions,
            "headers" => Field::Headers,
            "cookies" => Field::Cookies,
            "reqBody" | "body" => Field::Body,
            "contentType" | "content_type" => Field::ContentType,
            other => return Err(format!("unknown form field `{other}`")),
        })
    }
}

/// Raw values of the load test form.
///
/// Numeric fields are kept as typed so the run request carries exactly what the user entered;
/// the profile payload coerces them to integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestForm {
    pub profile_name: String,
    pub test_name: String,
    pub mesh: String,
    pub url: String,
    pub qps: String,
    pub concurrency: String,
    pub duration: String,
    pub load_generator: LoadGenerator,
    pub additional_options: String,
    pub headers: String,
    pub cookies: String,
    pub body: String,
    pub content_type: String,
    #[serde(default)]
    pub ca_certificate: CaCertificate,
    /// Identifier of the saved profile backing this form, once known.
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(skip)]
    errors: FieldErrors,
}

impl Default for LoadTestForm {
    fn default() -> Self {
        Self {
            profile_name: String::new(),
            test_name: String::new(),
            mesh: String::new(),
            url: String::new(),
            qps: "0".to_string(),
            concurrency: "0".to_string(),
            duration: DEFAULT_TEST_DURATION.to_string(),
            load_generator: LoadGenerator::default(),
            additional_options: String::new(),
            headers: String::new(),
            cookies: String::new(),
            body: String::new(),
            content_type: String::new(),
            ca_certificate: CaCertificate::default(),
            profile_id: None,
            errors: FieldErrors::default(),
        }
    }
}

impl LoadTestForm {
    pub fn new(url: &str) -> Self {
        let mut form = Self::default();
        form.set(Field::Url, url);
        form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Update a single field, refreshing the field level error it owns.
    pub fn set(&mut self, field: Field, value: &str) {
        let value = value.to_string();
        match field {
            Field::ProfileName => self.profile_name = value,
            Field::TestName => self.test_name = value,
            Field::Mesh => self.mesh = value,
            Field::Url => {
                self.errors.url = match value.as_str() {
                    "" => None,
                    v => validate_url(v).err(),
                };
                self.url = value;
            }
            Field::Qps => self.qps = value,
            Field::Concurrency => self.concurrency = value,
            Field::Duration => {
                self.errors.duration = None;
                self.duration = value;
            }
            Field::LoadGenerator => match value.parse() {
                Ok(generator) => self.load_generator = generator,
                Err(err) => warn!("Ignoring load generator: {err}"),
            },
            Field::AdditionalOptions => {
                self.errors.additional_options = validate_additional_options(&value).err();
                self.additional_options = value;
            }
            Field::Headers => self.headers = value,
            Field::Cookies => self.cookies = value,
            Field::Body => self.body = value,
            Field::ContentType => self.content_type = value,
        }
    }

    /// Validate everything that blocks a run and record the resulting field errors.
    pub fn validate(&mut self) -> Result<TestDuration, FieldErrors> {
        self.errors.url = validate_url(&self.url).err();
        self.errors.additional_options =
            validate_additional_options(&self.additional_options).err();

        let duration = TestDuration::from_str(&self.duration);
        self.errors.duration = duration.as_ref().err().cloned();

        match duration {
            Ok(duration) if !self.errors.blocks_submission() => Ok(duration),
            _ => {
                debug!("Form rejected: {}", self.errors);
                Err(self.errors.clone())
            }
        }
    }

    /// Profile payload for the current form values.
    pub fn profile(&self) -> PerformanceProfile {
        PerformanceProfile {
            id: self.profile_id.clone(),
            name: generate_test_name(&self.profile_name, &self.mesh),
            load_generators: vec![self.load_generator.to_string()],
            endpoints: vec![self.url.clone()],
            service_mesh: self.mesh.clone(),
            concurrent_request: numeric_field(&self.concurrency),
            qps: numeric_field(&self.qps),
            duration: self.duration.clone(),
            request_headers: self.headers.clone(),
            request_body: self.body.clone(),
            request_cookies: self.cookies.clone(),
            content_type: self.content_type.clone(),
            metadata: ProfileMetadata {
                additional_options: vec![self.additional_options.clone()],
                ca_certificate: self.ca_certificate.clone(),
            },
            ..Default::default()
        }
    }

    /// Populate the form from a saved profile, e.g. when editing it.
    pub fn from_profile(profile: &PerformanceProfile) -> Self {
        let mut form = Self::new(profile.endpoints.first().map_or("", String::as_str));
        form.profile_id = profile.id.clone();
        form.profile_name = profile.name.clone();
        form.mesh = profile.service_mesh.clone();
        form.qps = profile.qps.to_string();
        form.concurrency = profile.concurrent_request.to_string();
        if !profile.duration.is_empty() {
            form.duration = profile.duration.clone();
        }
        if let Some(generator) = profile.load_generators.first() {
            form.set(Field::LoadGenerator, generator);
        }
        if let Some(options) = profile.metadata.additional_options.first() {
            form.set(Field::AdditionalOptions, options);
        }
        form.headers = profile.request_headers.clone();
        form.cookies = profile.request_cookies.clone();
        form.body = profile.request_body.clone();
        form.content_type = profile.content_type.clone();
        form.ca_certificate = profile.metadata.ca_certificate.clone();
        form
    }

    /// Apply the user's saved load test defaults.
    pub fn apply_prefs(&mut self, prefs: &LoadTestPrefs) {
        self.qps = prefs.qps.to_string();
        self.concurrency = prefs.c.to_string();
        if !prefs.t.is_empty() {
            self.set(Field::Duration, &prefs.t);
        }
        if !prefs.gen.is_empty() {
            self.set(Field::LoadGenerator, &prefs.gen);
        }
    }

    /// Clear every field and forget the backing profile.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Load additional options from a `.json` file. Invalid JSON is kept and flagged.
    pub fn load_additional_options(&mut self, path: impl AsRef<Path>) -> Result<(), FormError> {
        let contents = read_input(path.as_ref(), "json")?;
        self.set(Field::AdditionalOptions, &contents);
        Ok(())
    }

    /// Attach a `.crt` CA certificate.
    pub fn load_ca_certificate(&mut self, path: impl AsRef<Path>) -> Result<(), FormError> {
        let path = path.as_ref();
        let file = read_input(path, "crt")?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ca_certificate = CaCertificate { file, name };
        Ok(())
    }
}

/// Non-numeric input counts as zero.
fn numeric_field(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

fn read_input(path: &Path, expected: &'static str) -> Result<String, FormError> {
    let display = path.display().to_string();
    let supported = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected));
    if !supported {
        return Err(FormError::UnsupportedFile {
            path: display,
            expected,
        });
    }

    std::fs::read_to_string(path).map_err(|source| FormError::Io {
        path: display,
        source,
    })
}
