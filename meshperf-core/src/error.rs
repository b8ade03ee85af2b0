use std::fmt;
use thiserror::Error;

/// A single form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("A target URL is required")]
    MissingUrl,

    #[error("Invalid target URL `{0}`: a scheme and host are required")]
    InvalidUrl(String),

    #[error("Invalid duration `{0}`: expected a positive number followed by h, m or s")]
    InvalidDuration(String),

    #[error("Additional options are not valid JSON")]
    InvalidJson,

    #[error("Unknown load generator `{0}`")]
    UnknownLoadGenerator(String),
}

/// Field errors currently attached to a form.
///
/// URL and duration errors block submission. A JSON error on the additional options only flags
/// the field; the raw text is still sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub url: Option<FieldError>,
    pub duration: Option<FieldError>,
    pub additional_options: Option<FieldError>,
}

impl FieldErrors {
    pub fn blocks_submission(&self) -> bool {
        self.url.is_some() || self.duration.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.duration.is_none() && self.additional_options.is_none()
    }

    fn iter(&self) -> impl Iterator<Item = &FieldError> {
        [&self.url, &self.duration, &self.additional_options]
            .into_iter()
            .flatten()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self.iter().map(ToString::to_string).collect();
        if messages.is_empty() {
            write!(f, "no field errors")
        } else {
            write!(f, "{}", messages.join("; "))
        }
    }
}

impl std::error::Error for FieldErrors {}

/// Errors raised while loading file inputs into a form.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Unable to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Only .{expected} files are supported, got `{path}`")]
    UnsupportedFile { path: String, expected: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server URL: {0}")]
    InvalidServer(#[from] url::ParseError),

    #[error("Unsupported server URL `{0}`: only http and https are allowed")]
    UnsupportedServer(String),
}
