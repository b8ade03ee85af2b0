use meshperf_core::{ConfigError, FieldErrors, SubmitError};
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Unable to decode response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GraphQL query failed: {0}")]
    GraphQl(String),
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("Invalid form: {0}")]
    Invalid(#[from] FieldErrors),

    #[error("Server did not assign an id to the saved profile.")]
    MissingProfileId,

    #[error("No result with an identifier has been fetched yet.")]
    NoResult,

    #[error("Push channel closed unexpectedly.")]
    ChannelClosed,
}
