use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by credential handling, token grants, and API calls.
///
/// Every operation in this crate returns `Result<T, Error>`; operations
/// differ only in whether a failure is additionally reported through the
/// log (token grants and generic dispatch) or carried solely in the
/// returned value (redirect registration and profile fetch).
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("token endpoint error {status}: {body}")]
    TokenEndpoint { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("partner token acquisition failed: {0}")]
    AuthBootstrap(#[source] Box<Error>),
    #[error("invalid base URI: {0}")]
    BaseUri(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
