use std::convert::Infallible;

use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{reject::Reject, Rejection, Reply};

/// Outcome of a single completion attempt that did not yield a reply.
///
/// The `Display` text is what ends up in front of the user, prefixed with
/// the assistant name by [`CompletionError::render`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("AI backend not configured. Please set AI_API_URL and AI_API_KEY.")]
    ConfigMissing,

    #[error("AI server timeout. Try again shortly.")]
    Timeout,

    #[error("AI error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("AI request failed: {0}")]
    Transport(String),

    #[error("AI responded unexpectedly.")]
    UnexpectedShape,
}

impl CompletionError {
    pub fn render(&self, assistant_name: &str) -> String {
        format!("{}: {}", assistant_name, self)
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::ConfigMissing => "config_missing",
            CompletionError::Timeout => "timeout",
            CompletionError::Upstream { .. } => "upstream_error",
            CompletionError::Transport(_) => "transport_error",
            CompletionError::UnexpectedShape => "unexpected_shape",
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout
        } else {
            CompletionError::Transport(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl Reject for ApiError {}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message, details) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Resource not found", "no route".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "Bad request", e.to_string())
    } else if let Some(e) = err.find::<warp::reject::UnsupportedMediaType>() {
        (StatusCode::BAD_REQUEST, "Bad request", e.to_string())
    } else if let Some(e) = err.find::<warp::reject::LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, "Length required", e.to_string())
    } else if let Some(e) = err.find::<warp::reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large", e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", "method not allowed".to_string())
    } else if let Some(e) = err.find::<warp::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, "Forbidden", e.to_string())
    } else if let Some(api_err) = err.find::<ApiError>() {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", api_err.to_string())
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", format!("{:?}", err))
    };

    let json = warp::reply::json(&serde_json::json!({
        "error": message,
        "details": details,
    }));

    Ok(warp::reply::with_status(json, code))
}
