use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use shared_types::MISSING_URL_MESSAGE;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// The `url` parameter is missing, empty, or not a forwardable absolute URL.
    #[error("invalid proxy target: {0}")]
    InvalidProxyTarget(String),

    #[error("unreadable request body: {0}")]
    RequestBody(String),

    #[error("upstream {origin} timed out")]
    UpstreamTimeout { origin: String },

    #[error("upstream {origin} request failed: {source}")]
    UpstreamForwardingFailure {
        origin: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidProxyTarget(_) => StatusCode::BAD_REQUEST,
            GatewayError::RequestBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::UpstreamForwardingFailure { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn from_upstream(origin: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            GatewayError::UpstreamTimeout {
                origin: origin.to_string(),
            }
        } else {
            GatewayError::UpstreamForwardingFailure {
                origin: origin.to_string(),
                source,
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let message = match &self {
            GatewayError::InvalidProxyTarget(_) => MISSING_URL_MESSAGE,
            GatewayError::RequestBody(_) => "Invalid request body",
            GatewayError::UpstreamTimeout { .. } => "Upstream timed out",
            GatewayError::UpstreamForwardingFailure { .. } => "Upstream request failed",
        };
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}
