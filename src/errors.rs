use axum::http::StatusCode;
use thiserror::Error;

/// Failure contract of the remote entries/statistics API.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{url} failed: {status} {body}")]
    Network {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected payload from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl GatewayError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Network { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The API answers 404 when a range or date holds no data.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaneError {
    #[error("chart {0} is not mounted")]
    NotMounted(String),
    #[error("chart {id} rejected the axis update: {reason}")]
    Rejected { id: String, reason: String },
}

/// The one failure a user sees when saving an entry.
#[derive(Debug, Error)]
#[error("Error adding entry")]
pub struct SaveError {
    #[source]
    pub cause: GatewayError,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn upstream(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl From<SaveError> for AppError {
    fn from(err: SaveError) -> Self {
        Self::upstream(err)
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        Self::upstream(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
