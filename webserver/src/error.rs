//! WebServer-specific error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use enricher::EnrichError;
use shared::SharedError;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("HTTP server startup failed on {address}: {message}")]
    ServerStartup { address: String, message: String },

    #[error("Record not found: {id}")]
    RecordNotFound { id: u64 },

    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error("{0}")]
    Enrich(#[from] EnrichError),

    #[error("{0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WebServerResult<T> = Result<T, WebServerError>;

impl WebServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebServerError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
            WebServerError::InvalidRequest { .. } | WebServerError::Shared(_) => StatusCode::BAD_REQUEST,
            WebServerError::Enrich(EnrichError::InvalidSubject(_) | EnrichError::Shared(_)) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
