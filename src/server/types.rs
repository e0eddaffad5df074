use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures surfaced by the HTTP layer itself. Pipeline failures never
/// reach here; they are already folded into fallback payloads.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Transport(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                warn!("Rejected request: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse { error: message }),
                )
                    .into_response()
            }
            Self::Transport(cause) => {
                error!("Transport error: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
