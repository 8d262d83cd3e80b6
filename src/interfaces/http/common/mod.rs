//! Response envelope, error mapping and the validated JSON extractor

mod validated_json;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::{DomainError, ErrorKind};

pub use validated_json::ValidatedJson;

/// Standard API envelope.
///
/// Errors are always returned as `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::DataIntegrity | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
    }
}

/// Map a domain failure to its HTTP status and envelope.
pub fn domain_error(e: DomainError) -> ApiError {
    let kind = e.kind();
    match kind {
        ErrorKind::Conflict => warn!(error = %e, "Request rejected"),
        ErrorKind::DataIntegrity | ErrorKind::Internal => error!(error = %e, "Request failed"),
        _ => {}
    }
    (status_for(kind), Json(ApiResponse::error(e.to_string())))
}
