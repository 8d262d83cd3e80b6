//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use super::dto::{LoginRequest, LoginResponse};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{
    hash_password, hash_password_with_cost, verify_password,
};
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};

/// The single operator account, with its password kept only as a bcrypt hash
#[derive(Debug, Clone)]
pub struct OperatorCredentials {
    pub username: String,
    password_hash: String,
}

impl OperatorCredentials {
    pub fn new(username: &str, password: &str) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self {
            username: username.to_string(),
            password_hash: hash_password(password)?,
        })
    }

    pub fn with_cost(username: &str, password: &str, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self {
            username: username.to_string(),
            password_hash: hash_password_with_cost(password, cost)?,
        })
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username
            && verify_password(password, &self.password_hash).unwrap_or(false)
    }
}

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub credentials: Arc<OperatorCredentials>,
    pub jwt_config: JwtConfig,
}

#[utoipa::path(
    post,
    path = "/security/authenticate",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn authenticate(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.credentials.matches(&request.user_name, &request.password) {
        warn!(user = %request.user_name, "Rejected login attempt");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid credentials")),
        ));
    }

    let token = create_token(&request.user_name, &state.jwt_config).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )
    })?;

    info!(user = %request.user_name, "Token issued");

    Ok(Json(LoginResponse {
        json_web_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expires_in(),
    }))
}
