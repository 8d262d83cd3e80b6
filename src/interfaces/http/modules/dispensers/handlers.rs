//! Dispenser API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use super::dto::{
    ChangeStatusRequest, CreateDispenserRequest, DispenserResponse, DispenserStateResponse,
    SpendingResponse, StatusChangedResponse,
};
use crate::application::DispenserService;
use crate::interfaces::http::common::{domain_error, ApiError, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct DispenserHandlerState {
    pub service: Arc<DispenserService>,
}

#[utoipa::path(
    post,
    path = "/dispenser",
    tag = "Dispensers",
    request_body = CreateDispenserRequest,
    responses(
        (status = 200, description = "Dispenser created", body = DispenserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Flow rate is not positive")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_dispenser(
    State(state): State<DispenserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateDispenserRequest>,
) -> Result<Json<DispenserResponse>, ApiError> {
    let dispenser = state
        .service
        .create(request.flow_rate)
        .await
        .map_err(domain_error)?;

    info!(dispenser_id = dispenser.id, operator = %user.username, "Dispenser registered");

    Ok(Json(dispenser.into()))
}

#[utoipa::path(
    put,
    path = "/dispenser/{id}/status",
    tag = "Dispensers",
    params(("id" = i32, Path, description = "Dispenser ID")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 202, description = "Status changed", body = StatusChangedResponse),
        (status = 404, description = "Dispenser not found"),
        (status = 409, description = "Tap already in the requested status, or not open yet")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_status(
    State(state): State<DispenserHandlerState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ChangeStatusRequest>,
) -> Result<(StatusCode, Json<StatusChangedResponse>), ApiError> {
    state
        .service
        .change_status(id, request.status, request.timestamp)
        .await
        .map_err(domain_error)?;

    Ok((StatusCode::ACCEPTED, Json(StatusChangedResponse::accepted())))
}

#[utoipa::path(
    get,
    path = "/dispenser/{id}/spending",
    tag = "Dispensers",
    params(("id" = i32, Path, description = "Dispenser ID")),
    responses(
        (status = 200, description = "Amount owed per session and in total", body = SpendingResponse),
        (status = 404, description = "Dispenser not found"),
        (status = 500, description = "Stored session timestamps are inconsistent")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_spending(
    State(state): State<DispenserHandlerState>,
    Path(id): Path<i32>,
) -> Result<Json<SpendingResponse>, ApiError> {
    let (dispenser, billing) = state.service.spending(id).await.map_err(domain_error)?;
    Ok(Json(SpendingResponse::from_billing(&dispenser, billing)))
}

#[utoipa::path(
    get,
    path = "/dispenser/{id}",
    tag = "Dispensers",
    params(("id" = i32, Path, description = "Dispenser ID")),
    responses(
        (status = 200, description = "Dispenser with its tap state", body = DispenserStateResponse),
        (status = 404, description = "Dispenser not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_dispenser(
    State(state): State<DispenserHandlerState>,
    Path(id): Path<i32>,
) -> Result<Json<DispenserStateResponse>, ApiError> {
    let (dispenser, tap_state) = state.service.state(id).await.map_err(domain_error)?;
    Ok(Json(DispenserStateResponse::new(dispenser, tap_state)))
}
