//! Actuator control handler.
//!
//! Thin facade over [`crate::service::CommandDispatcher`]: the value is
//! typed, committed and forwarded to the device room exactly as a
//! `control_actuator` event would be.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::ControlResponse;
use crate::app_state::AppState;
use crate::error::HubError;

/// `GET /api/control/{actuator}/{value}` — Set an actuator.
///
/// # Errors
///
/// Returns [`HubError::Validation`] if `value` does not parse for the
/// actuator. The error is rendered as a 200 response with
/// `{status:"error", message}`.
#[utoipa::path(
    get,
    path = "/api/control/{actuator}/{value}",
    tag = "Hub",
    summary = "Set an actuator",
    description = "Types the value for the actuator (`led`/`relay` take booleans, `servo_angle` an integer, anything else is stored verbatim), stores it and sends an `actuator_command` to every device.",
    params(
        ("actuator" = String, Path, description = "Actuator name"),
        ("value" = String, Path, description = "Requested value"),
    ),
    responses(
        (status = 200, description = "Command committed; a rejected value yields `ErrorResponse` with the same status", body = ControlResponse),
    )
)]
pub async fn control_actuator(
    State(state): State<AppState>,
    Path((actuator, value)): Path<(String, String)>,
) -> Result<impl IntoResponse, HubError> {
    let command = state
        .router
        .control(&actuator, serde_json::Value::String(value))
        .await?;
    Ok(Json(ControlResponse::from(command)))
}

/// Control routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/control/{actuator}/{value}", get(control_actuator))
}
