//! Hub status handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::StatusResponse;
use crate::app_state::AppState;

/// `GET /api/status` — Current sensors, actuators and device count.
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Hub",
    summary = "Current hub state",
    description = "Returns the latest sensor reading, every actuator value and the number of registered devices.",
    responses(
        (status = 200, description = "Hub state", body = StatusResponse),
    )
)]
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse::from(state.router.status().await))
}

/// Status routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::domain::ConnectionId;
    use crate::ws::connection::ConnectionSettings;
    use crate::{build_app, build_state};

    #[tokio::test]
    async fn status_reports_cold_state_and_device_count() {
        let state = build_state(ConnectionSettings::default());
        state
            .router
            .registry()
            .register_device(ConnectionId::new(), Some("dev1"))
            .await;

        let Ok(request) = Request::builder().uri("/api/status").body(Body::empty()) else {
            panic!("bad request");
        };
        let Ok(response) = build_app(state).oneshot(request).await;
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let body: Value = serde_json::from_slice(&bytes).unwrap_or_default();

        assert_eq!(body.get("connected_devices"), Some(&json!(1)));
        assert_eq!(
            body.get("actuators"),
            Some(&json!({"led": false, "relay": false, "servo_angle": 0}))
        );
        assert_eq!(
            body.get("sensors"),
            Some(&json!({"temperature": 0.0, "humidity": 0.0, "light": 0.0, "last_update": null}))
        );
    }
}
