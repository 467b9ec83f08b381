//! OpenAPI document for the REST facade.

use utoipa::OpenApi;

use super::dto::{ControlResponse, StatusResponse};
use super::handlers::system::HealthResponse;
use crate::error::ErrorResponse;

/// OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "relay-hub", description = "Device/dashboard relay hub REST facade"),
    paths(
        super::handlers::status::get_status,
        super::handlers::control::control_actuator,
        super::handlers::system::health_handler,
    ),
    components(schemas(StatusResponse, ControlResponse, HealthResponse, ErrorResponse))
)]
pub struct ApiDoc;
