//! HTTP request handlers for the PIT engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate;
use crate::config::{Policy, PolicyLoader, PolicyPreset};
use crate::error::EngineError;
use crate::models::CalculationInput;
use crate::session::CUSTOM_POLICY_ID;

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse, CalculationResponse, PolicySummary};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/policies", get(list_policies_handler))
        .route("/policies/:id", get(get_policy_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(err: EngineError) -> Response {
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a calculation request and returns the tax result wrapped in a
/// calculation envelope.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    // Handle JSON parsing errors
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    // Get the body text which contains the detailed error from serde
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    let start_time = Instant::now();
    match perform_calculation(request, state.policies()) {
        Ok(response) => {
            let duration = start_time.elapsed();
            info!(
                correlation_id = %correlation_id,
                policy = %response.policy_id,
                gross = %response.result.gross,
                net = %response.result.net,
                total_tax = %response.result.total_tax,
                duration_us = duration.as_micros(),
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            error_response(err)
        }
    }
}

/// Resolves the policy of a request: the inline policy if present, else
/// the requested preset, else the default preset.
fn resolve_policy(
    request: &mut CalculationRequest,
    policies: &PolicyLoader,
) -> Result<(String, Policy), EngineError> {
    if let Some(config) = request.custom_policy.take() {
        return Ok((CUSTOM_POLICY_ID.to_string(), Policy::new(config)?));
    }

    let id = request
        .policy
        .take()
        .unwrap_or_else(|| PolicyPreset::default().id().to_string());
    let policy = policies.get(&id)?.clone();
    Ok((id, policy))
}

/// Performs the tax calculation for a request.
fn perform_calculation(
    mut request: CalculationRequest,
    policies: &PolicyLoader,
) -> Result<CalculationResponse, EngineError> {
    let (policy_id, policy) = resolve_policy(&mut request, policies)?;

    let input: CalculationInput = request.into();
    input.validate()?;

    let result = calculate(&input, &policy)?;

    Ok(CalculationResponse {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        policy_id,
        policy_name: policy.name().to_string(),
        result,
    })
}

/// Handler for GET /policies endpoint.
///
/// Lists the ids and names of every loaded policy.
async fn list_policies_handler(State(state): State<AppState>) -> impl IntoResponse {
    let policies: Vec<PolicySummary> = state
        .policies()
        .policies()
        .map(|policy| PolicySummary {
            id: policy.id().to_string(),
            name: policy.name().to_string(),
        })
        .collect();
    json_response(StatusCode::OK, policies)
}

/// Handler for GET /policies/:id endpoint.
///
/// Returns the full configuration of one policy.
async fn get_policy_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.policies().get(&id) {
        Ok(policy) => json_response(StatusCode::OK, policy.config()),
        Err(err) => {
            warn!(policy = %id, "Policy not found");
            error_response(err)
        }
    }
}
