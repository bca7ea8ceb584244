//! HTTP request handlers for the Timesheet Overtime Allocation Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_timesheet;
use crate::error::EngineResult;
use crate::models::{Thresholds, TimesheetResult};

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a batch of pay profiles and returns their allocated hours and cost.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
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
                    warn!(correlation_id = %correlation_id, "Missing JSON content type");
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return json_error(ApiErrorResponse::bad_request(error));
        }
    };

    let show_id = request.show_id.clone();
    let submitted = request.profiles.len();

    match perform_calculation(&state, request) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                calculation_id = %result.calculation_id,
                show_id = show_id.as_deref().unwrap_or("-"),
                submitted,
                rejected = result.rejected.len(),
                total_cost = %result.totals.cost,
                duration_us = result.audit_trace.duration_us,
                "Calculation completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(result),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                code = err.code(),
                error = %err,
                "Calculation failed"
            );
            json_error(err.into())
        }
    }
}

/// Resolves the thresholds for the request and runs the batch calculation.
fn perform_calculation(state: &AppState, request: CalculationRequest) -> EngineResult<TimesheetResult> {
    let config = state.config();
    let thresholds = resolve_thresholds(state, &request)?;

    let rule_set = match request.show_id.as_deref() {
        Some(show_id) => format!("{} / {}", config.engine().name, config.get_show(show_id)?.name),
        None => config.engine().name.clone(),
    };

    calculate_timesheet(request.profiles, &thresholds, &rule_set, state.allocator())
}

/// Explicit thresholds win over the show override, which wins over the defaults.
///
/// A named show must exist even when explicit thresholds are supplied.
fn resolve_thresholds(state: &AppState, request: &CalculationRequest) -> EngineResult<Thresholds> {
    let resolved = state.config().resolve_thresholds(request.show_id.as_deref())?;
    Ok(request.thresholds.unwrap_or(resolved))
}

fn json_error(api_error: ApiErrorResponse) -> Response {
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}
