use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::domain::PersonId;
use super::repository::RosterRepository;
use super::service::{AssignmentRequest, CrewAssignmentService, CrewServiceError};

/// Router builder exposing assignment runs, the current roster, and fairness metrics.
pub fn crew_router<R>(service: Arc<CrewAssignmentService<R>>) -> Router
where
    R: RosterRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/crew/assignments",
            get(roster_handler::<R>).post(assign_handler::<R>),
        )
        .route("/api/v1/crew/fairness", get(all_metrics_handler::<R>))
        .route(
            "/api/v1/crew/fairness/:person_id",
            get(metrics_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn assign_handler<R>(
    State(service): State<Arc<CrewAssignmentService<R>>>,
    axum::Json(request): axum::Json<AssignmentRequest>,
) -> Response
where
    R: RosterRepository + 'static,
{
    match service.assign(request) {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn roster_handler<R>(
    State(service): State<Arc<CrewAssignmentService<R>>>,
) -> Response
where
    R: RosterRepository + 'static,
{
    match service.current_roster() {
        Ok(roster) => (StatusCode::OK, axum::Json(roster)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn all_metrics_handler<R>(
    State(service): State<Arc<CrewAssignmentService<R>>>,
) -> Response
where
    R: RosterRepository + 'static,
{
    match service.all_fairness_metrics() {
        Ok(metrics) => (StatusCode::OK, axum::Json(metrics)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn metrics_handler<R>(
    State(service): State<Arc<CrewAssignmentService<R>>>,
    Path(person_id): Path<String>,
) -> Response
where
    R: RosterRepository + 'static,
{
    let id = PersonId(person_id);
    match service.fairness_metrics(&id) {
        Ok(Some(metrics)) => (StatusCode::OK, axum::Json(metrics)).into_response(),
        Ok(None) => (StatusCode::OK, axum::Json(serde_json::Value::Null)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: CrewServiceError) -> Response {
    let status = if error.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
