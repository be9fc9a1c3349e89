//! Submission endpoints.
//!
//! Intake is the one public route; everything else requires a session.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use launchdesk_common::{AppError, AppResult};
use launchdesk_core::{CreateSubmissionInput, SubmissionDetailView, SubmissionView};
use launchdesk_db::entities::SubmissionStatus;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Intake response: the submitter gets back only the shareable code.
#[derive(Serialize)]
pub struct IntakeResponse {
    pub success: bool,
    pub code: String,
}

/// Accept a public intake submission.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateSubmissionInput>,
) -> AppResult<Json<IntakeResponse>> {
    let submission = state.submission_service.create(req).await?;

    Ok(Json(IntakeResponse {
        success: true,
        code: submission.submission_code,
    }))
}

/// All submissions, newest first.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<SubmissionView>>> {
    let submissions = state.submission_service.list().await?;
    Ok(ApiResponse::ok(submissions))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Case-insensitive substring search.
async fn search(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<SubmissionView>>> {
    let submissions = state.submission_service.search(&query.q).await?;
    Ok(ApiResponse::ok(submissions))
}

/// One submission with its full status history.
async fn get_submission(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SubmissionDetailView>> {
    let submission = state.submission_service.get(&id).await?;
    Ok(ApiResponse::ok(submission))
}

#[derive(Debug, Deserialize)]
struct SetStatusRequest {
    /// `Option` so a missing status maps to a validation error rather than a
    /// body-deserialization rejection.
    status: Option<SubmissionStatus>,
}

/// Apply a status transition.
async fn set_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<SubmissionView>> {
    let status = req
        .status
        .ok_or_else(|| AppError::Validation("Status is required".to_string()))?;

    let submission = state.submission_service.set_status(&id, status, &user).await?;
    Ok(ApiResponse::ok(submission))
}

/// Apply the irreversible status lock.
async fn lock(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SubmissionView>> {
    let submission = state.submission_service.lock(&id, &user).await?;
    Ok(ApiResponse::ok(submission))
}

/// Hard-delete a submission.
async fn delete_submission(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.submission_service.delete(&id).await?;
    Ok(ApiResponse::message("Submission deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/search", get(search))
        .route("/{id}", get(get_submission).delete(delete_submission))
        .route("/{id}/status", patch(set_status))
        .route("/{id}/lock", patch(lock))
}
