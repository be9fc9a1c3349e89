//! User administration endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, patch},
};
use launchdesk_common::{AppError, AppResult};
use launchdesk_core::UserView;
use launchdesk_db::entities::Role;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// All staff accounts, oldest first.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserView>>> {
    let users = state.user_admin_service.list().await?;
    Ok(ApiResponse::ok(users))
}

#[derive(Debug, Deserialize)]
struct SetRoleRequest {
    role: Option<Role>,
}

/// Change a user's role.
async fn set_role(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<ApiResponse<UserView>> {
    let role = req
        .role
        .ok_or_else(|| AppError::Validation("Role is required".to_string()))?;

    let updated = state.user_admin_service.set_role(&id, role, &user).await?;
    Ok(ApiResponse::ok(updated))
}

/// Delete a user.
async fn delete_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.user_admin_service.delete(&id, &user).await?;
    Ok(ApiResponse::message("User deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}/role", patch(set_role))
        .route("/{id}", delete(delete_user))
}
