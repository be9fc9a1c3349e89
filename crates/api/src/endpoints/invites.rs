//! Invite code endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use launchdesk_common::AppResult;
use launchdesk_core::{GenerateInviteInput, InviteView};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// All invites, newest first.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<InviteView>>> {
    let invites = state.invite_service.list().await?;
    Ok(ApiResponse::ok(invites))
}

/// Generate and email an invite.
async fn generate(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<GenerateInviteInput>,
) -> AppResult<ApiResponse<InviteView>> {
    let invite = state.invite_service.generate(req, &user).await?;
    Ok(ApiResponse::ok(invite))
}

/// Regenerate a pending invite's code and expiry and re-send it.
async fn resend(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<InviteView>> {
    let invite = state.invite_service.resend(&id, &user).await?;
    Ok(ApiResponse::ok(invite))
}

/// Revoke a pending invite.
async fn revoke(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.invite_service.revoke(&id, &user).await?;
    Ok(ApiResponse::message("Invite revoked"))
}

pub fn router() -> Router<AppState> {
    // Paths mirror the front-end client, resend's odd shape included.
    Router::new()
        .route("/invites", get(list))
        .route("/invites/generate", post(generate))
        .route("/invites/{id}/revoke", post(revoke))
        .route("/invites/resend/{id}", post(resend))
}
