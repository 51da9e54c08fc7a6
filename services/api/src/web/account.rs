//! services/api/src/web/account.rs
//!
//! Endpoints that remember which judge username a user has linked.
//!
//! The user is identified by the `x-user-id` header; authenticating that header is the
//! job of the gateway in front of this service.

use crate::adapters::judge::is_valid_username;
use crate::loader::LoadOutcome;
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use coursehub_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LinkRequest {
    pub username: String,
}

#[derive(Serialize, ToSchema)]
pub struct LinkResponse {
    pub username: Option<String>,
}

fn user_id_from(headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    let user_id_str = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-user-id header is required".to_string(),
            )
        })?;

    Uuid::parse_str(user_id_str).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id format".to_string(),
        )
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /account/link - Read the linked judge username
#[utoipa::path(
    get,
    path = "/account/link",
    responses(
        (status = 200, description = "The linked username, or null", body = LinkResponse),
        (status = 400, description = "Missing or invalid x-user-id header"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn get_link_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = user_id_from(&headers)?;
    let username = state
        .accounts
        .get_linked_username(user_id)
        .await
        .map_err(|e| {
            error!("Failed to read linked account: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read linked account".to_string())
        })?;
    Ok(Json(LinkResponse { username }))
}

/// PUT /account/link - Link a judge username
///
/// The username is only stored once one of the judge sources confirms it exists.
#[utoipa::path(
    put,
    path = "/account/link",
    request_body = LinkRequest,
    responses(
        (status = 200, description = "Username linked", body = LinkResponse),
        (status = 400, description = "Invalid username or header"),
        (status = 404, description = "No judge source knows this username"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn link_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<LinkRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = user_id_from(&headers)?;
    let username = req.username.trim().to_string();
    if !is_valid_username(&username) {
        return Err((StatusCode::BAD_REQUEST, "Invalid username".to_string()));
    }

    // 1. Confirm the username with a judge source; this also primes the dashboard.
    let confirmed = match state
        .progress_loader
        .refresh(&username, &CancellationToken::new())
        .await
    {
        LoadOutcome::Applied(loaded) | LoadOutcome::Stale(loaded) => loaded.source.is_some(),
        LoadOutcome::InFlight | LoadOutcome::Discarded => false,
    };
    if !confirmed {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Could not find judge profile '{}'", username),
        ));
    }

    // 2. Remember the link.
    state
        .accounts
        .set_linked_username(user_id, &username)
        .await
        .map_err(|e| {
            error!("Failed to store linked account: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to link account".to_string())
        })?;

    info!("User {} linked judge username {}", user_id, username);
    Ok(Json(LinkResponse {
        username: Some(username),
    }))
}

/// DELETE /account/link - Forget the linked judge username
#[utoipa::path(
    delete,
    path = "/account/link",
    responses(
        (status = 204, description = "Link removed"),
        (status = 404, description = "No username was linked"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn unlink_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = user_id_from(&headers)?;
    match state.accounts.remove_linked_username(user_id).await {
        Ok(()) => {
            info!("User {} unlinked their judge username", user_id);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(PortError::NotFound(_)) => {
            Err((StatusCode::NOT_FOUND, "No linked account".to_string()))
        }
        Err(e) => {
            error!("Failed to remove linked account: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to unlink account".to_string()))
        }
    }
}
