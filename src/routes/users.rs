// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Owner profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::member::non_blank;
use crate::models::Owner;
use crate::routes::json_body;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/profile", get(get_profile))
        .route("/api/users/fcm-token", post(save_fcm_token))
}

#[derive(Debug, Deserialize)]
pub struct FcmTokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FcmTokenResponse {
    pub message: String,
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Owner>> {
    let owner = state
        .store
        .get_owner(&user.owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Owner {} not found", user.owner_id)))?;
    Ok(Json(owner))
}

/// Register the device that receives expiry notifications.
async fn save_fcm_token(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<FcmTokenRequest>, JsonRejection>,
) -> Result<Json<FcmTokenResponse>> {
    let request = json_body(body)?;
    let token = non_blank(request.token)
        .ok_or_else(|| AppError::Validation("token is required".to_string()))?;

    let now = Utc::now();
    // Fetch-modify-write to keep the other profile fields
    let mut owner = state
        .store
        .get_owner(&user.owner_id)
        .await?
        .unwrap_or_else(|| Owner::new(user.owner_id.clone(), now));
    owner.fcm_token = Some(token);
    owner.updated_at = now;

    state.store.upsert_owner(&owner).await?;

    tracing::info!(owner_id = %user.owner_id, "Delivery address saved");
    Ok(Json(FcmTokenResponse {
        message: "Token saved".to_string(),
    }))
}
