// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Trainer routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{CreateTrainerRequest, MemberView, Trainer};
use crate::routes::json_body;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trainers", get(list_trainers).post(create_trainer))
        .route("/api/trainers/{id}/members", get(list_trainer_members))
}

async fn create_trainer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<CreateTrainerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Trainer>)> {
    let request = json_body(body)?;
    let trainer = state
        .membership
        .create_trainer(&user.owner_id, request, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(trainer)))
}

async fn list_trainers(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Trainer>>> {
    Ok(Json(state.membership.list_trainers(&user.owner_id).await?))
}

/// Members assigned to a trainer. Unknown trainers yield an empty list.
async fn list_trainer_members(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trainer_id): Path<String>,
) -> Result<Json<Vec<MemberView>>> {
    let members = state
        .membership
        .list_members_by_trainer(&user.owner_id, &trainer_id, Utc::now())
        .await?;
    Ok(Json(members))
}
