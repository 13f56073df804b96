// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Member routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{CreateMemberRequest, Member, MemberView, RenewMemberRequest};
use crate::routes::json_body;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Member routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/members", get(list_members).post(create_member))
        .route("/api/members/active", get(list_active_members))
        .route("/api/members/expired", get(list_expired_members))
        .route("/api/members/{id}", delete(delete_member))
        .route("/api/members/{id}/renew", put(renew_member))
}

#[derive(Debug, Deserialize)]
pub struct ListMembersQuery {
    pub search: Option<String>,
}

/// Confirmation returned after deleting a member.
#[derive(Debug, Serialize)]
pub struct DeleteMemberResponse {
    pub message: String,
    pub id: String,
}

async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<Vec<MemberView>>> {
    let members = state
        .membership
        .list_members(&user.owner_id, query.search.as_deref(), Utc::now())
        .await?;
    Ok(Json(members))
}

async fn list_active_members(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<MemberView>>> {
    let members = state
        .membership
        .list_active_members(&user.owner_id, Utc::now())
        .await?;
    Ok(Json(members))
}

async fn list_expired_members(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<MemberView>>> {
    let members = state
        .membership
        .list_expired_members(&user.owner_id, Utc::now())
        .await?;
    Ok(Json(members))
}

async fn create_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<CreateMemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Member>)> {
    let request = json_body(body)?;
    let member = state
        .membership
        .create_member(&user.owner_id, request, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Renew a membership. Expired members restart from today.
async fn renew_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(member_id): Path<String>,
    body: std::result::Result<Json<RenewMemberRequest>, JsonRejection>,
) -> Result<Json<Member>> {
    let request = json_body(body)?;
    let member = state
        .membership
        .renew_member(
            &user.owner_id,
            &member_id,
            request.membership_plan.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok(Json(member))
}

async fn delete_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(member_id): Path<String>,
) -> Result<Json<DeleteMemberResponse>> {
    state
        .membership
        .delete_member(&user.owner_id, &member_id)
        .await?;

    Ok(Json(DeleteMemberResponse {
        message: "Member removed".to_string(),
        id: member_id,
    }))
}
