// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Dashboard analytics routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::MonthlyCount;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/analytics/memberships", get(get_membership_stats))
}

/// Active-member counts for the last six months, oldest first.
async fn get_membership_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<MonthlyCount>>> {
    let series = state
        .analytics
        .monthly_active_counts(&user.owner_id, Utc::now())
        .await?;
    Ok(Json(series))
}
