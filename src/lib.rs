// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Gym roster: multi-tenant gym membership backend
//!
//! Owners manage members and trainers, renew memberships by plan, view
//! monthly activity, and receive push notices before memberships expire.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::MemberStore;
use services::{AnalyticsService, MembershipService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn MemberStore>,
    pub membership: MembershipService,
    pub analytics: AnalyticsService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn MemberStore>) -> Self {
        Self {
            config,
            membership: MembershipService::new(store.clone()),
            analytics: AnalyticsService::new(store.clone()),
            store,
        }
    }
}
