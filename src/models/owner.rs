// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Gym owner (tenant) profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner profile stored in Firestore.
///
/// Owners are created by the external identity provider; this service only
/// keeps the fields it needs for notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// JWT subject (also used as document ID)
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Push delivery address for expiry notifications
    pub fcm_token: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Owner {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            fcm_token: None,
            updated_at: now,
        }
    }

    /// Delivery address, if one is registered and non-blank.
    pub fn delivery_address(&self) -> Option<&str> {
        self.fcm_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
