// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Trainer model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Trainer record, owned by one gym owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/trainers`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTrainerRequest {
    #[validate(
        required(message = "name is required"),
        length(min = 1, max = 100, message = "name must be 1-100 characters")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "gender is required"),
        length(min = 1, max = 32, message = "gender must be 1-32 characters")
    )]
    pub gender: Option<String>,
}

impl CreateTrainerRequest {
    pub fn normalized(self) -> Self {
        Self {
            name: super::member::non_blank(self.name),
            gender: super::member::non_blank(self.gender),
        }
    }
}
