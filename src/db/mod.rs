// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Database layer.
//!
//! Services talk to a [`MemberStore`]; Firestore backs production and
//! [`MemoryDb`] backs local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Member, Owner, Trainer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Collection names as constants.
pub mod collections {
    pub const OWNERS: &str = "owners";
    pub const MEMBERS: &str = "members";
    pub const TRAINERS: &str = "trainers";
}

/// Owner-scoped member filters.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberFilter {
    All,
    /// Case-insensitive substring match on name
    NameContains(String),
    /// `membership_end_date >= t`
    EndsOnOrAfter(DateTime<Utc>),
    /// `membership_end_date < t`
    EndsBefore(DateTime<Utc>),
    Trainer(String),
}

impl MemberFilter {
    /// Evaluate the filter against a member already scoped to the owner.
    pub fn matches(&self, member: &Member) -> bool {
        match self {
            MemberFilter::All => true,
            MemberFilter::NameContains(needle) => member
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            MemberFilter::EndsOnOrAfter(t) => member.membership_end_date >= *t,
            MemberFilter::EndsBefore(t) => member.membership_end_date < *t,
            MemberFilter::Trainer(id) => member.trainer_id.as_deref() == Some(id.as_str()),
        }
    }
}

/// Document store operations the services depend on.
#[async_trait]
pub trait MemberStore: Send + Sync {
    // ─── Members ─────────────────────────────────────────────────

    async fn insert_member(&self, member: &Member) -> Result<(), AppError>;

    async fn get_member(&self, id: &str) -> Result<Option<Member>, AppError>;

    /// Overwrite a stored member (last write wins).
    async fn update_member(&self, member: &Member) -> Result<(), AppError>;

    async fn delete_member(&self, id: &str) -> Result<(), AppError>;

    /// Members of `owner_id` matching `filter`.
    async fn find_members(
        &self,
        owner_id: &str,
        filter: &MemberFilter,
    ) -> Result<Vec<Member>, AppError>;

    /// Number of members of `owner_id` whose period overlaps `[from, to]`.
    async fn count_members_overlapping(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    /// Members of every owner whose end date lies in `[from, to]`.
    async fn find_members_expiring_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Member>, AppError>;

    // ─── Trainers ────────────────────────────────────────────────

    async fn insert_trainer(&self, trainer: &Trainer) -> Result<(), AppError>;

    async fn get_trainer(&self, id: &str) -> Result<Option<Trainer>, AppError>;

    async fn list_trainers(&self, owner_id: &str) -> Result<Vec<Trainer>, AppError>;

    // ─── Owners ──────────────────────────────────────────────────

    async fn get_owner(&self, id: &str) -> Result<Option<Owner>, AppError>;

    async fn upsert_owner(&self, owner: &Owner) -> Result<(), AppError>;
}
