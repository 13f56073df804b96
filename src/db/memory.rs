// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! In-process document store backed by `DashMap`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::db::{MemberFilter, MemberStore};
use crate::error::AppError;
use crate::models::{Member, Owner, Trainer};

/// Cheaply cloneable in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    members: Arc<DashMap<String, Member>>,
    trainers: Arc<DashMap<String, Trainer>>,
    owners: Arc<DashMap<String, Owner>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    fn collect_members<F>(&self, pred: F) -> Vec<Member>
    where
        F: Fn(&Member) -> bool,
    {
        self.members
            .iter()
            .filter(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl MemberStore for MemoryDb {
    async fn insert_member(&self, member: &Member) -> Result<(), AppError> {
        if self.members.contains_key(&member.id) {
            return Err(AppError::Database(format!(
                "Member {} already exists",
                member.id
            )));
        }
        self.members.insert(member.id.clone(), member.clone());
        Ok(())
    }

    async fn get_member(&self, id: &str) -> Result<Option<Member>, AppError> {
        Ok(self.members.get(id).map(|m| m.value().clone()))
    }

    async fn update_member(&self, member: &Member) -> Result<(), AppError> {
        self.members.insert(member.id.clone(), member.clone());
        Ok(())
    }

    async fn delete_member(&self, id: &str) -> Result<(), AppError> {
        self.members.remove(id);
        Ok(())
    }

    async fn find_members(
        &self,
        owner_id: &str,
        filter: &MemberFilter,
    ) -> Result<Vec<Member>, AppError> {
        Ok(self.collect_members(|m| m.is_owned_by(owner_id) && filter.matches(m)))
    }

    async fn count_members_overlapping(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let count = self
            .members
            .iter()
            .filter(|entry| {
                let m = entry.value();
                m.is_owned_by(owner_id) && m.period().overlaps(from, to)
            })
            .count();
        Ok(count as u64)
    }

    async fn find_members_expiring_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Member>, AppError> {
        Ok(self.collect_members(|m| {
            m.membership_end_date >= from && m.membership_end_date <= to
        }))
    }

    async fn insert_trainer(&self, trainer: &Trainer) -> Result<(), AppError> {
        self.trainers.insert(trainer.id.clone(), trainer.clone());
        Ok(())
    }

    async fn get_trainer(&self, id: &str) -> Result<Option<Trainer>, AppError> {
        Ok(self.trainers.get(id).map(|t| t.value().clone()))
    }

    async fn list_trainers(&self, owner_id: &str) -> Result<Vec<Trainer>, AppError> {
        Ok(self
            .trainers
            .iter()
            .filter(|entry| entry.value().owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn get_owner(&self, id: &str) -> Result<Option<Owner>, AppError> {
        Ok(self.owners.get(id).map(|o| o.value().clone()))
    }

    async fn upsert_owner(&self, owner: &Owner) -> Result<(), AppError> {
        self.owners.insert(owner.id.clone(), owner.clone());
        Ok(())
    }
}
