// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Owner-scoped member and trainer operations.
//!
//! Every method takes the caller's owner id; nothing here returns or mutates
//! another owner's records. Validation and ownership checks run before any
//! write.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::db::{MemberFilter, MemberStore};
use crate::error::{AppError, Result};
use crate::models::member::parse_dob;
use crate::models::{
    CreateMemberRequest, CreateTrainerRequest, Member, MemberView, MembershipPlan, PlanError,
    Trainer, TrainerRef,
};
use crate::services::renewal::{initial_period, renew_period};

/// Member lifecycle and query service.
#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn MemberStore>,
}

impl MembershipService {
    pub fn new(store: Arc<dyn MemberStore>) -> Self {
        Self { store }
    }

    // ─── Queries ─────────────────────────────────────────────────

    /// All members of the owner, optionally filtered by a name substring.
    pub async fn list_members(
        &self,
        owner_id: &str,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<MemberView>> {
        let filter = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => MemberFilter::NameContains(needle.to_string()),
            None => MemberFilter::All,
        };
        self.query(owner_id, filter, now).await
    }

    /// Members whose end date is at or after `now`.
    pub async fn list_active_members(
        &self,
        owner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<MemberView>> {
        self.query(owner_id, MemberFilter::EndsOnOrAfter(now), now)
            .await
    }

    /// Members whose end date is before `now`.
    pub async fn list_expired_members(
        &self,
        owner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<MemberView>> {
        self.query(owner_id, MemberFilter::EndsBefore(now), now).await
    }

    pub async fn list_members_by_trainer(
        &self,
        owner_id: &str,
        trainer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<MemberView>> {
        self.query(owner_id, MemberFilter::Trainer(trainer_id.to_string()), now)
            .await
    }

    pub async fn list_trainers(&self, owner_id: &str) -> Result<Vec<Trainer>> {
        let mut trainers = self.store.list_trainers(owner_id).await?;
        trainers.sort_by_cached_key(|t| t.name.to_lowercase());
        Ok(trainers)
    }

    async fn query(
        &self,
        owner_id: &str,
        filter: MemberFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<MemberView>> {
        let members = self.store.find_members(owner_id, &filter).await?;
        tracing::debug!(
            owner_id,
            filter = ?filter,
            count = members.len(),
            "Fetched members"
        );
        self.resolve_views(owner_id, members, now).await
    }

    /// Attach trainer names and point-in-time status.
    async fn resolve_views(
        &self,
        owner_id: &str,
        mut members: Vec<Member>,
        now: DateTime<Utc>,
    ) -> Result<Vec<MemberView>> {
        members.sort_by_cached_key(|m| (m.name.to_lowercase(), m.id.clone()));

        let trainers: HashMap<String, String> = if members.iter().any(|m| m.trainer_id.is_some())
        {
            self.store
                .list_trainers(owner_id)
                .await?
                .into_iter()
                .map(|t| (t.id, t.name))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(members
            .into_iter()
            .map(|member| {
                let trainer = member.trainer_id.as_ref().and_then(|id| {
                    trainers.get(id).map(|name| TrainerRef {
                        id: id.clone(),
                        name: name.clone(),
                    })
                });
                let status = member.period().status_at(now);
                MemberView {
                    member,
                    trainer,
                    status,
                }
            })
            .collect())
    }

    // ─── Mutations ───────────────────────────────────────────────

    /// Register a new member with a membership starting at `now`.
    pub async fn create_member(
        &self,
        owner_id: &str,
        request: CreateMemberRequest,
        now: DateTime<Utc>,
    ) -> Result<Member> {
        let request = request.normalized();
        request.validate()?;

        let dob_raw = request.dob.as_deref().unwrap_or_default();
        let dob = parse_dob(dob_raw).ok_or_else(|| {
            AppError::Validation(format!("dob '{dob_raw}' must be a YYYY-MM-DD date"))
        })?;
        if dob > now.date_naive() {
            return Err(AppError::Validation(
                "dob cannot be in the future".to_string(),
            ));
        }

        let plan: MembershipPlan = request
            .membership_plan
            .as_deref()
            .ok_or(PlanError::Missing)?
            .parse()?;

        if let Some(trainer_id) = request.trainer_id.as_deref() {
            self.ensure_trainer_owned(owner_id, trainer_id).await?;
        }

        let period = initial_period(plan, now)?;
        let member = Member {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: request.name.unwrap_or_default(),
            gender: request.gender.unwrap_or_default(),
            dob,
            height: request.height,
            weight: request.weight,
            photo_url: None,
            trainer_id: request.trainer_id,
            membership_start_date: period.start,
            membership_end_date: period.end,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_member(&member).await?;

        tracing::info!(
            owner_id,
            member_id = %member.id,
            plan_months = plan.months(),
            end = %member.membership_end_date,
            "Member created"
        );

        Ok(member)
    }

    /// Extend a member's membership by `plan` months.
    pub async fn renew_member(
        &self,
        owner_id: &str,
        member_id: &str,
        plan: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Member> {
        let plan: MembershipPlan = plan.ok_or(PlanError::Missing)?.parse()?;

        let mut member = self.owned_member(owner_id, member_id).await?;
        let previous_end = member.membership_end_date;

        let period = renew_period(member.period(), plan, now)?;
        member.apply_period(period, now);

        self.store.update_member(&member).await?;

        tracing::info!(
            owner_id,
            member_id,
            plan_months = plan.months(),
            previous_end = %previous_end,
            new_end = %member.membership_end_date,
            "Membership renewed"
        );

        Ok(member)
    }

    /// Permanently remove a member.
    pub async fn delete_member(&self, owner_id: &str, member_id: &str) -> Result<()> {
        self.owned_member(owner_id, member_id).await?;
        self.store.delete_member(member_id).await?;

        tracing::info!(owner_id, member_id, "Member deleted");
        Ok(())
    }

    pub async fn create_trainer(
        &self,
        owner_id: &str,
        request: CreateTrainerRequest,
        now: DateTime<Utc>,
    ) -> Result<Trainer> {
        let request = request.normalized();
        request.validate()?;

        let trainer = Trainer {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: request.name.unwrap_or_default(),
            gender: request.gender.unwrap_or_default(),
            created_at: now,
        };

        self.store.insert_trainer(&trainer).await?;

        tracing::info!(owner_id, trainer_id = %trainer.id, "Trainer created");
        Ok(trainer)
    }

    // ─── Ownership Checks ────────────────────────────────────────

    /// Load a member, failing with NotFound or NotOwner.
    async fn owned_member(&self, owner_id: &str, member_id: &str) -> Result<Member> {
        let member = self
            .store
            .get_member(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {member_id} not found")))?;

        if !member.is_owned_by(owner_id) {
            tracing::warn!(
                owner_id,
                member_id,
                "Blocked access to another owner's member"
            );
            return Err(AppError::NotOwner("member"));
        }

        Ok(member)
    }

    async fn ensure_trainer_owned(&self, owner_id: &str, trainer_id: &str) -> Result<()> {
        match self.store.get_trainer(trainer_id).await? {
            Some(trainer) if trainer.owner_id == owner_id => Ok(()),
            _ => Err(AppError::Validation(format!(
                "trainerId '{trainer_id}' does not match any of your trainers"
            ))),
        }
    }
}
