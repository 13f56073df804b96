// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Data models for the application.

pub mod member;
pub mod membership;
pub mod owner;
pub mod plan;
pub mod trainer;

pub use member::{CreateMemberRequest, Member, MemberView, RenewMemberRequest, TrainerRef};
pub use membership::{MembershipPeriod, MembershipStatus};
pub use owner::Owner;
pub use plan::{MembershipPlan, PlanError};
pub use trainer::{CreateTrainerRequest, Trainer};
