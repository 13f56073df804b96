// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Membership period: the start/end pair every member carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time state of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Expired,
}

/// Inclusive date range a membership covers.
///
/// Invariant: `end >= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MembershipPeriod {
    /// Build a period, rejecting an end before the start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    /// Active at `now`; the end instant itself still counts as active.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.end >= now
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> MembershipStatus {
        if self.is_active_at(now) {
            MembershipStatus::Active
        } else {
            MembershipStatus::Expired
        }
    }

    /// True if any part of the period falls inside `[from, to]`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start <= to && self.end >= from
    }
}
