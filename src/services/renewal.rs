// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Membership period arithmetic for new and renewed memberships.

use chrono::{DateTime, Utc};

use crate::models::{MembershipPeriod, MembershipPlan, PlanError};
use crate::time_utils::add_months;

/// Period for a brand-new membership: starts at `now`, runs `plan` months.
pub fn initial_period(
    plan: MembershipPlan,
    now: DateTime<Utc>,
) -> Result<MembershipPeriod, PlanError> {
    let end =
        add_months(now, plan.months()).ok_or_else(|| PlanError::Malformed(plan.to_string()))?;
    Ok(MembershipPeriod { start: now, end })
}

/// Extend `current` by `plan` months.
///
/// Counting starts from the later of `now` and the current end date, so an
/// early renewal loses no paid time. A membership that had already lapsed
/// starts a fresh term at `now`.
pub fn renew_period(
    current: MembershipPeriod,
    plan: MembershipPlan,
    now: DateTime<Utc>,
) -> Result<MembershipPeriod, PlanError> {
    let anchor = current.end.max(now);
    let end = add_months(anchor, plan.months())
        .ok_or_else(|| PlanError::Malformed(plan.to_string()))?;

    let lapsed = current.end < now;
    let start = if lapsed || now > end {
        now
    } else {
        current.start
    };

    Ok(MembershipPeriod { start, end })
}
