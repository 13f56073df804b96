// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Monthly active-member counts for the dashboard chart.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::MemberStore;
use crate::error::{AppError, Result};
use crate::time_utils::{end_of_month, month_label, months_back};

/// Number of calendar months in the series, including the current one.
pub const SERIES_MONTHS: u32 = 6;

/// One point of the monthly series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MonthlyCount {
    /// Short month name, e.g. "Jan"
    pub month: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub count: u64,
}

/// A calendar month as an inclusive instant range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The last [`SERIES_MONTHS`] calendar months ending with `now`'s month,
/// oldest first.
pub fn month_windows(now: DateTime<Utc>) -> Result<Vec<MonthWindow>> {
    (0..SERIES_MONTHS)
        .rev()
        .map(|back| {
            let start = months_back(now, back).ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("month {back} before {now} is out of range"))
            })?;
            Ok(MonthWindow {
                start,
                end: end_of_month(start),
            })
        })
        .collect()
}

/// Aggregates member periods per calendar month.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn MemberStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn MemberStore>) -> Self {
        Self { store }
    }

    /// Members whose membership overlapped each of the last six months.
    ///
    /// A member counts once for a month if any part of their period falls in
    /// it, not only if they are active right now.
    pub async fn monthly_active_counts(
        &self,
        owner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyCount>> {
        let mut series = Vec::with_capacity(SERIES_MONTHS as usize);

        for window in month_windows(now)? {
            let count = self
                .store
                .count_members_overlapping(owner_id, window.start, window.end)
                .await?;
            series.push(MonthlyCount {
                month: month_label(window.start),
                count,
            });
        }

        tracing::debug!(owner_id, series = ?series, "Computed monthly active counts");
        Ok(series)
    }
}
