// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Expiry scanner: finds memberships about to lapse and notifies owners.
//!
//! Each delivery is independent. A failed delivery is logged and counted but
//! never stops the rest of the scan.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use futures_util::{stream, StreamExt};

use crate::db::MemberStore;
use crate::error::{AppError, Result};
use crate::models::Member;
use crate::services::notifier::{Notification, NotificationDispatcher};
use crate::time_utils::{end_of_day, start_of_day};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_CONCURRENCY: usize = 4;

const NOTIFICATION_TITLE: &str = "Membership Expiring Soon!";

/// Inclusive `[start of today, end of day (now + days)]`.
///
/// `None` if the end of the window is past the representable calendar.
pub fn expiry_window(now: DateTime<Utc>, days: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let horizon = now.checked_add_signed(TimeDelta::try_days(i64::from(days))?)?;
    // end_of_day steps into the following day
    horizon.date_naive().succ_opt()?;
    Some((start_of_day(now), end_of_day(horizon)))
}

/// Notice for one expiring membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryNotice {
    pub owner_address: String,
    pub member_name: String,
    pub expiry_date: DateTime<Utc>,
}

impl ExpiryNotice {
    pub fn to_notification(&self) -> Notification {
        Notification {
            delivery_address: self.owner_address.clone(),
            title: NOTIFICATION_TITLE.to_string(),
            body: format!(
                "{}'s membership is expiring on {}.",
                self.member_name,
                self.expiry_date.format("%Y-%m-%d")
            ),
        }
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Memberships inside the window
    pub found: u32,
    pub sent: u32,
    /// Owner missing or without a delivery address
    pub skipped: u32,
    pub failed: u32,
    /// Member ids whose delivery failed
    pub failed_ids: Vec<String>,
}

impl ScanReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

enum Delivery {
    Sent,
    Skipped,
    Failed(String),
}

/// Scans all owners' members for upcoming expiries.
pub struct ExpiryScanner {
    store: Arc<dyn MemberStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    window_days: u32,
    concurrency: usize,
}

impl ExpiryScanner {
    pub fn new(store: Arc<dyn MemberStore>, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self {
            store,
            dispatcher,
            window_days: DEFAULT_WINDOW_DAYS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Members of every owner whose end date falls inside the window.
    pub async fn find_expiring_within(&self, now: DateTime<Utc>) -> Result<Vec<Member>> {
        let (from, to) = expiry_window(now, self.window_days).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "expiry window of {} days from {now} is out of range",
                self.window_days
            ))
        })?;
        self.store.find_members_expiring_between(from, to).await
    }

    /// Find expiring memberships and notify their owners.
    ///
    /// Only the initial lookup can fail; delivery problems land in the report.
    pub async fn scan(&self, now: DateTime<Utc>) -> Result<ScanReport> {
        tracing::info!(window_days = self.window_days, "Running expiry scan");

        let expiring = self.find_expiring_within(now).await?;
        let found = expiring.len() as u32;

        tracing::info!(found, "Found memberships expiring soon");

        let outcomes: Vec<(String, Delivery)> = stream::iter(expiring)
            .map(|member| async move {
                let outcome = self.notify_owner(&member).await;
                (member.id, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = ScanReport {
            found,
            ..Default::default()
        };
        for (member_id, outcome) in outcomes {
            match outcome {
                Delivery::Sent => report.sent += 1,
                Delivery::Skipped => report.skipped += 1,
                Delivery::Failed(error) => {
                    tracing::warn!(
                        member_id = %member_id,
                        error = %error,
                        "Expiry notification failed"
                    );
                    report.failed += 1;
                    report.failed_ids.push(member_id);
                }
            }
        }

        tracing::info!(
            found = report.found,
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failed,
            "Expiry scan complete"
        );

        Ok(report)
    }

    async fn notify_owner(&self, member: &Member) -> Delivery {
        let owner = match self.store.get_owner(&member.owner_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                tracing::warn!(
                    member_id = %member.id,
                    owner_id = %member.owner_id,
                    "Owner not found for expiring member"
                );
                return Delivery::Skipped;
            }
            Err(e) => return Delivery::Failed(e.to_string()),
        };

        let Some(address) = owner.delivery_address() else {
            tracing::debug!(owner_id = %owner.id, "Owner has no delivery address; skipping");
            return Delivery::Skipped;
        };

        let notice = ExpiryNotice {
            owner_address: address.to_string(),
            member_name: member.name.clone(),
            expiry_date: member.membership_end_date,
        };

        match self.dispatcher.send(&notice.to_notification()).await {
            Ok(()) => {
                tracing::info!(
                    owner_id = %owner.id,
                    member_id = %member.id,
                    "Expiry notification sent"
                );
                Delivery::Sent
            }
            Err(AppError::Notification(msg)) => Delivery::Failed(msg),
            Err(e) => Delivery::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::models::Owner;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn window_spans_whole_days() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let (from, to) = expiry_window(now, 7).unwrap();

        assert_eq!(from, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert!(to > Utc.with_ymd_and_hms(2025, 6, 8, 23, 59, 59).unwrap());
        assert!(to < Utc.with_ymd_and_hms(2025, 6, 9, 0, 0, 0).unwrap());
    }

    #[test]
    fn window_near_midnight_does_not_shift() {
        let late = Utc.with_ymd_and_hms(2025, 6, 1, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(expiry_window(late, 7), expiry_window(early, 7));
    }

    #[test]
    fn window_past_calendar_end_is_none() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        assert!(expiry_window(now, u32::MAX).is_none());
        assert!(expiry_window(DateTime::<Utc>::MAX_UTC, 0).is_none());
    }

    /// Records deliveries; fails for addresses listed in `fail_for`.
    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<Notification>>,
        fail_for: Vec<String>,
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn send(&self, notification: &Notification) -> Result<()> {
            if self.fail_for.contains(&notification.delivery_address) {
                return Err(AppError::Notification("gateway rejected".into()));
            }
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn member(id: &str, owner: &str, end: DateTime<Utc>) -> Member {
        Member {
            id: id.to_string(),
            owner_id: owner.to_string(),
            name: format!("Member {id}"),
            gender: "male".to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            height: None,
            weight: None,
            photo_url: None,
            trainer_id: None,
            membership_start_date: end - TimeDelta::days(30),
            membership_end_date: end,
            created_at: end - TimeDelta::days(30),
            updated_at: end - TimeDelta::days(30),
        }
    }

    async fn owner(db: &MemoryDb, id: &str, token: Option<&str>) {
        let mut owner = Owner::new(id, Utc::now());
        owner.fcm_token = token.map(str::to_string);
        db.upsert_owner(&owner).await.unwrap();
    }

    fn june(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn finds_only_members_inside_window() {
        let db = MemoryDb::new();
        db.insert_member(&member("in", "o1", june(5))).await.unwrap();
        db.insert_member(&member("late", "o1", june(10))).await.unwrap();
        let may_30 = Utc.with_ymd_and_hms(2025, 5, 30, 12, 0, 0).unwrap();
        db.insert_member(&member("past", "o1", may_30)).await.unwrap();

        let scanner = ExpiryScanner::new(Arc::new(db), Arc::new(RecordingDispatcher::default()));
        let found = scanner.find_expiring_within(june(1)).await.unwrap();

        let ids: Vec<&str> = found.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["in"]);
    }

    #[tokio::test]
    async fn scan_notifies_each_owner() {
        let db = MemoryDb::new();
        owner(&db, "o1", Some("token-1")).await;
        owner(&db, "o2", Some("token-2")).await;
        db.insert_member(&member("a", "o1", june(3))).await.unwrap();
        db.insert_member(&member("b", "o2", june(7))).await.unwrap();

        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scanner = ExpiryScanner::new(Arc::new(db), dispatcher.clone());
        let report = scanner.scan(june(1)).await.unwrap();

        assert_eq!(report.found, 2);
        assert_eq!(report.sent, 2);
        assert!(report.is_complete_success());

        let mut addresses: Vec<String> = dispatcher
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.delivery_address.clone())
            .collect();
        addresses.sort();
        assert_eq!(addresses, vec!["token-1", "token-2"]);
    }

    #[tokio::test]
    async fn one_failed_delivery_does_not_stop_the_scan() {
        let db = MemoryDb::new();
        owner(&db, "o1", Some("bad-token")).await;
        owner(&db, "o2", Some("good-token")).await;
        db.insert_member(&member("a", "o1", june(2))).await.unwrap();
        db.insert_member(&member("b", "o2", june(4))).await.unwrap();

        let dispatcher = Arc::new(RecordingDispatcher {
            fail_for: vec!["bad-token".to_string()],
            ..Default::default()
        });
        let scanner = ExpiryScanner::new(Arc::new(db), dispatcher.clone()).with_concurrency(1);
        let report = scanner.scan(june(1)).await.unwrap();

        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failed_ids, vec!["a".to_string()]);
        assert_eq!(dispatcher.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn owners_without_address_are_skipped() {
        let db = MemoryDb::new();
        owner(&db, "o1", None).await;
        owner(&db, "o2", Some("   ")).await;
        db.insert_member(&member("a", "o1", june(2))).await.unwrap();
        db.insert_member(&member("b", "o2", june(2))).await.unwrap();
        // Owner document missing entirely.
        db.insert_member(&member("c", "ghost", june(2))).await.unwrap();

        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scanner = ExpiryScanner::new(Arc::new(db), dispatcher.clone());
        let report = scanner.scan(june(1)).await.unwrap();

        assert_eq!(report.found, 3);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.sent, 0);
        assert!(dispatcher.sent.lock().unwrap().is_empty());
    }

    /// Tracks how many sends run at the same time.
    #[derive(Default)]
    struct InFlightDispatcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        sent: AtomicUsize,
    }

    #[async_trait]
    impl NotificationDispatcher for InFlightDispatcher {
        async fn send(&self, _notification: &Notification) -> Result<()> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn deliveries_respect_concurrency_limit() {
        let db = MemoryDb::new();
        for i in 0..10 {
            let owner_id = format!("o{i}");
            owner(&db, &owner_id, Some(&format!("token-{i}"))).await;
            db.insert_member(&member(&format!("m{i}"), &owner_id, june(3)))
                .await
                .unwrap();
        }

        let dispatcher = Arc::new(InFlightDispatcher::default());
        let scanner = ExpiryScanner::new(Arc::new(db), dispatcher.clone()).with_concurrency(2);
        let report = scanner.scan(june(1)).await.unwrap();

        assert_eq!(report.sent, 10);
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 10);
        assert_eq!(dispatcher.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn out_of_range_window_fails_the_scan() {
        let scanner = ExpiryScanner::new(
            Arc::new(MemoryDb::new()),
            Arc::new(RecordingDispatcher::default()),
        )
        .with_window_days(u32::MAX);

        let err = scanner.scan(june(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn notice_text() {
        let notice = ExpiryNotice {
            owner_address: "token-1".into(),
            member_name: "Sam".into(),
            expiry_date: Utc.with_ymd_and_hms(2025, 6, 5, 18, 0, 0).unwrap(),
        };
        let n = notice.to_notification();
        assert_eq!(n.delivery_address, "token-1");
        assert_eq!(n.title, "Membership Expiring Soon!");
        assert_eq!(n.body, "Sam's membership is expiring on 2025-06-05.");
    }
}
