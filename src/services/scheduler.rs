// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Periodic expiry scan.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::services::expiry::ExpiryScanner;

/// Runs [`ExpiryScanner::scan`] once at startup and then every `interval`.
pub struct ExpiryScheduler;

/// Handle to a running scheduler. Dropping it leaves the task running.
pub struct ExpirySchedulerHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ExpiryScheduler {
    pub fn start(scanner: Arc<ExpiryScanner>, interval: Duration) -> ExpirySchedulerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "Expiry scheduler starting");

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                // A scan in flight finishes before shutdown is observed.
                if let Err(e) = scanner.scan(Utc::now()).await {
                    tracing::error!(error = %e, "Expiry scan failed");
                }
            }

            tracing::info!("Expiry scheduler stopped");
        });

        ExpirySchedulerHandle { cancel, handle }
    }
}

impl ExpirySchedulerHandle {
    /// Stop scheduling and wait for any running scan to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Expiry scheduler task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemberStore, MemoryDb};
    use crate::error::AppError;
    use crate::models::{Member, Owner};
    use crate::services::notifier::{Notification, NotificationDispatcher};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeDelta};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts sends; each send takes `delay` to complete.
    #[derive(Default)]
    struct CountingDispatcher {
        delay: Duration,
        started: AtomicUsize,
        sent: AtomicUsize,
    }

    #[async_trait]
    impl NotificationDispatcher for CountingDispatcher {
        async fn send(&self, _notification: &Notification) -> Result<(), AppError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn store_with_expiring_member() -> MemoryDb {
        let db = MemoryDb::new();
        let now = Utc::now();
        let mut owner = Owner::new("o1", now);
        owner.fcm_token = Some("token".into());
        db.upsert_owner(&owner).await.unwrap();
        db.insert_member(&Member {
            id: "m1".into(),
            owner_id: "o1".into(),
            name: "Sam".into(),
            gender: "female".into(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            height: None,
            weight: None,
            photo_url: None,
            trainer_id: None,
            membership_start_date: now - TimeDelta::days(30),
            membership_end_date: now + TimeDelta::days(2),
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
        db
    }

    async fn wait_for(counter: &AtomicUsize) {
        for _ in 0..200 {
            if counter.load(Ordering::SeqCst) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn runs_immediately_and_stops_on_shutdown() {
        let db = store_with_expiring_member().await;
        let dispatcher = Arc::new(CountingDispatcher::default());
        let scanner = Arc::new(ExpiryScanner::new(Arc::new(db), dispatcher.clone()));
        let handle = ExpiryScheduler::start(scanner, Duration::from_secs(3600));

        // First tick fires immediately.
        wait_for(&dispatcher.sent).await;
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 1);

        handle.shutdown().await;
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_waits_for_running_scan() {
        let db = store_with_expiring_member().await;
        let dispatcher = Arc::new(CountingDispatcher {
            delay: Duration::from_millis(300),
            ..Default::default()
        });
        let scanner = Arc::new(ExpiryScanner::new(Arc::new(db), dispatcher.clone()));
        let handle = ExpiryScheduler::start(scanner, Duration::from_secs(3600));

        wait_for(&dispatcher.started).await;
        assert_eq!(dispatcher.started.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 0);

        handle.shutdown().await;

        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_before_first_tick_skips_scan() {
        let db = store_with_expiring_member().await;
        let dispatcher = Arc::new(CountingDispatcher::default());
        let scanner = Arc::new(ExpiryScanner::new(Arc::new(db), dispatcher.clone()));

        // The first tick is already due when the task is first polled, so
        // cancellation has to take priority over it.
        let handle = ExpiryScheduler::start(scanner, Duration::from_secs(3600));
        handle.shutdown().await;

        assert_eq!(dispatcher.started.load(Ordering::SeqCst), 0);
    }
}
