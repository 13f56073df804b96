// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Services module - business logic layer.

pub mod analytics;
pub mod expiry;
pub mod membership;
pub mod notifier;
pub mod renewal;
pub mod scheduler;

pub use analytics::{AnalyticsService, MonthlyCount};
pub use expiry::{ExpiryScanner, ScanReport};
pub use membership::MembershipService;
pub use notifier::{NoopDispatcher, Notification, NotificationDispatcher, PushGatewayDispatcher};
pub use scheduler::{ExpiryScheduler, ExpirySchedulerHandle};
