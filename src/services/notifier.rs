// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Push notification delivery.
//!
//! The expiry scanner only knows the [`NotificationDispatcher`] trait; the
//! HTTP push gateway client lives here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

/// A single push notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Device token of the recipient
    pub delivery_address: String,
    pub title: String,
    pub body: String,
}

/// Best-effort notification delivery.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), AppError>;
}

/// Logs notifications instead of sending them. Used when no gateway is set.
#[derive(Debug, Default, Clone)]
pub struct NoopDispatcher;

#[async_trait]
impl NotificationDispatcher for NoopDispatcher {
    async fn send(&self, notification: &Notification) -> Result<(), AppError> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            "Push gateway not configured; notification logged only"
        );
        Ok(())
    }
}

/// FCM-style HTTP push gateway client.
#[derive(Clone)]
pub struct PushGatewayDispatcher {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

#[derive(Serialize)]
struct PushRequest<'a> {
    message: PushMessage<'a>,
}

#[derive(Serialize)]
struct PushMessage<'a> {
    token: &'a str,
    notification: PushContent<'a>,
}

#[derive(Serialize)]
struct PushContent<'a> {
    title: &'a str,
    body: &'a str,
}

impl PushGatewayDispatcher {
    /// Create a client. Each delivery is bounded by `timeout`.
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Notification(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            auth_token,
        })
    }
}

#[async_trait]
impl NotificationDispatcher for PushGatewayDispatcher {
    async fn send(&self, notification: &Notification) -> Result<(), AppError> {
        let payload = PushRequest {
            message: PushMessage {
                token: &notification.delivery_address,
                notification: PushContent {
                    title: &notification.title,
                    body: &notification.body,
                },
            },
        };

        let mut request = self.http.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Notification("Push gateway request timed out".to_string())
            } else {
                AppError::Notification(format!("Push gateway request failed: {}", e))
            }
        })?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Notification(format!("HTTP {}: {}", status, body)))
    }
}
