// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Gym member model for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::membership::{MembershipPeriod, MembershipStatus};

/// Member record, owned by exactly one gym owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Generated id (also used as document ID)
    pub id: String,
    /// Owner this member belongs to
    pub owner_id: String,
    pub name: String,
    pub gender: String,
    /// Date of birth
    pub dob: NaiveDate,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    pub photo_url: Option<String>,
    /// Assigned trainer, if any (not an ownership relation)
    pub trainer_id: Option<String>,
    pub membership_start_date: DateTime<Utc>,
    pub membership_end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn period(&self) -> MembershipPeriod {
        MembershipPeriod {
            start: self.membership_start_date,
            end: self.membership_end_date,
        }
    }

    /// Replace the membership dates and bump `updated_at`.
    pub fn apply_period(&mut self, period: MembershipPeriod, now: DateTime<Utc>) {
        self.membership_start_date = period.start;
        self.membership_end_date = period.end;
        self.updated_at = now;
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// Trainer reference resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerRef {
    pub id: String,
    pub name: String,
}

/// Member as returned by list endpoints, with the trainer name resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    #[serde(flatten)]
    pub member: Member,
    pub trainer: Option<TrainerRef>,
    pub status: MembershipStatus,
}

/// Body of `POST /api/members`.
///
/// Every field is optional at the wire level so that missing fields surface
/// as validation errors instead of JSON rejections.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    #[validate(
        required(message = "name is required"),
        length(min = 1, max = 100, message = "name must be 1-100 characters")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "gender is required"),
        length(min = 1, max = 32, message = "gender must be 1-32 characters")
    )]
    pub gender: Option<String>,
    #[validate(required(message = "dob is required"))]
    pub dob: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "height must be positive"))]
    pub height: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "weight must be positive"))]
    pub weight: Option<f64>,
    pub trainer_id: Option<String>,
    pub membership_plan: Option<String>,
}

impl CreateMemberRequest {
    /// Trim text fields and treat blank ones as missing.
    pub fn normalized(self) -> Self {
        Self {
            name: non_blank(self.name),
            gender: non_blank(self.gender),
            dob: non_blank(self.dob),
            trainer_id: non_blank(self.trainer_id),
            membership_plan: non_blank(self.membership_plan),
            ..self
        }
    }
}

/// Body of `PUT /api/members/:id/renew`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewMemberRequest {
    pub membership_plan: Option<String>,
}

/// Parse a date of birth given as `YYYY-MM-DD` or an RFC3339 timestamp.
pub fn parse_dob(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_drops_blank_fields() {
        let req = CreateMemberRequest {
            name: Some("  Dana  ".to_string()),
            gender: Some("   ".to_string()),
            dob: Some("2000-01-01".to_string()),
            trainer_id: Some(String::new()),
            membership_plan: Some(" 3-month ".to_string()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(req.name.as_deref(), Some("Dana"));
        assert_eq!(req.gender, None);
        assert_eq!(req.trainer_id, None);
        assert_eq!(req.membership_plan.as_deref(), Some("3-month"));
    }

    #[test]
    fn validation_reports_missing_fields() {
        let req = CreateMemberRequest::default();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("gender"));
        assert!(fields.contains_key("dob"));
    }

    #[test]
    fn validation_rejects_non_positive_measurements() {
        let req = CreateMemberRequest {
            name: Some("Dana".to_string()),
            gender: Some("female".to_string()),
            dob: Some("2000-01-01".to_string()),
            height: Some(0.0),
            weight: Some(-3.0),
            ..Default::default()
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("height"));
        assert!(fields.contains_key("weight"));
    }

    #[test]
    fn dob_accepts_date_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
        assert_eq!(parse_dob("1990-05-17"), Some(expected));
        assert_eq!(parse_dob("1990-05-17T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_dob("17/05/1990"), None);
    }
}
