// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Membership plan identifiers ("3-month", "12-months", ...).

use std::fmt;
use std::str::FromStr;

/// A purchase or renewal duration in whole calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipPlan {
    months: u32,
}

/// Why a plan identifier was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("membership plan is required")]
    Missing,

    #[error("membership plan '{0}' must start with a month count, e.g. '3-month'")]
    Malformed(String),

    #[error("membership plan must cover at least one month, got {0}")]
    NonPositive(i64),
}

impl MembershipPlan {
    /// Build a plan from a month count. Zero is rejected.
    pub fn from_months(months: u32) -> Result<Self, PlanError> {
        if months == 0 {
            return Err(PlanError::NonPositive(0));
        }
        Ok(Self { months })
    }

    pub fn months(&self) -> u32 {
        self.months
    }
}

impl FromStr for MembershipPlan {
    type Err = PlanError;

    /// Reads the leading month count: `"3-month"`, `"12-months"`, `"6 month"`,
    /// `"3-month-promo"` or a bare `"6"`. Whatever follows the first `-` or
    /// space after the count is a label and is ignored.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PlanError::Missing);
        }
        let malformed = || PlanError::Malformed(raw.to_string());

        let unsigned = raw.strip_prefix('-').unwrap_or(raw);
        let digits = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        let (count, label) = unsigned.split_at(digits);
        if count.is_empty() || !(label.is_empty() || label.starts_with(['-', ' '])) {
            return Err(malformed());
        }

        let mut months: i64 = count.parse().map_err(|_| malformed())?;
        if unsigned.len() != raw.len() {
            months = -months;
        }

        if months <= 0 {
            return Err(PlanError::NonPositive(months));
        }

        let months = u32::try_from(months).map_err(|_| malformed())?;
        Ok(Self { months })
    }
}

impl fmt::Display for MembershipPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-month", self.months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_forms() {
        for (raw, months) in [
            ("1-month", 1),
            ("3-month", 3),
            ("12-months", 12),
            ("6 month", 6),
            ("6", 6),
            (" 2-Month ", 2),
            ("3-month-promo", 3),
            ("1-month trial", 1),
        ] {
            let plan: MembershipPlan = raw.parse().unwrap();
            assert_eq!(plan.months(), months, "plan {raw:?}");
        }
    }

    #[test]
    fn rejects_non_positive_counts() {
        assert_eq!(
            "0-month".parse::<MembershipPlan>(),
            Err(PlanError::NonPositive(0))
        );
        assert_eq!(
            "-1-month".parse::<MembershipPlan>(),
            Err(PlanError::NonPositive(-1))
        );
        assert_eq!(
            "-2".parse::<MembershipPlan>(),
            Err(PlanError::NonPositive(-2))
        );
        assert_eq!(
            "0-month-promo".parse::<MembershipPlan>(),
            Err(PlanError::NonPositive(0))
        );
        assert!(MembershipPlan::from_months(0).is_err());
    }

    #[test]
    fn rejects_malformed_plans() {
        assert_eq!("".parse::<MembershipPlan>(), Err(PlanError::Missing));
        assert_eq!("   ".parse::<MembershipPlan>(), Err(PlanError::Missing));
        assert!(matches!(
            "abc".parse::<MembershipPlan>(),
            Err(PlanError::Malformed(_))
        ));
        assert!(matches!(
            "month".parse::<MembershipPlan>(),
            Err(PlanError::Malformed(_))
        ));
        assert!(matches!(
            "month-3".parse::<MembershipPlan>(),
            Err(PlanError::Malformed(_))
        ));
        assert!(matches!(
            "12abc".parse::<MembershipPlan>(),
            Err(PlanError::Malformed(_))
        ));
        assert!(matches!(
            "1.5-month".parse::<MembershipPlan>(),
            Err(PlanError::Malformed(_))
        ));
        assert!(matches!(
            "99999999999-month".parse::<MembershipPlan>(),
            Err(PlanError::Malformed(_))
        ));
    }

    #[test]
    fn displays_canonical_form() {
        let plan: MembershipPlan = "3 months".parse().unwrap();
        assert_eq!(plan.to_string(), "3-month");
    }
}
