//! Advisory checks run before a maternity request is filed.
//!
//! Every check returns a structured result instead of an error so the caller decides
//! whether a failed check blocks submission.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::domain::{Employee, EmploymentStatus, Gender};

pub const DEFAULT_PROBATION_MONTHS: u32 = 6;
pub const MIN_MATERNITY_NOTICE_DAYS: i64 = 60;

/// Probation is counted as 30 days per month. Stored end dates depend on this, so keep it.
/// `None` when the end date falls outside the representable calendar.
pub fn calculate_probation_end_date(
    join_date: NaiveDate,
    probation_months: u32,
) -> Option<NaiveDate> {
    join_date.checked_add_days(Days::new(u64::from(probation_months) * 30))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaternityEligibility {
    pub eligible: bool,
    pub reason: String,
}

impl MaternityEligibility {
    fn denied(reason: impl Into<String>) -> Self {
        Self {
            eligible: false,
            reason: reason.into(),
        }
    }
}

pub fn validate_maternity_eligibility(employee: Option<&Employee>) -> MaternityEligibility {
    let Some(employee) = employee else {
        return MaternityEligibility::denied("Employee record not found");
    };

    if employee.gender != Gender::Female {
        return MaternityEligibility::denied(
            "Maternity leave is only available for female employees",
        );
    }

    if employee.employment_status == EmploymentStatus::Probation {
        return match employee.probation_end_date {
            Some(end) => MaternityEligibility::denied(format!(
                "Maternity leave is not available during probation. Probation ends on {}",
                end.format("%B %-d, %Y")
            )),
            None => MaternityEligibility::denied(
                "Maternity leave is not available during the probation period",
            ),
        };
    }

    MaternityEligibility {
        eligible: true,
        reason: "Eligible for maternity leave".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceNoticeCheck {
    pub valid: bool,
    /// Negative when the expected date is already in the past.
    pub days_in_advance: Option<i64>,
    pub min_required: i64,
    pub reason: String,
}

pub fn validate_advance_notice(
    expected_delivery_date: Option<NaiveDate>,
    application_date: NaiveDate,
) -> AdvanceNoticeCheck {
    let Some(expected) = expected_delivery_date else {
        return AdvanceNoticeCheck {
            valid: false,
            days_in_advance: None,
            min_required: MIN_MATERNITY_NOTICE_DAYS,
            reason: "Expected delivery date is required".to_string(),
        };
    };

    let days_in_advance = (expected - application_date).num_days();
    if days_in_advance < MIN_MATERNITY_NOTICE_DAYS {
        return AdvanceNoticeCheck {
            valid: false,
            days_in_advance: Some(days_in_advance),
            min_required: MIN_MATERNITY_NOTICE_DAYS,
            reason: format!(
                "Maternity leave must be requested at least {MIN_MATERNITY_NOTICE_DAYS} days before the expected delivery date ({days_in_advance} days given)"
            ),
        };
    }

    AdvanceNoticeCheck {
        valid: true,
        days_in_advance: Some(days_in_advance),
        min_required: MIN_MATERNITY_NOTICE_DAYS,
        reason: format!("Notice of {days_in_advance} days meets the requirement"),
    }
}
