use chrono::NaiveDate;

use super::catalog::{faculty_of, Designation, LeaveType};
use super::domain::{Employee, ExitSurvey, NewEmployee, NewLeave, NewPromotion, NewResignation};
use super::eligibility::{validate_advance_notice, validate_maternity_eligibility};

/// Input errors raised before a request is accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("{0}")]
    MaternityIneligible(String),
    #[error("insufficient advance notice: {reason}")]
    InsufficientNotice {
        days_in_advance: Option<i64>,
        min_required: i64,
        reason: String,
    },
    #[error("requested designation {requested:?} does not rank above {current:?}")]
    PromotionNotUpward {
        current: Designation,
        requested: Designation,
    },
    #[error("department {department} does not belong to faculty {faculty}")]
    DepartmentOutsideFaculty { department: String, faculty: String },
    #[error("employee code {0} is already registered")]
    DuplicateEmployeeCode(String),
    #[error("employee already has an open {0} request")]
    OpenRequestExists(&'static str),
    #[error("last working date {last_working_date} precedes join date {join_date}")]
    LastWorkingDateBeforeJoin {
        join_date: NaiveDate,
        last_working_date: NaiveDate,
    },
    #[error("overall satisfaction must be between 1 and 5, got {0}")]
    SatisfactionOutOfRange(u8),
    #[error("a {probation_months}-month probation from {join_date} ends past the supported calendar")]
    ProbationOutOfRange {
        join_date: NaiveDate,
        probation_months: u32,
    },
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

pub(crate) fn check_placement(department: &str, faculty: &str) -> Result<(), ValidationError> {
    let known = faculty_of(department.trim())
        .map(|home| home.eq_ignore_ascii_case(faculty.trim()))
        .unwrap_or(false);
    if !known {
        return Err(ValidationError::DepartmentOutsideFaculty {
            department: department.to_string(),
            faculty: faculty.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn check_new_employee(
    submission: &NewEmployee,
    roster: &[Employee],
) -> Result<(), ValidationError> {
    require(&submission.code, "code")?;
    require(&submission.name, "name")?;
    require(&submission.email, "email")?;
    require(&submission.department, "department")?;
    require(&submission.faculty, "faculty")?;
    check_placement(&submission.department, &submission.faculty)?;

    if roster
        .iter()
        .any(|employee| employee.code.eq_ignore_ascii_case(submission.code.trim()))
    {
        return Err(ValidationError::DuplicateEmployeeCode(
            submission.code.trim().to_string(),
        ));
    }
    Ok(())
}

/// Validate a leave application and return its inclusive day count.
pub(crate) fn check_new_leave(
    submission: &NewLeave,
    employee: &Employee,
    enforce_maternity_rules: bool,
    today: NaiveDate,
) -> Result<u32, ValidationError> {
    require(&submission.reason, "reason")?;

    if submission.end_date < submission.start_date {
        return Err(ValidationError::InvalidDateRange {
            start: submission.start_date,
            end: submission.end_date,
        });
    }

    if submission.leave_type == LeaveType::Maternity && enforce_maternity_rules {
        let eligibility = validate_maternity_eligibility(Some(employee));
        if !eligibility.eligible {
            return Err(ValidationError::MaternityIneligible(eligibility.reason));
        }

        let notice = validate_advance_notice(submission.expected_delivery_date, today);
        if !notice.valid {
            return Err(ValidationError::InsufficientNotice {
                days_in_advance: notice.days_in_advance,
                min_required: notice.min_required,
                reason: notice.reason,
            });
        }
    }

    let span = (submission.end_date - submission.start_date).num_days() + 1;
    Ok(u32::try_from(span).unwrap_or(u32::MAX))
}

pub(crate) fn check_new_promotion(
    submission: &NewPromotion,
    employee: &Employee,
) -> Result<(), ValidationError> {
    require(&submission.justification, "justification")?;

    if !submission.requested_designation.outranks(employee.designation) {
        return Err(ValidationError::PromotionNotUpward {
            current: employee.designation,
            requested: submission.requested_designation,
        });
    }
    Ok(())
}

pub(crate) fn check_new_resignation(
    submission: &NewResignation,
    employee: &Employee,
) -> Result<(), ValidationError> {
    require(&submission.reason, "reason")?;

    if submission.last_working_date < employee.join_date {
        return Err(ValidationError::LastWorkingDateBeforeJoin {
            join_date: employee.join_date,
            last_working_date: submission.last_working_date,
        });
    }

    if let Some(survey) = &submission.exit_survey {
        check_exit_survey(survey)?;
    }
    Ok(())
}

pub(crate) fn check_exit_survey(survey: &ExitSurvey) -> Result<(), ValidationError> {
    require(&survey.primary_reason, "primary_reason")?;
    if !(1..=5).contains(&survey.overall_satisfaction) {
        return Err(ValidationError::SatisfactionOutOfRange(
            survey.overall_satisfaction,
        ));
    }
    Ok(())
}
