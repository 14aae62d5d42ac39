//! Mutations applied to the roster once a request reaches its terminal approval.

use chrono::NaiveDate;

use super::domain::{
    EmployeeId, ExEmployee, LeaveRequest, PromotionRequest, PromotionStatus,
    ResignationRequest, ResignationStatus,
};
use super::records::HrRecords;

const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("employee {0} not found on the active roster")]
    EmployeeNotFound(EmployeeId),
}

/// Deduct an approved leave from the employee's balance, floored at zero. Types without a
/// tracked balance are left alone.
pub fn apply_leave_approval(records: &mut HrRecords, leave: &LeaveRequest) -> Result<(), EffectError> {
    let employee = records
        .employee_mut(&leave.employee_id)
        .ok_or_else(|| EffectError::EmployeeNotFound(leave.employee_id.clone()))?;

    if let Some(balance) = employee.leave_balance.get_mut(&leave.leave_type) {
        *balance = balance.saturating_sub(leave.days);
    }
    Ok(())
}

pub fn apply_promotion(
    records: &mut HrRecords,
    promotion: &mut PromotionRequest,
    on: NaiveDate,
) -> Result<(), EffectError> {
    let employee = records
        .employee_mut(&promotion.employee_id)
        .ok_or_else(|| EffectError::EmployeeNotFound(promotion.employee_id.clone()))?;

    employee.designation = promotion.requested_designation;
    promotion.status = PromotionStatus::Approved;
    promotion.approved_on = Some(on);
    Ok(())
}

/// Whole years between joining and leaving, using 365.25-day years.
pub fn years_of_service(join_date: NaiveDate, last_working_date: NaiveDate) -> u32 {
    let days = (last_working_date - join_date).num_days();
    if days <= 0 {
        return 0;
    }
    (days as f64 / DAYS_PER_YEAR).floor() as u32
}

/// Move the resigning employee into the alumni set and close the resignation.
pub fn apply_resignation(
    records: &mut HrRecords,
    resignation: &mut ResignationRequest,
    on: NaiveDate,
) -> Result<ExEmployee, EffectError> {
    let position = records
        .employees
        .iter()
        .position(|employee| employee.id == resignation.employee_id)
        .ok_or_else(|| EffectError::EmployeeNotFound(resignation.employee_id.clone()))?;

    let employee = records.employees.remove(position);

    let alumni = ExEmployee {
        id: format!("ex-{}", employee.id),
        employee_id: employee.id.clone(),
        name: employee.name,
        email: employee.email,
        department: employee.department,
        faculty: employee.faculty,
        designation: employee.designation,
        join_date: employee.join_date,
        exit_date: resignation.last_working_date,
        years_of_service: years_of_service(employee.join_date, resignation.last_working_date),
        exit_reason: resignation.reason.clone(),
        exit_survey: resignation.exit_survey.clone(),
    };

    records.ex_employees.push(alumni.clone());
    resignation.status = ResignationStatus::Completed;
    resignation.processed_on = Some(on);
    Ok(alumni)
}
