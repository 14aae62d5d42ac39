use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::catalog::default_leave_balance;
use super::chain::{self, ApprovalAction, ChainError};
use super::domain::{
    ApprovalRole, CommitteeReview, Decision, Employee, EmployeeId, EmployeeStatus,
    EmployeeUpdate, EmploymentStatus, ExEmployee, ExitSurvey, HandoverStatus, HrDecision,
    LeaveRequest, LeaveStatus, NewEmployee, NewLeave, NewPromotion, NewResignation,
    PromotionRequest, PromotionStatus, RequestId, ResignationRequest, ResignationStatus,
    StepStatus,
};
use super::effects::{self, EffectError};
use super::eligibility::{
    calculate_probation_end_date, validate_maternity_eligibility, MaternityEligibility,
    DEFAULT_PROBATION_MONTHS,
};
use super::records::{HrRecords, LeaveFilter, RecordStore, RecordsSummary, StoreError};
use super::validation::{self, ValidationError};

/// Rules applied at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeavePolicy {
    /// Block maternity requests failing eligibility or notice checks.
    pub enforce_maternity_rules: bool,
    pub probation_months: u32,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            enforce_maternity_rules: true,
            probation_months: DEFAULT_PROBATION_MONTHS,
        }
    }
}

/// HR actions on a promotion short of final approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PromotionUpdate {
    ScheduleCommittee {
        meeting_date: NaiveDate,
        notes: String,
        scheduled_by: String,
    },
    Reject {
        decided_by: String,
        #[serde(default)]
        notes: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResignationUpdate {
    Approve { approved_by: String },
    Handover { status: HandoverStatus },
    ExitSurvey { survey: ExitSurvey },
}

/// Owns the roster and every request collection. Each mutation runs against a working
/// copy under one lock and replaces the committed records only when it succeeds.
/// Snapshots are written to the store after that lock is released.
pub struct HrRequestService<S> {
    records: Mutex<HrRecords>,
    generation: AtomicU64,
    persisted: Mutex<u64>,
    store: Arc<S>,
    policy: LeavePolicy,
}

impl<S> HrRequestService<S>
where
    S: RecordStore + 'static,
{
    /// Hydrate from the store, starting empty when it holds nothing yet.
    pub fn new(store: Arc<S>, policy: LeavePolicy) -> Result<Self, HrServiceError> {
        let records = store.load()?.unwrap_or_default();
        info!(
            employees = records.employees.len(),
            leaves = records.leaves.len(),
            "hr records loaded"
        );
        Ok(Self::with_records(records, store, policy))
    }

    pub fn with_records(records: HrRecords, store: Arc<S>, policy: LeavePolicy) -> Self {
        Self {
            records: Mutex::new(records),
            generation: AtomicU64::new(0),
            persisted: Mutex::new(0),
            store,
            policy,
        }
    }

    pub fn policy(&self) -> LeavePolicy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, HrRecords> {
        // Committed records are only ever replaced wholesale, so a poisoned guard still
        // holds a consistent document.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut HrRecords) -> Result<T, HrServiceError>,
    ) -> Result<T, HrServiceError> {
        let (outcome, snapshot, generation) = {
            let mut committed = self.lock();
            let mut working = committed.clone();
            let outcome = op(&mut working)?;
            *committed = working;
            // Bumped under the records lock so generations follow commit order.
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (outcome, committed.clone(), generation)
        };

        self.persist(&snapshot, generation);
        Ok(outcome)
    }

    /// Writes are serialized and a snapshot older than the last one written is dropped.
    fn persist(&self, snapshot: &HrRecords, generation: u64) {
        let mut saved = self.persisted.lock().unwrap_or_else(PoisonError::into_inner);
        if *saved >= generation {
            debug!(generation, saved = *saved, "newer hr records already persisted");
            return;
        }
        match self.store.save(snapshot) {
            Ok(()) => *saved = generation,
            Err(error) => warn!(
                %error,
                generation,
                "failed to persist hr records; in-memory state kept"
            ),
        }
    }

    /// Register a new employee with the default leave balance.
    pub fn add_employee(&self, submission: NewEmployee) -> Result<Employee, HrServiceError> {
        let probation_months = self.policy.probation_months;
        self.mutate(|records| {
            validation::check_new_employee(&submission, &records.employees)?;

            let probation_end_date = match submission.employment_status {
                EmploymentStatus::Probation => Some(
                    calculate_probation_end_date(submission.join_date, probation_months).ok_or(
                        ValidationError::ProbationOutOfRange {
                            join_date: submission.join_date,
                            probation_months,
                        },
                    )?,
                ),
                EmploymentStatus::Confirmed => None,
            };

            let employee = Employee {
                id: EmployeeId(records.next_id("EMP")),
                code: submission.code.trim().to_string(),
                name: submission.name,
                email: submission.email,
                gender: submission.gender,
                department: submission.department,
                faculty: submission.faculty,
                designation: submission.designation,
                join_date: submission.join_date,
                employment_status: submission.employment_status,
                probation_end_date,
                status: EmployeeStatus::Active,
                salary_base: submission.salary_base,
                leave_balance: default_leave_balance(submission.gender),
            };

            records.employees.push(employee.clone());
            info!(employee_id = %employee.id, code = %employee.code, "employee registered");
            Ok(employee)
        })
    }

    pub fn update_employee(
        &self,
        id: &EmployeeId,
        update: EmployeeUpdate,
    ) -> Result<Employee, HrServiceError> {
        self.mutate(|records| {
            let employee = records
                .employee_mut(id)
                .ok_or_else(|| HrServiceError::EmployeeNotFound(id.clone()))?;

            if let Some(name) = update.name {
                employee.name = name;
            }
            if let Some(email) = update.email {
                employee.email = email;
            }
            if let Some(department) = update.department {
                employee.department = department;
            }
            if let Some(faculty) = update.faculty {
                employee.faculty = faculty;
            }
            validation::check_placement(&employee.department, &employee.faculty)?;
            if let Some(status) = update.employment_status {
                employee.employment_status = status;
                if status == EmploymentStatus::Confirmed {
                    employee.probation_end_date = None;
                }
            }

            debug!(employee_id = %employee.id, "employee profile updated");
            Ok(employee.clone())
        })
    }

    pub fn employee(&self, id: &EmployeeId) -> Result<Employee, HrServiceError> {
        self.lock()
            .employee(id)
            .cloned()
            .ok_or_else(|| HrServiceError::EmployeeNotFound(id.clone()))
    }

    pub fn employees(&self) -> Vec<Employee> {
        self.lock().employees.clone()
    }

    /// Advisory check; a missing employee yields an ineligible result, not an error.
    pub fn maternity_eligibility(&self, id: &EmployeeId) -> MaternityEligibility {
        let records = self.lock();
        validate_maternity_eligibility(records.employee(id))
    }

    /// File a leave request with its type-specific approval chain.
    pub fn add_leave(
        &self,
        submission: NewLeave,
        today: NaiveDate,
    ) -> Result<LeaveRequest, HrServiceError> {
        let enforce = self.policy.enforce_maternity_rules;
        self.mutate(|records| {
            let employee = records
                .employee(&submission.employee_id)
                .ok_or_else(|| HrServiceError::EmployeeNotFound(submission.employee_id.clone()))?;
            let days = validation::check_new_leave(&submission, employee, enforce, today)?;
            let snapshot = employee.snapshot();

            let approval_chain = chain::initialize_chain(submission.leave_type);
            let current_approver = chain::awaiting_role(&approval_chain);
            let leave = LeaveRequest {
                id: RequestId(records.next_id("LV")),
                employee_id: submission.employee_id,
                employee: snapshot,
                leave_type: submission.leave_type,
                start_date: submission.start_date,
                end_date: submission.end_date,
                days,
                reason: submission.reason,
                status: LeaveStatus::Pending,
                applied_on: today,
                approval_chain,
                current_approver,
                paid_days: None,
                unpaid_days: None,
                leave_category: None,
                reviewed_by: None,
                reviewed_on: None,
                expected_delivery_date: submission.expected_delivery_date,
            };

            records.leaves.push(leave.clone());
            info!(
                request_id = %leave.id,
                employee_id = %leave.employee_id,
                leave_type = leave.leave_type.id(),
                days = leave.days,
                "leave request filed"
            );
            Ok(leave)
        })
    }

    /// Record an approver decision on a leave request. The acting role must be the one the
    /// chain is waiting on; a final approval deducts the leave balance in the same commit.
    pub fn update_leave_status(
        &self,
        id: &RequestId,
        action: &ApprovalAction,
        today: NaiveDate,
    ) -> Result<LeaveRequest, HrServiceError> {
        self.mutate(|records| {
            let leave = records
                .leave_mut(id)
                .ok_or_else(|| HrServiceError::RequestNotFound(id.clone()))?;
            chain::ensure_chain(leave);

            if leave.status.is_terminal() {
                return Err(HrServiceError::InvalidTransition {
                    id: id.clone(),
                    from: leave.status.label(),
                    action: "decide",
                });
            }
            ensure_turn(leave, action.role)?;

            let status = chain::advance(leave, action, today)?;
            let updated = leave.clone();
            info!(
                request_id = %updated.id,
                role = ?action.role,
                decision = ?action.decision,
                status = status.label(),
                "leave decision recorded"
            );

            if status == LeaveStatus::Approved {
                effects::apply_leave_approval(records, &updated)?;
                info!(
                    request_id = %updated.id,
                    employee_id = %updated.employee_id,
                    days = updated.days,
                    "leave balance deducted"
                );
            }
            Ok(updated)
        })
    }

    pub fn leave(&self, id: &RequestId) -> Result<LeaveRequest, HrServiceError> {
        self.lock()
            .leave(id)
            .cloned()
            .ok_or_else(|| HrServiceError::RequestNotFound(id.clone()))
    }

    pub fn leaves(&self) -> Vec<LeaveRequest> {
        self.lock().leaves.clone()
    }

    pub fn leaves_matching(&self, filter: &LeaveFilter) -> Vec<LeaveRequest> {
        self.lock().leaves_matching(filter)
    }

    pub fn leaves_by_employee(&self, employee_id: &EmployeeId) -> Vec<LeaveRequest> {
        self.lock().leaves_by_employee(employee_id)
    }

    pub fn pending_leaves(&self) -> Vec<LeaveRequest> {
        self.lock().pending_leaves()
    }

    pub fn leaves_awaiting(&self, role: ApprovalRole) -> Vec<LeaveRequest> {
        self.lock().leaves_awaiting(role)
    }

    pub fn leaves_for_faculty(&self, faculty: &str) -> Vec<LeaveRequest> {
        self.lock().leaves_for_faculty(faculty)
    }

    pub fn leaves_with_status(&self, status: LeaveStatus) -> Vec<LeaveRequest> {
        self.lock().leaves_with_status(status)
    }

    pub fn add_promotion(
        &self,
        submission: NewPromotion,
        today: NaiveDate,
    ) -> Result<PromotionRequest, HrServiceError> {
        self.mutate(|records| {
            let employee = records
                .employee(&submission.employee_id)
                .ok_or_else(|| HrServiceError::EmployeeNotFound(submission.employee_id.clone()))?;
            validation::check_new_promotion(&submission, employee)?;
            let snapshot = employee.snapshot();

            let open = records.promotions.iter().any(|promotion| {
                promotion.employee_id == submission.employee_id
                    && matches!(
                        promotion.status,
                        PromotionStatus::Pending | PromotionStatus::UnderReview
                    )
            });
            if open {
                return Err(ValidationError::OpenRequestExists("promotion").into());
            }

            let promotion = PromotionRequest {
                id: RequestId(records.next_id("PR")),
                employee_id: submission.employee_id,
                employee: snapshot,
                requested_designation: submission.requested_designation,
                justification: submission.justification,
                status: PromotionStatus::Pending,
                applied_on: today,
                committee_review: None,
                hr_decision: None,
                approved_on: None,
            };

            records.promotions.push(promotion.clone());
            info!(
                request_id = %promotion.id,
                employee_id = %promotion.employee_id,
                requested = promotion.requested_designation.label(),
                "promotion request filed"
            );
            Ok(promotion)
        })
    }

    pub fn update_promotion_status(
        &self,
        id: &RequestId,
        update: PromotionUpdate,
        today: NaiveDate,
    ) -> Result<PromotionRequest, HrServiceError> {
        self.mutate(|records| {
            let promotion = records
                .promotions
                .iter_mut()
                .find(|promotion| &promotion.id == id)
                .ok_or_else(|| HrServiceError::RequestNotFound(id.clone()))?;

            if !matches!(
                promotion.status,
                PromotionStatus::Pending | PromotionStatus::UnderReview
            ) {
                return Err(HrServiceError::InvalidTransition {
                    id: id.clone(),
                    from: promotion.status.label(),
                    action: update.label(),
                });
            }

            match update {
                PromotionUpdate::ScheduleCommittee {
                    meeting_date,
                    notes,
                    scheduled_by,
                } => {
                    promotion.status = PromotionStatus::UnderReview;
                    promotion.committee_review = Some(CommitteeReview {
                        meeting_date,
                        notes,
                        scheduled_by,
                        date: today,
                    });
                    info!(request_id = %promotion.id, %meeting_date, "promotion committee scheduled");
                }
                PromotionUpdate::Reject { decided_by, notes } => {
                    promotion.status = PromotionStatus::Rejected;
                    promotion.hr_decision = Some(HrDecision {
                        decision: Decision::Rejected,
                        decided_by,
                        notes,
                        date: today,
                    });
                    info!(request_id = %promotion.id, "promotion rejected");
                }
            }
            Ok(promotion.clone())
        })
    }

    /// Approve a promotion and move the employee to the requested designation.
    pub fn approve_promotion(
        &self,
        id: &RequestId,
        approver_name: &str,
        comment: Option<String>,
        today: NaiveDate,
    ) -> Result<PromotionRequest, HrServiceError> {
        self.mutate(|records| {
            let index = records
                .promotions
                .iter()
                .position(|promotion| &promotion.id == id)
                .ok_or_else(|| HrServiceError::RequestNotFound(id.clone()))?;

            let mut promotion = records.promotions[index].clone();
            if !matches!(
                promotion.status,
                PromotionStatus::Pending | PromotionStatus::UnderReview
            ) {
                return Err(HrServiceError::InvalidTransition {
                    id: id.clone(),
                    from: promotion.status.label(),
                    action: "approve",
                });
            }

            effects::apply_promotion(records, &mut promotion, today)?;
            promotion.hr_decision = Some(HrDecision {
                decision: Decision::Approved,
                decided_by: approver_name.to_string(),
                notes: comment,
                date: today,
            });
            records.promotions[index] = promotion.clone();

            info!(
                request_id = %promotion.id,
                employee_id = %promotion.employee_id,
                designation = promotion.requested_designation.label(),
                "promotion approved"
            );
            Ok(promotion)
        })
    }

    pub fn promotion(&self, id: &RequestId) -> Result<PromotionRequest, HrServiceError> {
        self.lock()
            .promotion(id)
            .cloned()
            .ok_or_else(|| HrServiceError::RequestNotFound(id.clone()))
    }

    pub fn promotions(
        &self,
        status: Option<PromotionStatus>,
        search: Option<&str>,
    ) -> Vec<PromotionRequest> {
        self.lock().search_promotions(status, search)
    }

    pub fn add_resignation(
        &self,
        submission: NewResignation,
        today: NaiveDate,
    ) -> Result<ResignationRequest, HrServiceError> {
        self.mutate(|records| {
            let employee = records
                .employee(&submission.employee_id)
                .ok_or_else(|| HrServiceError::EmployeeNotFound(submission.employee_id.clone()))?;
            validation::check_new_resignation(&submission, employee)?;
            let snapshot = employee.snapshot();

            let open = records.resignations.iter().any(|resignation| {
                resignation.employee_id == submission.employee_id
                    && resignation.status != ResignationStatus::Completed
            });
            if open {
                return Err(ValidationError::OpenRequestExists("resignation").into());
            }

            let resignation = ResignationRequest {
                id: RequestId(records.next_id("RS")),
                employee_id: submission.employee_id,
                employee: snapshot,
                reason: submission.reason,
                notice_period_days: submission.notice_period_days,
                last_working_date: submission.last_working_date,
                status: ResignationStatus::Pending,
                applied_on: today,
                exit_survey: submission.exit_survey,
                handover_status: HandoverStatus::NotStarted,
                approved_by: None,
                approved_on: None,
                processed_on: None,
            };

            records.resignations.push(resignation.clone());
            info!(
                request_id = %resignation.id,
                employee_id = %resignation.employee_id,
                last_working_date = %resignation.last_working_date,
                "resignation filed"
            );
            Ok(resignation)
        })
    }

    pub fn update_resignation_status(
        &self,
        id: &RequestId,
        update: ResignationUpdate,
        today: NaiveDate,
    ) -> Result<ResignationRequest, HrServiceError> {
        self.mutate(|records| {
            let resignation = records
                .resignations
                .iter_mut()
                .find(|resignation| &resignation.id == id)
                .ok_or_else(|| HrServiceError::RequestNotFound(id.clone()))?;

            let allowed = match &update {
                ResignationUpdate::Approve { .. } => {
                    resignation.status == ResignationStatus::Pending
                }
                ResignationUpdate::Handover { .. } | ResignationUpdate::ExitSurvey { .. } => {
                    resignation.status != ResignationStatus::Completed
                }
            };
            if !allowed {
                return Err(HrServiceError::InvalidTransition {
                    id: id.clone(),
                    from: resignation.status.label(),
                    action: update.label(),
                });
            }

            match update {
                ResignationUpdate::Approve { approved_by } => {
                    resignation.status = ResignationStatus::Approved;
                    resignation.approved_by = Some(approved_by);
                    resignation.approved_on = Some(today);
                    info!(request_id = %resignation.id, "resignation approved");
                }
                ResignationUpdate::Handover { status } => {
                    resignation.handover_status = status;
                    debug!(request_id = %resignation.id, ?status, "handover status updated");
                }
                ResignationUpdate::ExitSurvey { survey } => {
                    validation::check_exit_survey(&survey)?;
                    resignation.exit_survey = Some(survey);
                    debug!(request_id = %resignation.id, "exit survey recorded");
                }
            }
            Ok(resignation.clone())
        })
    }

    /// Move an approved resignation's employee into the alumni set.
    pub fn process_resignation(
        &self,
        id: &RequestId,
        today: NaiveDate,
    ) -> Result<ExEmployee, HrServiceError> {
        self.mutate(|records| {
            let index = records
                .resignations
                .iter()
                .position(|resignation| &resignation.id == id)
                .ok_or_else(|| HrServiceError::RequestNotFound(id.clone()))?;

            let mut resignation = records.resignations[index].clone();
            if resignation.status != ResignationStatus::Approved {
                return Err(HrServiceError::InvalidTransition {
                    id: id.clone(),
                    from: resignation.status.label(),
                    action: "process",
                });
            }

            let alumni = effects::apply_resignation(records, &mut resignation, today)?;
            records.resignations[index] = resignation;

            info!(
                request_id = %id,
                employee_id = %alumni.employee_id,
                years_of_service = alumni.years_of_service,
                "resignation processed; employee moved to alumni"
            );
            Ok(alumni)
        })
    }

    pub fn resignation(&self, id: &RequestId) -> Result<ResignationRequest, HrServiceError> {
        self.lock()
            .resignation(id)
            .cloned()
            .ok_or_else(|| HrServiceError::RequestNotFound(id.clone()))
    }

    pub fn resignations(&self, status: Option<ResignationStatus>) -> Vec<ResignationRequest> {
        self.lock().resignations_with_status(status)
    }

    pub fn ex_employees(&self) -> Vec<ExEmployee> {
        self.lock().ex_employees.clone()
    }

    pub fn summary(&self) -> RecordsSummary {
        self.lock().summary()
    }

    pub fn snapshot(&self) -> HrRecords {
        self.lock().clone()
    }
}

fn ensure_turn(leave: &LeaveRequest, role: ApprovalRole) -> Result<(), ChainError> {
    let step = leave
        .approval_chain
        .iter()
        .find(|step| step.role == role)
        .ok_or_else(|| ChainError::RoleNotInChain {
            request_id: leave.id.clone(),
            role,
        })?;

    if step.status != StepStatus::Pending {
        return Err(ChainError::StepAlreadyDecided {
            request_id: leave.id.clone(),
            role,
        });
    }

    let awaiting = chain::awaiting_role(&leave.approval_chain);
    if awaiting != Some(role) {
        return Err(ChainError::OutOfOrder {
            request_id: leave.id.clone(),
            role,
            awaiting,
        });
    }
    Ok(())
}

impl PromotionUpdate {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ScheduleCommittee { .. } => "schedule_committee",
            Self::Reject { .. } => "reject",
        }
    }
}

impl ResignationUpdate {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Handover { .. } => "handover",
            Self::ExitSurvey { .. } => "exit_survey",
        }
    }
}

/// Error raised by the request service.
#[derive(Debug, thiserror::Error)]
pub enum HrServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Effect(#[from] EffectError),
    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),
    #[error("request {0} not found")]
    RequestNotFound(RequestId),
    #[error("request {id} is {from}; cannot {action}")]
    InvalidTransition {
        id: RequestId,
        from: &'static str,
        action: &'static str,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}
