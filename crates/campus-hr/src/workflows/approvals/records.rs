use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    ApprovalRole, Employee, EmployeeId, ExEmployee, LeaveRequest, LeaveStatus, PromotionRequest,
    PromotionStatus, RequestId, ResignationRequest, ResignationStatus,
};

/// Leave listing criteria. Unset fields match everything; set fields must all match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LeaveFilter {
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub status: Option<LeaveStatus>,
    /// Open leaves whose next pending step belongs to this role.
    #[serde(default)]
    pub awaiting: Option<ApprovalRole>,
    /// Case-insensitive match on the faculty captured at submission.
    #[serde(default)]
    pub faculty: Option<String>,
}

impl LeaveFilter {
    pub fn matches(&self, leave: &LeaveRequest) -> bool {
        self.employee_id
            .as_ref()
            .map_or(true, |wanted| &leave.employee_id.0 == wanted)
            && self.status.map_or(true, |wanted| leave.status == wanted)
            && self.awaiting.map_or(true, |role| {
                !leave.status.is_terminal()
                    && super::chain::awaiting_role(&leave.approval_chain) == Some(role)
            })
            && self
                .faculty
                .as_ref()
                .map_or(true, |wanted| leave.employee.faculty.eq_ignore_ascii_case(wanted))
    }
}

/// The whole persisted document: roster, request collections, and alumni.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HrRecords {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub leaves: Vec<LeaveRequest>,
    #[serde(default)]
    pub promotions: Vec<PromotionRequest>,
    #[serde(default)]
    pub resignations: Vec<ResignationRequest>,
    #[serde(default)]
    pub ex_employees: Vec<ExEmployee>,
    /// Last issued identifier sequence.
    #[serde(default)]
    pub sequence: u64,
}

impl HrRecords {
    pub(crate) fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}-{:06}", self.sequence)
    }

    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|employee| &employee.id == id)
    }

    pub(crate) fn employee_mut(&mut self, id: &EmployeeId) -> Option<&mut Employee> {
        self.employees.iter_mut().find(|employee| &employee.id == id)
    }

    pub fn leave(&self, id: &RequestId) -> Option<&LeaveRequest> {
        self.leaves.iter().find(|leave| &leave.id == id)
    }

    pub(crate) fn leave_mut(&mut self, id: &RequestId) -> Option<&mut LeaveRequest> {
        self.leaves.iter_mut().find(|leave| &leave.id == id)
    }

    pub fn promotion(&self, id: &RequestId) -> Option<&PromotionRequest> {
        self.promotions.iter().find(|promotion| &promotion.id == id)
    }

    pub fn resignation(&self, id: &RequestId) -> Option<&ResignationRequest> {
        self.resignations
            .iter()
            .find(|resignation| &resignation.id == id)
    }

    /// Every leave passing `filter`, in submission order.
    pub fn leaves_matching(&self, filter: &LeaveFilter) -> Vec<LeaveRequest> {
        self.leaves
            .iter()
            .filter(|leave| filter.matches(leave))
            .cloned()
            .collect()
    }

    pub fn leaves_by_employee(&self, employee_id: &EmployeeId) -> Vec<LeaveRequest> {
        self.leaves_matching(&LeaveFilter {
            employee_id: Some(employee_id.0.clone()),
            ..LeaveFilter::default()
        })
    }

    /// Leaves still moving through their chain.
    pub fn pending_leaves(&self) -> Vec<LeaveRequest> {
        self.leaves
            .iter()
            .filter(|leave| !leave.status.is_terminal())
            .cloned()
            .collect()
    }

    pub fn leaves_awaiting(&self, role: ApprovalRole) -> Vec<LeaveRequest> {
        self.leaves_matching(&LeaveFilter {
            awaiting: Some(role),
            ..LeaveFilter::default()
        })
    }

    pub fn leaves_for_faculty(&self, faculty: &str) -> Vec<LeaveRequest> {
        self.leaves_matching(&LeaveFilter {
            faculty: Some(faculty.to_string()),
            ..LeaveFilter::default()
        })
    }

    pub fn leaves_with_status(&self, status: LeaveStatus) -> Vec<LeaveRequest> {
        self.leaves_matching(&LeaveFilter {
            status: Some(status),
            ..LeaveFilter::default()
        })
    }

    /// Promotions filtered by status and a case-insensitive name/department search.
    pub fn search_promotions(
        &self,
        status: Option<PromotionStatus>,
        search: Option<&str>,
    ) -> Vec<PromotionRequest> {
        let needle = search
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty());

        self.promotions
            .iter()
            .filter(|promotion| status.map_or(true, |wanted| promotion.status == wanted))
            .filter(|promotion| match &needle {
                Some(term) => {
                    promotion.employee.name.to_lowercase().contains(term)
                        || promotion.employee.department.to_lowercase().contains(term)
                }
                None => true,
            })
            .cloned()
            .collect()
    }

    pub fn resignations_with_status(
        &self,
        status: Option<ResignationStatus>,
    ) -> Vec<ResignationRequest> {
        self.resignations
            .iter()
            .filter(|resignation| status.map_or(true, |wanted| resignation.status == wanted))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> RecordsSummary {
        RecordsSummary {
            employees_by_status: count_by(self.employees.iter().map(|e| e.status.label())),
            leaves_by_status: count_by(self.leaves.iter().map(|l| l.status.label())),
            promotions_by_status: count_by(self.promotions.iter().map(|p| p.status.label())),
            resignations_by_status: count_by(self.resignations.iter().map(|r| r.status.label())),
            ex_employees: self.ex_employees.len(),
        }
    }
}

fn count_by<'a>(labels: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Dashboard counts across all collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordsSummary {
    pub employees_by_status: BTreeMap<String, usize>,
    pub leaves_by_status: BTreeMap<String, usize>,
    pub promotions_by_status: BTreeMap<String, usize>,
    pub resignations_by_status: BTreeMap<String, usize>,
    pub ex_employees: usize,
}

/// Durable storage for the records document. Saves happen after the in-memory commit.
pub trait RecordStore: Send + Sync {
    fn load(&self) -> Result<Option<HrRecords>, StoreError>;
    fn save(&self, records: &HrRecords) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
