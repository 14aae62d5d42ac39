use std::sync::{mpsc, Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::approvals::catalog::{Designation, LeaveType};
use crate::workflows::approvals::chain::{ApprovalAction, DecisionMetadata};
use crate::workflows::approvals::domain::{
    ApprovalRole, Decision, Employee, EmploymentStatus, Gender, NewEmployee, NewLeave,
    NewPromotion, NewResignation,
};
use crate::workflows::approvals::records::{HrRecords, RecordStore, StoreError};
use crate::workflows::approvals::{approvals_router, HrRequestService, LeavePolicy};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2025, 3, 3)
}

pub(super) fn new_employee(code: &str, name: &str, gender: Gender) -> NewEmployee {
    NewEmployee {
        code: code.to_string(),
        name: name.to_string(),
        email: format!("{}@campus.edu", code.to_lowercase()),
        gender,
        department: "CS".to_string(),
        faculty: "Computing".to_string(),
        designation: Designation::Lecturer,
        join_date: date(2019, 8, 1),
        employment_status: EmploymentStatus::Confirmed,
        salary_base: 85_000,
    }
}

pub(super) fn senior_lecturer() -> NewEmployee {
    NewEmployee {
        designation: Designation::SeniorLecturer,
        department: "EE".to_string(),
        faculty: "Engineering".to_string(),
        ..new_employee("ENG-014", "Ravi Menon", Gender::Male)
    }
}

pub(super) fn veteran() -> NewEmployee {
    NewEmployee {
        join_date: date(2015, 6, 1),
        ..new_employee("CMP-003", "Grace Hopper", Gender::Female)
    }
}

pub(super) fn probationer() -> NewEmployee {
    NewEmployee {
        join_date: date(2025, 1, 6),
        employment_status: EmploymentStatus::Probation,
        ..new_employee("CMP-099", "Nadia Rahman", Gender::Female)
    }
}

pub(super) fn leave_request(employee: &Employee, leave_type: LeaveType, days: i64) -> NewLeave {
    let start_date = date(2025, 4, 7);
    NewLeave {
        employee_id: employee.id.clone(),
        leave_type,
        start_date,
        end_date: start_date + chrono::Duration::days(days - 1),
        reason: "Family commitments".to_string(),
        expected_delivery_date: None,
    }
}

pub(super) fn promotion_request(employee: &Employee, requested: Designation) -> NewPromotion {
    NewPromotion {
        employee_id: employee.id.clone(),
        requested_designation: requested,
        justification: "Twelve journal papers and two funded grants".to_string(),
    }
}

pub(super) fn resignation_request(
    employee: &Employee,
    last_working_date: NaiveDate,
) -> NewResignation {
    NewResignation {
        employee_id: employee.id.clone(),
        reason: "Relocating abroad".to_string(),
        notice_period_days: 30,
        last_working_date,
        exit_survey: None,
    }
}

pub(super) fn act(role: ApprovalRole, decision: Decision) -> ApprovalAction {
    ApprovalAction {
        role,
        decision,
        approver_name: format!("{} on duty", role.label()),
        comment: None,
        metadata: DecisionMetadata::default(),
    }
}

pub(super) fn build_service() -> (HrRequestService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = HrRequestService::new(store.clone(), LeavePolicy::default())
        .expect("memory store loads");
    (service, store)
}

pub(super) fn router_with_service(service: HrRequestService<MemoryStore>) -> axum::Router {
    approvals_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    saved: Arc<Mutex<Option<HrRecords>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub(super) fn seeded(records: HrRecords) -> Self {
        Self {
            saved: Arc::new(Mutex::new(Some(records))),
            saves: Arc::default(),
        }
    }

    pub(super) fn last_saved(&self) -> Option<HrRecords> {
        self.saved.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn save_count(&self) -> usize {
        *self.saves.lock().expect("store mutex poisoned")
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<Option<HrRecords>, StoreError> {
        Ok(self.last_saved())
    }

    fn save(&self, records: &HrRecords) -> Result<(), StoreError> {
        *self.saved.lock().expect("store mutex poisoned") = Some(records.clone());
        *self.saves.lock().expect("store mutex poisoned") += 1;
        Ok(())
    }
}

/// Loads fine but never manages to write.
pub(super) struct ReadOnlyStore;

impl RecordStore for ReadOnlyStore {
    fn load(&self) -> Result<Option<HrRecords>, StoreError> {
        Ok(None)
    }

    fn save(&self, _records: &HrRecords) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}

/// Parks every save until the test releases it, announcing each one as it starts.
pub(super) struct GatedStore {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl GatedStore {
    pub(super) fn new() -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = Self {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        (store, entered_rx, release_tx)
    }
}

impl RecordStore for GatedStore {
    fn load(&self) -> Result<Option<HrRecords>, StoreError> {
        Ok(None)
    }

    fn save(&self, _records: &HrRecords) -> Result<(), StoreError> {
        self.entered
            .lock()
            .expect("gate mutex poisoned")
            .send(())
            .expect("test listens for saves");
        self.release
            .lock()
            .expect("gate mutex poisoned")
            .recv()
            .expect("test releases saves");
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn load(&self) -> Result<Option<HrRecords>, StoreError> {
        Err(StoreError::Unavailable("volume not mounted".to_string()))
    }

    fn save(&self, _records: &HrRecords) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("volume not mounted".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
