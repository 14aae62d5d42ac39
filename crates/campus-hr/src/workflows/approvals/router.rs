use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::chain::ApprovalAction;
use super::domain::{
    Decision, EmployeeId, EmployeeUpdate, ExitSurvey, HandoverStatus, NewEmployee, NewLeave,
    NewPromotion, NewResignation, PromotionStatus, RequestId, ResignationStatus,
};
use super::eligibility::validate_advance_notice;
use super::records::{LeaveFilter, RecordStore};
use super::service::{HrRequestService, HrServiceError, PromotionUpdate, ResignationUpdate};
use crate::error::AppError;

type SharedService<S> = Arc<HrRequestService<S>>;

/// Router exposing the approval workflows under `/api/v1`.
pub fn approvals_router<S>(service: SharedService<S>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/employees", post(create_employee_handler::<S>))
        .route(
            "/api/v1/employees/:employee_id",
            get(employee_handler::<S>).patch(update_employee_handler::<S>),
        )
        .route(
            "/api/v1/employees/:employee_id/maternity-eligibility",
            get(maternity_eligibility_handler::<S>),
        )
        .route(
            "/api/v1/leaves",
            post(create_leave_handler::<S>).get(list_leaves_handler::<S>),
        )
        .route(
            "/api/v1/leaves/maternity/validate-notice",
            post(validate_notice_handler),
        )
        .route("/api/v1/leaves/:leave_id", get(leave_handler::<S>))
        .route(
            "/api/v1/leaves/:leave_id/decisions",
            post(leave_decision_handler::<S>),
        )
        .route(
            "/api/v1/promotions",
            post(create_promotion_handler::<S>).get(list_promotions_handler::<S>),
        )
        .route("/api/v1/promotions/:promotion_id", get(promotion_handler::<S>))
        .route(
            "/api/v1/promotions/:promotion_id/schedule-committee",
            post(schedule_committee_handler::<S>),
        )
        .route(
            "/api/v1/promotions/:promotion_id/decisions",
            post(promotion_decision_handler::<S>),
        )
        .route(
            "/api/v1/resignations",
            post(create_resignation_handler::<S>).get(list_resignations_handler::<S>),
        )
        .route(
            "/api/v1/resignations/:resignation_id",
            get(resignation_handler::<S>),
        )
        .route(
            "/api/v1/resignations/:resignation_id/approve",
            post(approve_resignation_handler::<S>),
        )
        .route(
            "/api/v1/resignations/:resignation_id/handover",
            post(handover_handler::<S>),
        )
        .route(
            "/api/v1/resignations/:resignation_id/exit-survey",
            post(exit_survey_handler::<S>),
        )
        .route(
            "/api/v1/resignations/:resignation_id/process",
            post(process_resignation_handler::<S>),
        )
        .route("/api/v1/ex-employees", get(ex_employees_handler::<S>))
        .route("/api/v1/summary", get(summary_handler::<S>))
        .with_state(service)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn respond<T, E>(result: Result<T, E>, success: StatusCode) -> Response
where
    T: Serialize,
    E: Into<AppError>,
{
    match result {
        Ok(body) => (success, axum::Json(body)).into_response(),
        Err(error) => error.into().into_response(),
    }
}

/// Mutations may write the record store, so they run on the blocking pool.
async fn blocking<S, T>(
    service: SharedService<S>,
    op: impl FnOnce(&HrRequestService<S>) -> Result<T, HrServiceError> + Send + 'static,
) -> Result<T, AppError>
where
    S: RecordStore + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(move || op(&service)).await??)
}

pub(crate) async fn create_employee_handler<S>(
    State(service): State<SharedService<S>>,
    axum::Json(submission): axum::Json<NewEmployee>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(
        blocking(service, move |service| service.add_employee(submission)).await,
        StatusCode::CREATED,
    )
}

pub(crate) async fn employee_handler<S>(
    State(service): State<SharedService<S>>,
    Path(employee_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(service.employee(&EmployeeId(employee_id)), StatusCode::OK)
}

pub(crate) async fn update_employee_handler<S>(
    State(service): State<SharedService<S>>,
    Path(employee_id): Path<String>,
    axum::Json(update): axum::Json<EmployeeUpdate>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(
        blocking(service, move |service| {
            service.update_employee(&EmployeeId(employee_id), update)
        })
        .await,
        StatusCode::OK,
    )
}

pub(crate) async fn maternity_eligibility_handler<S>(
    State(service): State<SharedService<S>>,
    Path(employee_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    let eligibility = service.maternity_eligibility(&EmployeeId(employee_id));
    (StatusCode::OK, axum::Json(eligibility)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct NoticeRequest {
    #[serde(default)]
    pub(crate) expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) application_date: Option<NaiveDate>,
}

pub(crate) async fn validate_notice_handler(
    axum::Json(request): axum::Json<NoticeRequest>,
) -> Response {
    let application_date = request.application_date.unwrap_or_else(today);
    let check = validate_advance_notice(request.expected_delivery_date, application_date);
    (StatusCode::OK, axum::Json(check)).into_response()
}

pub(crate) async fn create_leave_handler<S>(
    State(service): State<SharedService<S>>,
    axum::Json(submission): axum::Json<NewLeave>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(
        blocking(service, move |service| service.add_leave(submission, today())).await,
        StatusCode::CREATED,
    )
}

pub(crate) async fn list_leaves_handler<S>(
    State(service): State<SharedService<S>>,
    Query(filter): Query<LeaveFilter>,
) -> Response
where
    S: RecordStore + 'static,
{
    (StatusCode::OK, axum::Json(service.leaves_matching(&filter))).into_response()
}

pub(crate) async fn leave_handler<S>(
    State(service): State<SharedService<S>>,
    Path(leave_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(service.leave(&RequestId(leave_id)), StatusCode::OK)
}

pub(crate) async fn leave_decision_handler<S>(
    State(service): State<SharedService<S>>,
    Path(leave_id): Path<String>,
    axum::Json(action): axum::Json<ApprovalAction>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(
        blocking(service, move |service| {
            service.update_leave_status(&RequestId(leave_id), &action, today())
        })
        .await,
        StatusCode::OK,
    )
}

pub(crate) async fn create_promotion_handler<S>(
    State(service): State<SharedService<S>>,
    axum::Json(submission): axum::Json<NewPromotion>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(
        blocking(service, move |service| service.add_promotion(submission, today())).await,
        StatusCode::CREATED,
    )
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PromotionQuery {
    #[serde(default)]
    pub(crate) status: Option<PromotionStatus>,
    #[serde(default)]
    pub(crate) search: Option<String>,
}

pub(crate) async fn list_promotions_handler<S>(
    State(service): State<SharedService<S>>,
    Query(query): Query<PromotionQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let promotions = service.promotions(query.status, query.search.as_deref());
    (StatusCode::OK, axum::Json(promotions)).into_response()
}

pub(crate) async fn promotion_handler<S>(
    State(service): State<SharedService<S>>,
    Path(promotion_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(service.promotion(&RequestId(promotion_id)), StatusCode::OK)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitteeRequest {
    pub(crate) meeting_date: NaiveDate,
    #[serde(default)]
    pub(crate) notes: String,
    pub(crate) scheduled_by: String,
}

pub(crate) async fn schedule_committee_handler<S>(
    State(service): State<SharedService<S>>,
    Path(promotion_id): Path<String>,
    axum::Json(request): axum::Json<CommitteeRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    let update = PromotionUpdate::ScheduleCommittee {
        meeting_date: request.meeting_date,
        notes: request.notes,
        scheduled_by: request.scheduled_by,
    };
    respond(
        blocking(service, move |service| {
            service.update_promotion_status(&RequestId(promotion_id), update, today())
        })
        .await,
        StatusCode::OK,
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct PromotionDecisionRequest {
    pub(crate) decision: Decision,
    pub(crate) approver_name: String,
    #[serde(default)]
    pub(crate) comment: Option<String>,
}

pub(crate) async fn promotion_decision_handler<S>(
    State(service): State<SharedService<S>>,
    Path(promotion_id): Path<String>,
    axum::Json(request): axum::Json<PromotionDecisionRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    let id = RequestId(promotion_id);
    let result = blocking(service, move |service| match request.decision {
        Decision::Approved => {
            service.approve_promotion(&id, &request.approver_name, request.comment, today())
        }
        Decision::Rejected => service.update_promotion_status(
            &id,
            PromotionUpdate::Reject {
                decided_by: request.approver_name,
                notes: request.comment,
            },
            today(),
        ),
    })
    .await;
    respond(result, StatusCode::OK)
}

pub(crate) async fn create_resignation_handler<S>(
    State(service): State<SharedService<S>>,
    axum::Json(submission): axum::Json<NewResignation>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(
        blocking(service, move |service| service.add_resignation(submission, today())).await,
        StatusCode::CREATED,
    )
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResignationQuery {
    #[serde(default)]
    pub(crate) status: Option<ResignationStatus>,
}

pub(crate) async fn list_resignations_handler<S>(
    State(service): State<SharedService<S>>,
    Query(query): Query<ResignationQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let resignations = service.resignations(query.status);
    (StatusCode::OK, axum::Json(resignations)).into_response()
}

pub(crate) async fn resignation_handler<S>(
    State(service): State<SharedService<S>>,
    Path(resignation_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(service.resignation(&RequestId(resignation_id)), StatusCode::OK)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApproveResignationRequest {
    pub(crate) approved_by: String,
}

pub(crate) async fn approve_resignation_handler<S>(
    State(service): State<SharedService<S>>,
    Path(resignation_id): Path<String>,
    axum::Json(request): axum::Json<ApproveResignationRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    let update = ResignationUpdate::Approve {
        approved_by: request.approved_by,
    };
    respond(
        blocking(service, move |service| {
            service.update_resignation_status(&RequestId(resignation_id), update, today())
        })
        .await,
        StatusCode::OK,
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct HandoverRequest {
    pub(crate) status: HandoverStatus,
}

pub(crate) async fn handover_handler<S>(
    State(service): State<SharedService<S>>,
    Path(resignation_id): Path<String>,
    axum::Json(request): axum::Json<HandoverRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    let update = ResignationUpdate::Handover {
        status: request.status,
    };
    respond(
        blocking(service, move |service| {
            service.update_resignation_status(&RequestId(resignation_id), update, today())
        })
        .await,
        StatusCode::OK,
    )
}

pub(crate) async fn exit_survey_handler<S>(
    State(service): State<SharedService<S>>,
    Path(resignation_id): Path<String>,
    axum::Json(survey): axum::Json<ExitSurvey>,
) -> Response
where
    S: RecordStore + 'static,
{
    let update = ResignationUpdate::ExitSurvey { survey };
    respond(
        blocking(service, move |service| {
            service.update_resignation_status(&RequestId(resignation_id), update, today())
        })
        .await,
        StatusCode::OK,
    )
}

pub(crate) async fn process_resignation_handler<S>(
    State(service): State<SharedService<S>>,
    Path(resignation_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(
        blocking(service, move |service| {
            service.process_resignation(&RequestId(resignation_id), today())
        })
        .await,
        StatusCode::OK,
    )
}

pub(crate) async fn ex_employees_handler<S>(State(service): State<SharedService<S>>) -> Response
where
    S: RecordStore + 'static,
{
    (StatusCode::OK, axum::Json(service.ex_employees())).into_response()
}

pub(crate) async fn summary_handler<S>(State(service): State<SharedService<S>>) -> Response
where
    S: RecordStore + 'static,
{
    (StatusCode::OK, axum::Json(service.summary())).into_response()
}
