use super::common::*;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::workflows::approvals::catalog::{Designation, LeaveType};
use crate::workflows::approvals::chain::{ChainError, DecisionMetadata};
use crate::workflows::approvals::domain::{
    ApprovalRole, Decision, EmployeeId, EmployeeUpdate, EmploymentStatus, ExitSurvey, Gender,
    HandoverStatus, LeaveStatus, PromotionStatus, RequestId, ResignationStatus, StepStatus,
};
use crate::workflows::approvals::effects::EffectError;
use crate::workflows::approvals::{
    HrRequestService, HrServiceError, LeaveFilter, LeavePolicy, NewEmployee, PromotionUpdate,
    ResignationUpdate, ValidationError,
};

#[test]
fn new_employees_get_default_balances_and_sequential_ids() {
    let (service, _) = build_service();

    let alice = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("alice registered");
    let bob = service
        .add_employee(new_employee("CMP-002", "Bob Stone", Gender::Male))
        .expect("bob registered");

    assert_eq!(alice.id, EmployeeId("EMP-000001".to_string()));
    assert_eq!(bob.id, EmployeeId("EMP-000002".to_string()));
    assert_eq!(alice.leave_balance.get(&LeaveType::Annual), Some(&20));
    assert_eq!(alice.leave_balance.get(&LeaveType::Maternity), Some(&90));
    assert!(!alice.leave_balance.contains_key(&LeaveType::Paternity));
    assert_eq!(bob.leave_balance.get(&LeaveType::Paternity), Some(&7));
    assert!(!bob.leave_balance.contains_key(&LeaveType::Maternity));
    assert!(alice.probation_end_date.is_none());
}

#[test]
fn probation_hires_get_thirty_day_month_end_date() {
    let (service, _) = build_service();
    let nadia = service.add_employee(probationer()).expect("registered");
    assert_eq!(nadia.probation_end_date, Some(date(2025, 7, 5)));
}

#[test]
fn probation_past_the_calendar_is_refused() {
    let service = HrRequestService::new(
        Arc::new(MemoryStore::default()),
        LeavePolicy {
            probation_months: 4_000_000,
            ..LeavePolicy::default()
        },
    )
    .expect("memory store loads");

    match service.add_employee(probationer()) {
        Err(HrServiceError::Validation(ValidationError::ProbationOutOfRange {
            probation_months,
            ..
        })) => assert_eq!(probation_months, 4_000_000),
        other => panic!("expected probation range error, got {other:?}"),
    }
    assert!(service.employees().is_empty());

    let (service, store) = build_service();
    let late_joiner = NewEmployee {
        join_date: NaiveDate::MAX,
        ..probationer()
    };
    assert!(matches!(
        service.add_employee(late_joiner),
        Err(HrServiceError::Validation(
            ValidationError::ProbationOutOfRange { .. }
        ))
    ));
    assert!(service.employees().is_empty());
    assert_eq!(store.save_count(), 0);
}

#[test]
fn duplicate_employee_codes_are_refused() {
    let (service, _) = build_service();
    service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("first registration");

    match service.add_employee(new_employee("cmp-001", "Alicia Smythe", Gender::Female)) {
        Err(HrServiceError::Validation(ValidationError::DuplicateEmployeeCode(code))) => {
            assert_eq!(code, "cmp-001")
        }
        other => panic!("expected duplicate code error, got {other:?}"),
    }
    assert_eq!(service.employees().len(), 1);
}

#[test]
fn departments_must_sit_in_their_faculty() {
    let (service, _) = build_service();
    let mut misplaced = new_employee("CMP-005", "Ivo Petrov", Gender::Male);
    misplaced.department = "Nursing".to_string();
    assert!(matches!(
        service.add_employee(misplaced),
        Err(HrServiceError::Validation(ValidationError::DepartmentOutsideFaculty { .. }))
    ));

    let ivo = service
        .add_employee(new_employee("CMP-005", "Ivo Petrov", Gender::Male))
        .expect("registered");
    let moved = service.update_employee(
        &ivo.id,
        EmployeeUpdate {
            department: Some("Pharmacy".to_string()),
            ..EmployeeUpdate::default()
        },
    );
    assert!(moved.is_err());
    assert_eq!(service.employee(&ivo.id).expect("present").department, "CS");
}

#[test]
fn standard_leave_walks_hod_dean_hr_and_deducts_balance() {
    let (service, _) = build_service();
    let e1 = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");

    let leave = service
        .add_leave(leave_request(&e1, LeaveType::Annual, 3), today())
        .expect("leave filed");
    assert_eq!(leave.days, 3);
    assert_eq!(leave.status, LeaveStatus::Pending);
    assert_eq!(leave.current_approver, Some(ApprovalRole::Hod));
    assert_eq!(
        leave
            .approval_chain
            .iter()
            .map(|step| (step.role, step.status))
            .collect::<Vec<_>>(),
        vec![
            (ApprovalRole::Hod, StepStatus::Pending),
            (ApprovalRole::Dean, StepStatus::Pending),
            (ApprovalRole::Hr, StepStatus::Pending),
        ]
    );

    let after_hod = service
        .update_leave_status(&leave.id, &act(ApprovalRole::Hod, Decision::Approved), today())
        .expect("hod approves");
    assert_eq!(after_hod.status, LeaveStatus::Forwarded);
    assert_eq!(after_hod.current_approver, Some(ApprovalRole::Dean));

    let mut dean = act(ApprovalRole::Dean, Decision::Approved);
    dean.metadata = DecisionMetadata {
        paid_days: Some(3),
        unpaid_days: Some(0),
        leave_category: None,
    };
    let after_dean = service
        .update_leave_status(&leave.id, &dean, today())
        .expect("dean approves");
    assert_eq!(after_dean.status, LeaveStatus::Forwarded);
    assert_eq!(after_dean.current_approver, Some(ApprovalRole::Hr));
    assert_eq!(after_dean.paid_days, Some(3));
    assert_eq!(after_dean.unpaid_days, Some(0));
    assert_eq!(
        service.employee(&e1.id).expect("present").leave_balance[&LeaveType::Annual],
        20,
        "balance only moves on final approval"
    );

    let approved = service
        .update_leave_status(&leave.id, &act(ApprovalRole::Hr, Decision::Approved), today())
        .expect("hr approves");
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(approved.current_approver, None);
    assert_eq!(
        service.employee(&e1.id).expect("present").leave_balance[&LeaveType::Annual],
        17
    );
}

#[test]
fn medical_rejection_by_vc_leaves_president_untouched() {
    let (service, _) = build_service();
    let employee = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");
    let leave = service
        .add_leave(leave_request(&employee, LeaveType::Medical, 10), today())
        .expect("leave filed");

    service
        .update_leave_status(&leave.id, &act(ApprovalRole::Hod, Decision::Approved), today())
        .expect("hod approves");

    let mut vc = act(ApprovalRole::Vc, Decision::Rejected);
    vc.comment = Some("insufficient documentation".to_string());
    let rejected = service
        .update_leave_status(&leave.id, &vc, today())
        .expect("vc rejects");

    assert_eq!(rejected.status, LeaveStatus::Rejected);
    assert_eq!(
        rejected.approval_chain[1].comment.as_deref(),
        Some("insufficient documentation")
    );
    let president = &rejected.approval_chain[2];
    assert_eq!(president.role, ApprovalRole::President);
    assert_eq!(president.status, StepStatus::Pending);
    assert!(president.by.is_none() && president.date.is_none());
    assert_eq!(
        service.employee(&employee.id).expect("present").leave_balance[&LeaveType::Medical],
        30
    );
}

#[test]
fn decisions_on_closed_leave_are_invalid_transitions() {
    let (service, _) = build_service();
    let employee = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");
    let leave = service
        .add_leave(leave_request(&employee, LeaveType::Casual, 1), today())
        .expect("leave filed");
    service
        .update_leave_status(&leave.id, &act(ApprovalRole::Hod, Decision::Rejected), today())
        .expect("hod rejects");

    match service.update_leave_status(
        &leave.id,
        &act(ApprovalRole::Dean, Decision::Approved),
        today(),
    ) {
        Err(HrServiceError::InvalidTransition { from, .. }) => assert_eq!(from, "Rejected"),
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn approvers_must_act_in_chain_order() {
    let (service, _) = build_service();
    let employee = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");
    let leave = service
        .add_leave(leave_request(&employee, LeaveType::Annual, 2), today())
        .expect("leave filed");

    match service.update_leave_status(&leave.id, &act(ApprovalRole::Hr, Decision::Approved), today())
    {
        Err(HrServiceError::Chain(ChainError::OutOfOrder { role, awaiting, .. })) => {
            assert_eq!(role, ApprovalRole::Hr);
            assert_eq!(awaiting, Some(ApprovalRole::Hod));
        }
        other => panic!("expected out of order, got {other:?}"),
    }

    service
        .update_leave_status(&leave.id, &act(ApprovalRole::Hod, Decision::Approved), today())
        .expect("hod approves");
    match service.update_leave_status(&leave.id, &act(ApprovalRole::Hod, Decision::Approved), today())
    {
        Err(HrServiceError::Chain(ChainError::StepAlreadyDecided { role, .. })) => {
            assert_eq!(role, ApprovalRole::Hod)
        }
        other => panic!("expected already decided, got {other:?}"),
    }

    let stored = service.leave(&leave.id).expect("present");
    assert_eq!(stored.current_approver, Some(ApprovalRole::Dean));
}

#[test]
fn roles_outside_the_chain_are_rejected() {
    let (service, _) = build_service();
    let employee = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");
    let leave = service
        .add_leave(leave_request(&employee, LeaveType::Medical, 4), today())
        .expect("leave filed");

    match service.update_leave_status(
        &leave.id,
        &act(ApprovalRole::Dean, Decision::Approved),
        today(),
    ) {
        Err(HrServiceError::Chain(ChainError::RoleNotInChain { role, .. })) => {
            assert_eq!(role, ApprovalRole::Dean)
        }
        other => panic!("expected role not in chain, got {other:?}"),
    }
    assert_eq!(service.leave(&leave.id).expect("present"), leave);
}

#[test]
fn balance_never_drops_below_zero() {
    let (service, _) = build_service();
    let employee = service
        .add_employee(new_employee("CMP-002", "Bob Stone", Gender::Male))
        .expect("registered");
    let leave = service
        .add_leave(leave_request(&employee, LeaveType::Paternity, 10), today())
        .expect("leave filed");

    for role in [ApprovalRole::Hod, ApprovalRole::Dean, ApprovalRole::Hr] {
        service
            .update_leave_status(&leave.id, &act(role, Decision::Approved), today())
            .expect("approval recorded");
    }

    let balance = service.employee(&employee.id).expect("present").leave_balance;
    assert_eq!(balance[&LeaveType::Paternity], 0);
}

#[test]
fn unpaid_leave_has_no_balance_to_deduct() {
    let (service, _) = build_service();
    let employee = service
        .add_employee(new_employee("CMP-002", "Bob Stone", Gender::Male))
        .expect("registered");
    let before = employee.leave_balance.clone();
    let leave = service
        .add_leave(leave_request(&employee, LeaveType::Unpaid, 5), today())
        .expect("leave filed");

    for role in [ApprovalRole::Hod, ApprovalRole::Dean, ApprovalRole::Hr] {
        service
            .update_leave_status(&leave.id, &act(role, Decision::Approved), today())
            .expect("approval recorded");
    }

    assert_eq!(
        service.employee(&employee.id).expect("present").leave_balance,
        before
    );
}

#[test]
fn male_maternity_request_is_refused() {
    let (service, _) = build_service();
    let bob = service
        .add_employee(new_employee("CMP-002", "Bob Stone", Gender::Male))
        .expect("registered");

    let eligibility = service.maternity_eligibility(&bob.id);
    assert!(!eligibility.eligible);
    assert!(eligibility
        .reason
        .ends_with("only available for female employees"));

    let mut request = leave_request(&bob, LeaveType::Maternity, 90);
    request.expected_delivery_date = Some(date(2025, 6, 1));
    match service.add_leave(request, today()) {
        Err(HrServiceError::Validation(ValidationError::MaternityIneligible(reason))) => {
            assert!(reason.contains("female"))
        }
        other => panic!("expected maternity ineligibility, got {other:?}"),
    }
    assert!(service.leaves().is_empty());
}

#[test]
fn maternity_requires_sixty_days_notice() {
    let (service, _) = build_service();
    let alice = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");

    let mut short = leave_request(&alice, LeaveType::Maternity, 90);
    short.expected_delivery_date = Some(date(2025, 4, 1));
    match service.add_leave(short, today()) {
        Err(HrServiceError::Validation(ValidationError::InsufficientNotice {
            days_in_advance,
            min_required,
            ..
        })) => {
            assert_eq!(days_in_advance, Some(29));
            assert_eq!(min_required, 60);
        }
        other => panic!("expected insufficient notice, got {other:?}"),
    }

    let mut ok = leave_request(&alice, LeaveType::Maternity, 90);
    ok.expected_delivery_date = Some(date(2025, 6, 1));
    let leave = service.add_leave(ok, today()).expect("eligible request filed");
    assert_eq!(leave.expected_delivery_date, Some(date(2025, 6, 1)));
}

#[test]
fn maternity_rules_can_be_advisory_only() {
    let store = Arc::new(MemoryStore::default());
    let service = HrRequestService::new(
        store,
        LeavePolicy {
            enforce_maternity_rules: false,
            ..LeavePolicy::default()
        },
    )
    .expect("loads");
    let nadia = service.add_employee(probationer()).expect("registered");

    let eligibility = service.maternity_eligibility(&nadia.id);
    assert_eq!(
        eligibility.reason,
        "Maternity leave is not available during probation. Probation ends on July 5, 2025"
    );

    let leave = service
        .add_leave(leave_request(&nadia, LeaveType::Maternity, 30), today())
        .expect("advisory policy lets the request through");
    assert_eq!(leave.status, LeaveStatus::Pending);
}

#[test]
fn leave_intake_validates_dates_and_reason() {
    let (service, _) = build_service();
    let alice = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");

    let mut backwards = leave_request(&alice, LeaveType::Sick, 2);
    backwards.end_date = date(2025, 4, 1);
    assert!(matches!(
        service.add_leave(backwards, today()),
        Err(HrServiceError::Validation(ValidationError::InvalidDateRange { .. }))
    ));

    let mut blank = leave_request(&alice, LeaveType::Sick, 2);
    blank.reason = "   ".to_string();
    assert!(matches!(
        service.add_leave(blank, today()),
        Err(HrServiceError::Validation(ValidationError::MissingField("reason")))
    ));

    let mut stranger = leave_request(&alice, LeaveType::Sick, 2);
    stranger.employee_id = EmployeeId("EMP-999999".to_string());
    assert!(matches!(
        service.add_leave(stranger, today()),
        Err(HrServiceError::EmployeeNotFound(_))
    ));
}

#[test]
fn request_snapshot_survives_profile_edits() {
    let (service, _) = build_service();
    let alice = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");
    let leave = service
        .add_leave(leave_request(&alice, LeaveType::Casual, 1), today())
        .expect("leave filed");

    service
        .update_employee(
            &alice.id,
            EmployeeUpdate {
                name: Some("Alice Jones".to_string()),
                department: Some("AI".to_string()),
                ..EmployeeUpdate::default()
            },
        )
        .expect("profile updated");

    let stored = service.leave(&leave.id).expect("present");
    assert_eq!(stored.employee.name, "Alice Smith");
    assert_eq!(stored.employee.department, "CS");
    assert_eq!(
        service.employee(&alice.id).expect("present").name,
        "Alice Jones"
    );
}

#[test]
fn confirming_an_employee_clears_probation() {
    let (service, _) = build_service();
    let nadia = service.add_employee(probationer()).expect("registered");

    let confirmed = service
        .update_employee(
            &nadia.id,
            EmployeeUpdate {
                employment_status: Some(EmploymentStatus::Confirmed),
                ..EmployeeUpdate::default()
            },
        )
        .expect("confirmed");

    assert_eq!(confirmed.employment_status, EmploymentStatus::Confirmed);
    assert!(confirmed.probation_end_date.is_none());
    assert!(service.maternity_eligibility(&nadia.id).eligible);
}

#[test]
fn leave_queries_filter_by_role_faculty_and_status() {
    let (service, _) = build_service();
    let alice = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");
    let ravi = service.add_employee(senior_lecturer()).expect("registered");

    let first = service
        .add_leave(leave_request(&alice, LeaveType::Annual, 2), today())
        .expect("filed");
    let second = service
        .add_leave(leave_request(&ravi, LeaveType::Medical, 3), today())
        .expect("filed");
    service
        .update_leave_status(&first.id, &act(ApprovalRole::Hod, Decision::Approved), today())
        .expect("hod approves");

    let awaiting_dean = service.leaves_awaiting(ApprovalRole::Dean);
    assert_eq!(awaiting_dean.len(), 1);
    assert_eq!(awaiting_dean[0].id, first.id);

    let awaiting_hod = service.leaves_awaiting(ApprovalRole::Hod);
    assert_eq!(awaiting_hod.len(), 1);
    assert_eq!(awaiting_hod[0].id, second.id);

    assert_eq!(service.leaves_for_faculty("engineering").len(), 1);
    assert_eq!(service.leaves_by_employee(&alice.id).len(), 1);
    assert_eq!(service.leaves_with_status(LeaveStatus::Forwarded).len(), 1);
    assert_eq!(service.pending_leaves().len(), 2);

    let combined = service.leaves_matching(&LeaveFilter {
        employee_id: Some(ravi.id.0.clone()),
        awaiting: Some(ApprovalRole::Hod),
        faculty: Some("ENGINEERING".to_string()),
        ..LeaveFilter::default()
    });
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].id, second.id);

    let none = service.leaves_matching(&LeaveFilter {
        employee_id: Some(alice.id.0.clone()),
        awaiting: Some(ApprovalRole::Hod),
        ..LeaveFilter::default()
    });
    assert!(none.is_empty());
    assert_eq!(service.leaves_matching(&LeaveFilter::default()).len(), 2);
}

#[test]
fn promotion_moves_senior_lecturer_to_assistant_professor() {
    let (service, _) = build_service();
    let ravi = service.add_employee(senior_lecturer()).expect("registered");

    let promotion = service
        .add_promotion(
            promotion_request(&ravi, Designation::AssistantProfessor),
            today(),
        )
        .expect("promotion filed");
    assert_eq!(promotion.current_designation(), Designation::SeniorLecturer);

    let scheduled = service
        .update_promotion_status(
            &promotion.id,
            PromotionUpdate::ScheduleCommittee {
                meeting_date: date(2025, 3, 20),
                notes: "Panel of three external reviewers".to_string(),
                scheduled_by: "HR Office".to_string(),
            },
            today(),
        )
        .expect("committee scheduled");
    assert_eq!(scheduled.status, PromotionStatus::UnderReview);

    let approved = service
        .approve_promotion(&promotion.id, "Registrar", None, date(2025, 3, 21))
        .expect("approved");
    assert_eq!(approved.status, PromotionStatus::Approved);
    assert_eq!(approved.approved_on, Some(date(2025, 3, 21)));
    assert_eq!(
        service.employee(&ravi.id).expect("present").designation,
        Designation::AssistantProfessor
    );
    assert_eq!(approved.employee.designation, Designation::SeniorLecturer);
}

#[test]
fn promotions_must_move_up_the_ladder() {
    let (service, _) = build_service();
    let ravi = service.add_employee(senior_lecturer()).expect("registered");

    match service.add_promotion(promotion_request(&ravi, Designation::Lecturer), today()) {
        Err(HrServiceError::Validation(ValidationError::PromotionNotUpward {
            current,
            requested,
        })) => {
            assert_eq!(current, Designation::SeniorLecturer);
            assert_eq!(requested, Designation::Lecturer);
        }
        other => panic!("expected downward promotion refusal, got {other:?}"),
    }
}

#[test]
fn rejected_promotion_cannot_be_approved_later() {
    let (service, _) = build_service();
    let ravi = service.add_employee(senior_lecturer()).expect("registered");
    let promotion = service
        .add_promotion(promotion_request(&ravi, Designation::Professor), today())
        .expect("filed");

    service
        .update_promotion_status(
            &promotion.id,
            PromotionUpdate::Reject {
                decided_by: "Registrar".to_string(),
                notes: Some("Publication record incomplete".to_string()),
            },
            today(),
        )
        .expect("rejected");

    match service.approve_promotion(&promotion.id, "Registrar", None, today()) {
        Err(HrServiceError::InvalidTransition { from, action, .. }) => {
            assert_eq!(from, "Rejected");
            assert_eq!(action, "approve");
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
    assert_eq!(
        service.employee(&ravi.id).expect("present").designation,
        Designation::SeniorLecturer
    );
}

#[test]
fn one_open_promotion_per_employee() {
    let (service, _) = build_service();
    let ravi = service.add_employee(senior_lecturer()).expect("registered");
    service
        .add_promotion(
            promotion_request(&ravi, Designation::AssistantProfessor),
            today(),
        )
        .expect("first filed");

    assert!(matches!(
        service.add_promotion(
            promotion_request(&ravi, Designation::AssociateProfessor),
            today()
        ),
        Err(HrServiceError::Validation(ValidationError::OpenRequestExists("promotion")))
    ));
}

#[test]
fn promotion_search_matches_name_or_department() {
    let (service, _) = build_service();
    let ravi = service.add_employee(senior_lecturer()).expect("registered");
    let alice = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");
    service
        .add_promotion(
            promotion_request(&ravi, Designation::AssistantProfessor),
            today(),
        )
        .expect("filed");
    service
        .add_promotion(
            promotion_request(&alice, Designation::SeniorLecturer),
            today(),
        )
        .expect("filed");

    assert_eq!(service.promotions(None, Some("menon")).len(), 1);
    assert_eq!(service.promotions(None, Some("cs")).len(), 1);
    assert_eq!(service.promotions(Some(PromotionStatus::Pending), None).len(), 2);
    assert!(service
        .promotions(Some(PromotionStatus::Approved), None)
        .is_empty());
}

#[test]
fn resignation_moves_employee_to_alumni() {
    let (service, _) = build_service();
    let grace = service.add_employee(veteran()).expect("registered");

    let resignation = service
        .add_resignation(resignation_request(&grace, date(2023, 6, 1)), today())
        .expect("resignation filed");
    assert_eq!(resignation.handover_status, HandoverStatus::NotStarted);

    service
        .update_resignation_status(
            &resignation.id,
            ResignationUpdate::Approve {
                approved_by: "Dean of Computing".to_string(),
            },
            today(),
        )
        .expect("approved");
    service
        .update_resignation_status(
            &resignation.id,
            ResignationUpdate::ExitSurvey {
                survey: ExitSurvey {
                    primary_reason: "Relocation".to_string(),
                    overall_satisfaction: 4,
                    would_recommend: true,
                    comments: None,
                },
            },
            today(),
        )
        .expect("survey recorded");

    let alumni = service
        .process_resignation(&resignation.id, today())
        .expect("processed");

    assert_eq!(alumni.years_of_service, 8);
    assert_eq!(alumni.id, format!("ex-{}", grace.id));
    assert_eq!(alumni.exit_date, date(2023, 6, 1));
    assert!(alumni.exit_survey.is_some());
    assert!(matches!(
        service.employee(&grace.id),
        Err(HrServiceError::EmployeeNotFound(_))
    ));
    assert_eq!(service.ex_employees(), vec![alumni]);

    let closed = service.resignation(&resignation.id).expect("present");
    assert_eq!(closed.status, ResignationStatus::Completed);
    assert_eq!(closed.processed_on, Some(today()));
}

#[test]
fn resignation_must_be_approved_before_processing() {
    let (service, _) = build_service();
    let grace = service.add_employee(veteran()).expect("registered");
    let resignation = service
        .add_resignation(resignation_request(&grace, date(2025, 4, 30)), today())
        .expect("filed");

    match service.process_resignation(&resignation.id, today()) {
        Err(HrServiceError::InvalidTransition { from, action, .. }) => {
            assert_eq!(from, "Pending");
            assert_eq!(action, "process");
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
    assert!(service.employee(&grace.id).is_ok());
    assert!(service.ex_employees().is_empty());
}

#[test]
fn exit_survey_scores_are_bounded() {
    let (service, _) = build_service();
    let grace = service.add_employee(veteran()).expect("registered");
    let resignation = service
        .add_resignation(resignation_request(&grace, date(2025, 4, 30)), today())
        .expect("filed");

    let result = service.update_resignation_status(
        &resignation.id,
        ResignationUpdate::ExitSurvey {
            survey: ExitSurvey {
                primary_reason: "Compensation".to_string(),
                overall_satisfaction: 9,
                would_recommend: false,
                comments: None,
            },
        },
        today(),
    );
    assert!(matches!(
        result,
        Err(HrServiceError::Validation(ValidationError::SatisfactionOutOfRange(9)))
    ));
    assert!(service
        .resignation(&resignation.id)
        .expect("present")
        .exit_survey
        .is_none());
}

#[test]
fn failed_side_effect_rolls_back_the_decision() {
    let (service, _) = build_service();
    let grace = service.add_employee(veteran()).expect("registered");
    let leave = service
        .add_leave(leave_request(&grace, LeaveType::Annual, 3), today())
        .expect("leave filed");
    for role in [ApprovalRole::Hod, ApprovalRole::Dean] {
        service
            .update_leave_status(&leave.id, &act(role, Decision::Approved), today())
            .expect("approval recorded");
    }

    let resignation = service
        .add_resignation(resignation_request(&grace, date(2025, 3, 31)), today())
        .expect("filed");
    service
        .update_resignation_status(
            &resignation.id,
            ResignationUpdate::Approve {
                approved_by: "HR Office".to_string(),
            },
            today(),
        )
        .expect("approved");
    service
        .process_resignation(&resignation.id, today())
        .expect("processed");

    let before = service.leave(&leave.id).expect("present");
    match service.update_leave_status(&leave.id, &act(ApprovalRole::Hr, Decision::Approved), today())
    {
        Err(HrServiceError::Effect(EffectError::EmployeeNotFound(id))) => {
            assert_eq!(id, grace.id)
        }
        other => panic!("expected missing employee, got {other:?}"),
    }

    let after = service.leave(&leave.id).expect("present");
    assert_eq!(after, before);
    assert_eq!(after.status, LeaveStatus::Forwarded);
    assert_eq!(after.approval_chain[2].status, StepStatus::Pending);
}

#[test]
fn committed_records_are_written_behind() {
    let (service, store) = build_service();
    let alice = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");
    assert_eq!(store.save_count(), 1);

    let _ = service.add_employee(new_employee("CMP-001", "Duplicate", Gender::Female));
    assert_eq!(store.save_count(), 1, "failed mutations are not persisted");

    let saved = store.last_saved().expect("document saved");
    assert_eq!(saved.employees, vec![alice]);
    assert_eq!(saved.sequence, 1);
}

#[test]
fn reads_and_mutations_proceed_while_a_save_is_in_flight() {
    let (store, entered, release) = GatedStore::new();
    let service = Arc::new(
        HrRequestService::new(Arc::new(store), LeavePolicy::default()).expect("loads empty"),
    );

    let writer = {
        let service = Arc::clone(&service);
        std::thread::spawn(move || {
            service.add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        })
    };
    entered.recv().expect("save started");

    assert_eq!(service.employees().len(), 1);
    assert!(matches!(
        service.add_employee(new_employee("CMP-001", "Duplicate", Gender::Female)),
        Err(HrServiceError::Validation(
            ValidationError::DuplicateEmployeeCode(_)
        ))
    ));

    release.send(()).expect("release save");
    let alice = writer
        .join()
        .expect("writer thread")
        .expect("registered");
    assert_eq!(service.employee(&alice.id).expect("present").name, "Alice Smith");
}

#[test]
fn service_resumes_from_stored_document() {
    let (first, store) = build_service();
    first
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");

    let reloaded = HrRequestService::new(
        Arc::new(MemoryStore::seeded(store.last_saved().expect("saved"))),
        LeavePolicy::default(),
    )
    .expect("reloads");
    let bob = reloaded
        .add_employee(new_employee("CMP-002", "Bob Stone", Gender::Male))
        .expect("registered");

    assert_eq!(bob.id, EmployeeId("EMP-000002".to_string()));
    assert_eq!(reloaded.employees().len(), 2);
}

#[test]
fn save_failures_do_not_block_mutations() {
    let service = HrRequestService::new(Arc::new(ReadOnlyStore), LeavePolicy::default())
        .expect("loads empty");

    let alice = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("mutation succeeds despite failing store");
    assert!(service.employee(&alice.id).is_ok());
}

#[test]
fn unavailable_store_fails_startup() {
    match HrRequestService::new(Arc::new(UnavailableStore), LeavePolicy::default()) {
        Err(HrServiceError::Store(_)) => {}
        Err(other) => panic!("expected store error, got {other:?}"),
        Ok(_) => panic!("expected store error"),
    }
}

#[test]
fn unknown_request_ids_are_not_found() {
    let (service, _) = build_service();
    let missing = RequestId("LV-424242".to_string());
    assert!(matches!(
        service.leave(&missing),
        Err(HrServiceError::RequestNotFound(_))
    ));
    assert!(matches!(
        service.approve_promotion(&missing, "Registrar", None, today()),
        Err(HrServiceError::RequestNotFound(_))
    ));
}

#[test]
fn summary_counts_each_collection() {
    let (service, _) = build_service();
    let alice = service
        .add_employee(new_employee("CMP-001", "Alice Smith", Gender::Female))
        .expect("registered");
    let grace = service.add_employee(veteran()).expect("registered");
    service
        .add_leave(leave_request(&alice, LeaveType::Casual, 1), today())
        .expect("filed");
    let resignation = service
        .add_resignation(resignation_request(&grace, date(2025, 4, 30)), today())
        .expect("filed");
    service
        .update_resignation_status(
            &resignation.id,
            ResignationUpdate::Approve {
                approved_by: "HR Office".to_string(),
            },
            today(),
        )
        .expect("approved");
    service
        .process_resignation(&resignation.id, today())
        .expect("processed");

    let summary = service.summary();
    assert_eq!(summary.employees_by_status.get("Active"), Some(&1));
    assert_eq!(summary.leaves_by_status.get("Pending"), Some(&1));
    assert_eq!(summary.resignations_by_status.get("Completed"), Some(&1));
    assert_eq!(summary.ex_employees, 1);
}
