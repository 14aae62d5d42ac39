use crate::infra::InMemoryRecordStore;
use campus_hr::error::AppError;
use campus_hr::workflows::approvals::{
    ApprovalAction, ApprovalRole, Decision, DecisionMetadata, Designation, Employee,
    EmploymentStatus, Gender, HrRequestService, HrServiceError, LeavePolicy, LeaveRequest,
    LeaveType, NewEmployee, NewLeave, NewPromotion, NewResignation, PromotionUpdate,
    RecordStore, ResignationUpdate,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the processing date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the final records document as JSON.
    #[arg(long)]
    pub(crate) dump_records: bool,
}

pub(crate) struct DemoRoster {
    pub(crate) amina: Employee,
    pub(crate) omar: Employee,
    pub(crate) ravi: Employee,
    pub(crate) grace: Employee,
}

fn hire(
    code: &str,
    name: &str,
    gender: Gender,
    department: &str,
    faculty: &str,
    designation: Designation,
    join_date: NaiveDate,
) -> NewEmployee {
    NewEmployee {
        code: code.to_string(),
        name: name.to_string(),
        email: format!("{}@campus.edu", code.to_lowercase()),
        gender,
        department: department.to_string(),
        faculty: faculty.to_string(),
        designation,
        join_date,
        employment_status: EmploymentStatus::Confirmed,
        salary_base: 80_000,
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub(crate) fn seed_roster<S>(service: &HrRequestService<S>) -> Result<DemoRoster, HrServiceError>
where
    S: RecordStore + 'static,
{
    Ok(DemoRoster {
        amina: service.add_employee(hire(
            "CS-101",
            "Amina Yusuf",
            Gender::Female,
            "CS",
            "Computing",
            Designation::Lecturer,
            ymd(2019, 8, 1),
        ))?,
        omar: service.add_employee(hire(
            "EE-204",
            "Omar Haddad",
            Gender::Male,
            "EE",
            "Engineering",
            Designation::Lecturer,
            ymd(2021, 1, 11),
        ))?,
        ravi: service.add_employee(hire(
            "ME-310",
            "Ravi Menon",
            Gender::Male,
            "ME",
            "Engineering",
            Designation::SeniorLecturer,
            ymd(2016, 2, 1),
        ))?,
        grace: service.add_employee(hire(
            "AI-007",
            "Grace Liu",
            Gender::Female,
            "AI",
            "Computing",
            Designation::AssociateProfessor,
            ymd(2015, 6, 1),
        ))?,
    })
}

fn decision(role: ApprovalRole, decision: Decision) -> ApprovalAction {
    ApprovalAction {
        role,
        decision,
        approver_name: format!("{} (demo)", role.label()),
        comment: None,
        metadata: DecisionMetadata::default(),
    }
}

fn print_leave(leave: &LeaveRequest) {
    let awaiting = leave
        .current_approver
        .map(|role| role.label())
        .unwrap_or("nobody");
    println!(
        "  {} [{}] {} day(s) -> {} (awaiting {})",
        leave.id,
        leave.leave_type.label(),
        leave.days,
        leave.status.label(),
        awaiting
    );
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let service = Arc::new(HrRequestService::new(
        Arc::new(InMemoryRecordStore::default()),
        LeavePolicy::default(),
    )?);

    println!("Campus HR workflow demo ({today})");
    let roster = seed_roster(&service)?;
    for employee in service.employees() {
        println!(
            "- {} {} | {} / {} | {}",
            employee.id,
            employee.name,
            employee.department,
            employee.faculty,
            employee.designation.label()
        );
    }

    println!("\nStandard leave chain");
    let start = today + Duration::days(14);
    let annual = service.add_leave(
        NewLeave {
            employee_id: roster.amina.id.clone(),
            leave_type: LeaveType::Annual,
            start_date: start,
            end_date: start + Duration::days(2),
            reason: "Family visit".to_string(),
            expected_delivery_date: None,
        },
        today,
    )?;
    print_leave(&annual);

    for role in [ApprovalRole::Hod, ApprovalRole::Dean, ApprovalRole::Hr] {
        let mut action = decision(role, Decision::Approved);
        if role == ApprovalRole::Dean {
            action.metadata.paid_days = Some(annual.days);
            action.metadata.unpaid_days = Some(0);
        }
        let updated = service.update_leave_status(&annual.id, &action, today)?;
        print_leave(&updated);
    }
    let balance = service
        .employee(&roster.amina.id)?
        .leave_balance
        .get(&LeaveType::Annual)
        .copied()
        .unwrap_or_default();
    println!("  {} annual balance now {}", roster.amina.name, balance);

    println!("\nMedical leave chain");
    let medical = service.add_leave(
        NewLeave {
            employee_id: roster.omar.id.clone(),
            leave_type: LeaveType::Medical,
            start_date: start,
            end_date: start + Duration::days(9),
            reason: "Post-operative recovery".to_string(),
            expected_delivery_date: None,
        },
        today,
    )?;
    print_leave(&medical);
    service.update_leave_status(
        &medical.id,
        &decision(ApprovalRole::Hod, Decision::Approved),
        today,
    )?;
    let mut vc = decision(ApprovalRole::Vc, Decision::Rejected);
    vc.comment = Some("insufficient documentation".to_string());
    let rejected = service.update_leave_status(&medical.id, &vc, today)?;
    print_leave(&rejected);
    for step in &rejected.approval_chain {
        println!(
            "    {:<18} {:?}{}",
            step.role.label(),
            step.status,
            step.comment
                .as_deref()
                .map(|comment| format!(" ({comment})"))
                .unwrap_or_default()
        );
    }

    println!("\nMaternity eligibility");
    for employee in [&roster.amina, &roster.omar] {
        let check = service.maternity_eligibility(&employee.id);
        println!("  {}: {}", employee.name, check.reason);
    }

    println!("\nPromotion");
    let promotion = service.add_promotion(
        NewPromotion {
            employee_id: roster.ravi.id.clone(),
            requested_designation: roster
                .ravi
                .designation
                .next()
                .unwrap_or(Designation::Professor),
            justification: "Led the thermal systems lab and two funded projects".to_string(),
        },
        today,
    )?;
    service.update_promotion_status(
        &promotion.id,
        PromotionUpdate::ScheduleCommittee {
            meeting_date: today + Duration::days(7),
            notes: "Faculty promotion committee".to_string(),
            scheduled_by: "HR Office".to_string(),
        },
        today,
    )?;
    let promoted = service.approve_promotion(&promotion.id, "Registrar", None, today)?;
    println!(
        "  {} {} -> {} ({})",
        promoted.id,
        promoted.current_designation().label(),
        promoted.requested_designation.label(),
        promoted.status.label()
    );

    println!("\nResignation");
    let resignation = service.add_resignation(
        NewResignation {
            employee_id: roster.grace.id.clone(),
            reason: "Joining an industry research lab".to_string(),
            notice_period_days: 30,
            last_working_date: ymd(2023, 6, 1),
            exit_survey: None,
        },
        today,
    )?;
    service.update_resignation_status(
        &resignation.id,
        ResignationUpdate::Approve {
            approved_by: "Dean of Computing".to_string(),
        },
        today,
    )?;
    let alumni = service.process_resignation(&resignation.id, today)?;
    println!(
        "  {} left after {} year(s); active roster now {}",
        alumni.name,
        alumni.years_of_service,
        service.employees().len()
    );

    println!("\nSummary");
    match serde_json::to_string_pretty(&service.summary()) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("  Summary unavailable: {}", err),
    }

    if args.dump_records {
        match serde_json::to_string_pretty(&service.snapshot()) {
            Ok(json) => println!("\nRecords document:\n{json}"),
            Err(err) => println!("  Records document unavailable: {}", err),
        }
    }

    Ok(())
}
