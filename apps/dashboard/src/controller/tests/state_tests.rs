use chrono::{NaiveDate, TimeZone, Utc};
use shared::domain::{BranchScope, SorPriority, SorStatus, VendorId};
use sor_api::FixedClock;
use storage::{Seed, Storage};

use super::*;

fn controller_with(seed: Seed, user: &str) -> Controller {
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    let storage = Storage::new(seed).expect("seed");
    Controller::new(ApiContext::new(storage, FixedClock::new(now)), &UserId::from(user))
        .expect("controller")
}

fn builtin_seed() -> Seed {
    Seed::builtin(Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap())
}

fn controller(user: &str) -> Controller {
    controller_with(builtin_seed(), user)
}

/// Built-in data plus a teacher and a storekeeper at the Al Wakrah branch.
fn two_branch_seed() -> Seed {
    let mut seed = builtin_seed();
    for (id, name, role) in [
        ("U9", "Teacher Mariam", UserRole::Teacher),
        ("U10", "Wakrah Stores", UserRole::Inventory),
    ] {
        seed.users.push(User {
            id: UserId::from(id),
            name: name.to_string(),
            email: format!("{}@edison.qa", id.to_ascii_lowercase()),
            role,
            branch: BranchScope::Branch("B2".into()),
            department: None,
        });
    }
    seed
}

fn sor(id: &str) -> SorId {
    SorId::from(id)
}

#[test]
fn unknown_initial_user_is_not_found() {
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    let storage = Storage::new(builtin_seed()).expect("seed");
    let err = Controller::new(ApiContext::new(storage, FixedClock::new(now)), &UserId::from("U99"))
        .err()
        .expect("unknown user");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[test]
fn role_switch_keeps_data_and_changes_buttons() {
    let mut controller = controller("U3");
    controller.select_request(&sor("SOR-2024-001")).expect("select");
    let before = controller.selected_request().expect("selected").clone();
    assert!(controller.offered_actions().is_empty());

    controller
        .switch_active_role(UserRole::Principal)
        .expect("switch to principal");
    assert_eq!(controller.active_user().id, UserId::from("U2"));
    assert_eq!(controller.active_view(), ViewId::Dashboard);
    assert_eq!(controller.selected_request(), Some(&before));
    assert_eq!(
        controller.offered_actions(),
        vec![
            WorkflowAction::Approve,
            WorkflowAction::Reject,
            WorkflowAction::RequestClarification
        ]
    );

    controller
        .switch_active_role(UserRole::Procurement)
        .expect("switch to procurement");
    assert_eq!(controller.selected_request(), Some(&before));
    assert!(controller.offered_actions().is_empty());
}

#[test]
fn role_without_users_is_not_found() {
    let mut controller = controller("U3");
    let err = controller
        .switch_active_role(UserRole::Hr)
        .expect_err("no HR user");
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(controller.active_user().id, UserId::from("U3"));
}

#[test]
fn switching_to_a_user_outside_the_branch_drops_the_selection() {
    let mut controller = controller_with(two_branch_seed(), "U3");
    controller.select_request(&sor("SOR-2024-001")).expect("select");

    controller
        .switch_active_user(&UserId::from("U9"))
        .expect("switch");
    assert!(controller.selected_request().is_none());
    assert!(controller.visible_requests().is_empty());

    let err = controller
        .select_request(&sor("SOR-2024-001"))
        .expect_err("foreign branch");
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[test]
fn board_requests_can_be_worked_across_branches() {
    let mut controller = controller_with(two_branch_seed(), "U4");
    controller.select_request(&sor("SOR-2024-002")).expect("select");
    controller
        .apply_action(WorkflowAction::BeginSourcing, None)
        .expect("begin sourcing");
    controller
        .apply_action(WorkflowAction::StartInventoryCheck, None)
        .expect("inventory check");

    controller
        .switch_active_user(&UserId::from("U10"))
        .expect("switch");
    assert_eq!(
        controller.selected_request().map(|s| s.status),
        Some(SorStatus::InventoryCheck)
    );
    assert_eq!(
        controller.offered_actions(),
        vec![WorkflowAction::ConfirmNoStock]
    );
    let change = controller
        .apply_action(WorkflowAction::ConfirmNoStock, Some("none in Wakrah stores"))
        .expect("stock check from the board");
    assert_eq!(change.to, SorStatus::PendingFinance);
    assert!(controller.offered_actions().is_empty());

    // still submitted to the principal, so not on the inventory board
    let err = controller
        .select_request(&sor("SOR-2024-001"))
        .expect_err("not on board");
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[test]
fn views_outside_the_sidebar_are_forbidden() {
    let mut controller = controller("U3");
    let err = controller
        .switch_view(ViewId::Finance)
        .expect_err("teacher has no finance view");
    assert_eq!(err.code, ErrorCode::Forbidden);
    assert_eq!(controller.active_view(), ViewId::Dashboard);

    controller.select_request(&sor("SOR-2024-001")).expect("select");
    controller.switch_view(ViewId::Requests).expect("registry");
    assert!(controller.selected_request().is_none());
}

#[test]
fn creating_a_request_lands_on_the_registry() {
    let mut controller = controller("U3");
    controller.open_create_form();
    assert!(controller.is_creating());

    let draft = SorDraft {
        item_name: Some("Graph paper".to_string()),
        quantity: Some(40),
        purpose: Some("Maths exams".to_string()),
        estimated_cost: Some(120.0),
        required_date: NaiveDate::from_ymd_opt(2024, 10, 20),
        category: Some("Stationery".to_string()),
        priority: Some(SorPriority::Low),
    };
    let sor_id = controller.create_request(&draft).expect("create");
    assert_eq!(sor_id, sor("SOR-2024-003"));
    assert!(!controller.is_creating());
    assert_eq!(controller.active_view(), ViewId::Requests);
    assert_eq!(controller.visible_requests()[0].id, sor_id);
}

#[test]
fn actions_need_a_selection() {
    let mut controller = controller("U2");
    let err = controller
        .apply_action(WorkflowAction::Approve, None)
        .expect_err("nothing selected");
    assert_eq!(err.code, ErrorCode::Validation);
    let err = controller.post_message("hello").expect_err("nothing selected");
    assert_eq!(err.code, ErrorCode::Validation);
}

#[test]
fn handle_reports_events_and_errors() {
    let mut controller = controller("U4");

    let event = controller.handle(ControllerCommand::SelectRequest {
        sor_id: sor("SOR-2024-002"),
    });
    assert!(matches!(event, ControllerEvent::RequestSelected { .. }));

    let event = controller.handle(ControllerCommand::ApplyAction {
        action: WorkflowAction::BeginSourcing,
        comment: None,
    });
    match event {
        ControllerEvent::StatusChanged { from, to, actor, .. } => {
            assert_eq!(from, SorStatus::ApprovedByPrincipal);
            assert_eq!(to, SorStatus::InProcurementReview);
            assert_eq!(actor, "Procurement Lead");
        }
        other => panic!("unexpected event {other:?}"),
    }

    let event = controller.handle(ControllerCommand::AssignVendor {
        vendor: VendorRef {
            id: VendorId::from("V7"),
            name: "Gulf Office Supply".to_string(),
        },
    });
    assert!(matches!(event, ControllerEvent::VendorAssigned { .. }));

    let event = controller.handle(ControllerCommand::PostMessage {
        content: "   ".to_string(),
    });
    match event {
        ControllerEvent::Error(err) => assert_eq!(err.code, ErrorCode::Validation),
        other => panic!("unexpected event {other:?}"),
    }

    let event = controller.handle(ControllerCommand::SwitchRole {
        role: UserRole::Inventory,
    });
    assert!(matches!(
        event,
        ControllerEvent::ActiveUserChanged {
            role: UserRole::Inventory,
            ..
        }
    ));
}

#[test]
fn snapshot_serializes_the_session() {
    let mut controller = controller("U2");
    controller.select_request(&sor("SOR-2024-001")).expect("select");
    let json = serde_json::to_value(controller.snapshot()).expect("json");
    assert_eq!(json["active_user"]["id"], "U2");
    assert_eq!(json["active_view"], "dashboard");
    assert_eq!(json["selected"], "SOR-2024-001");
    assert_eq!(json["requests"].as_array().map(Vec::len), Some(2));
}
