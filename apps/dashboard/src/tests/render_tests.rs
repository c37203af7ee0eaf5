use chrono::{NaiveDate, TimeZone, Utc};
use shared::domain::{SorDraft, SorId, SorPriority, UserId, WorkflowAction};
use sor_api::{ApiContext, FixedClock};
use storage::{Seed, Storage};

use super::*;

fn controller(user: &str) -> Controller {
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    let storage = Storage::new(Seed::builtin(now)).expect("seed");
    Controller::new(ApiContext::new(storage, FixedClock::new(now)), &UserId::from(user))
        .expect("controller")
}

fn opts() -> RenderOptions {
    RenderOptions {
        currency: "QR".to_string(),
        activity_limit: 5,
    }
}

#[test]
fn money_groups_thousands_and_keeps_cents() {
    assert_eq!(money("QR", 15_000.0), "QR 15,000");
    assert_eq!(money("QR", 1_234.5), "QR 1,234.50");
    assert_eq!(money("QR", 999.0), "QR 999");
    assert_eq!(money("QR", 0.0), "QR 0");
    assert_eq!(money("USD", 1_000_000.0), "USD 1,000,000");
}

#[test]
fn header_marks_the_active_view() {
    let screen = render_screen(&controller("U3"), &opts());
    let mut lines = screen.lines();
    assert_eq!(lines.next(), Some("== Dashboard | Teacher Ahmed (TEACHER) =="));
    assert_eq!(
        lines.next(),
        Some("nav: [dashboard] | requests | users | settings")
    );
    assert!(screen.contains("MISSION CONTROL"));
}

#[test]
fn management_dashboard_lists_branch_spend() {
    let screen = render_with(|out| write_dashboard(out, &controller("U6"), &opts()));
    assert!(screen.contains("branch spend vs budget:"));
    assert!(screen.contains("QR 120,000 / QR 500,000"));
    assert!(screen.contains("SOR-2024-00"));
}

#[test]
fn principal_dashboard_counts_pending_decisions() {
    let screen = render_with(|out| write_dashboard(out, &controller("U2"), &opts()));
    assert!(screen.contains("awaiting your decision: 1"));
}

#[test]
fn detail_lists_offered_actions_and_path() {
    let mut controller = controller("U2");
    controller
        .select_request(&SorId::from("SOR-2024-001"))
        .expect("select");
    let screen = render_screen(&controller, &opts());
    assert!(screen.contains("SOR-2024-001 [Submitted to Principal]"));
    assert!(screen.contains("approval path: PRINCIPAL -> FINANCE -> CFO"));
    assert!(screen.contains("next step: PRINCIPAL"));
    assert!(screen.contains(WorkflowAction::Approve.label()));
    assert!(screen.contains("request_clarification"));
    assert!(!screen.contains("note: cost band"));
}

#[test]
fn detail_without_actions_names_the_role() {
    let mut controller = controller("U3");
    controller
        .select_request(&SorId::from("SOR-2024-002"))
        .expect("select");
    let screen = render_screen(&controller, &opts());
    assert!(screen.contains("(none for TEACHER)"));
    assert!(screen.contains("Principal Sarah [PRINCIPAL] Approved for procurement sourcing."));
}

#[test]
fn expensive_requests_flag_the_unrouted_ceo_band() {
    let mut controller = controller("U3");
    let draft = SorDraft {
        item_name: Some("Sports hall floor".to_string()),
        quantity: Some(1),
        purpose: Some("Resurfacing".to_string()),
        estimated_cost: Some(80_000.0),
        required_date: NaiveDate::from_ymd_opt(2025, 1, 10),
        category: Some("Maintenance".to_string()),
        priority: Some(SorPriority::High),
    };
    let sor_id = controller.create_request(&draft).expect("create");
    controller.select_request(&sor_id).expect("select");

    let screen = render_screen(&controller, &opts());
    assert!(screen.contains("PRINCIPAL -> FINANCE -> CFO -> CEO"));
    assert!(screen.contains("note: cost band calls for CEO sign-off"));
}

#[test]
fn boards_show_empty_columns_as_clear() {
    let screen = render_with(|out| write_board(out, &controller("U5"), ViewId::Finance, &opts()));
    assert!(screen.starts_with("FINANCE MATRIX"));
    assert!(screen.contains("[Pending Approvals] (0)"));
    assert!(screen.contains("queue clear"));
}

#[test]
fn long_item_names_are_cut_in_the_registry() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("abcdefghijk", 5), "abcd~");
}
