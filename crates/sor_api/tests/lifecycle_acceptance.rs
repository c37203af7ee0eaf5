use chrono::{Duration, NaiveDate, TimeZone, Utc};
use shared::{
    domain::{SorDraft, SorPriority, SorStatus, UserId, WorkflowAction, CREATED_ACTION},
    error::ErrorCode,
};
use sor_api::{
    apply_action, create_request, offered_actions,
    views::{board, dashboard_summary, BoardKind},
    ApiContext, FixedClock,
};
use storage::{Seed, Storage};

#[test]
fn new_request_travels_from_submission_to_payment() {
    let start = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    let clock = FixedClock::new(start);
    let storage = Storage::new(Seed::builtin(start)).expect("seed");
    let mut ctx = ApiContext::new(storage, clock.clone());

    let draft = SorDraft {
        item_name: Some("Basketball hoops".to_string()),
        quantity: Some(2),
        purpose: Some("Replace the rusted outdoor hoops".to_string()),
        estimated_cost: Some(2_400.0),
        required_date: NaiveDate::from_ymd_opt(2024, 12, 1),
        category: Some("Sports".to_string()),
        priority: Some(SorPriority::High),
    };
    let sor_id = create_request(&mut ctx, &UserId::from("U3"), &draft).expect("create");

    let steps = [
        ("U2", WorkflowAction::Approve, SorStatus::ApprovedByPrincipal),
        ("U4", WorkflowAction::BeginSourcing, SorStatus::InProcurementReview),
        ("U4", WorkflowAction::StartInventoryCheck, SorStatus::InventoryCheck),
        ("U8", WorkflowAction::ConfirmNoStock, SorStatus::PendingFinance),
        ("U5", WorkflowAction::VerifyBudget, SorStatus::PendingCfo),
        ("U6", WorkflowAction::Authorize, SorStatus::ApprovedForPo),
        ("U4", WorkflowAction::GeneratePo, SorStatus::PoGenerated),
        ("U8", WorkflowAction::ConfirmReceipt, SorStatus::Delivered),
        ("U5", WorkflowAction::ExecutePayment, SorStatus::Paid),
    ];

    let mut audit_len = 1;
    for (user, action, expected) in steps {
        clock.advance(Duration::minutes(5));
        let actor = UserId::from(user);

        // the teacher who raised the request never gets a button along the way
        assert!(offered_actions(&ctx, &UserId::from("U3"), &sor_id)
            .expect("offered")
            .is_empty());
        assert!(offered_actions(&ctx, &actor, &sor_id)
            .expect("offered")
            .contains(&action));

        let change = apply_action(&mut ctx, &actor, &sor_id, action, None).expect("step");
        assert_eq!(change.to, expected);

        let sor = ctx.storage().request(&sor_id).expect("request");
        assert!(sor.audit_log.len() > audit_len);
        audit_len = sor.audit_log.len();
        assert_eq!(sor.audit_log[0].action, CREATED_ACTION);
    }

    let sor = ctx.storage().request(&sor_id).expect("request");
    assert_eq!(sor.status, SorStatus::Paid);
    assert_eq!(sor.audit_log.len(), 10);

    let err = apply_action(
        &mut ctx,
        &UserId::from("U5"),
        &sor_id,
        WorkflowAction::ExecutePayment,
        None,
    )
    .expect_err("already paid");
    assert_eq!(err.code, ErrorCode::IllegalTransition);

    let cfo = ctx
        .storage()
        .user(&UserId::from("U6"))
        .expect("cfo")
        .clone();
    let summary = dashboard_summary(&cfo, ctx.storage().requests(), ctx.storage().branches(), 3);
    assert_eq!(summary.spent, 2_400.0);
    assert_eq!(summary.activity.len(), 3);
    assert_eq!(summary.activity[0].sor_id, &sor_id);

    let finance = board(BoardKind::Finance, ctx.storage().requests());
    assert!(finance.iter().all(|column| column.requests.is_empty()));
}
