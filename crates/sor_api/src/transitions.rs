//! The request lifecycle: which role may take which action from which status.

use shared::domain::{SorStatus, UserRole, WorkflowAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SorStatus,
    pub role: UserRole,
    pub action: WorkflowAction,
    pub to: SorStatus,
}

const fn rule(
    from: SorStatus,
    role: UserRole,
    action: WorkflowAction,
    to: SorStatus,
) -> Transition {
    Transition {
        from,
        role,
        action,
        to,
    }
}

pub const TRANSITIONS: [Transition; 11] = [
    rule(
        SorStatus::SubmittedToPrincipal,
        UserRole::Principal,
        WorkflowAction::Approve,
        SorStatus::ApprovedByPrincipal,
    ),
    rule(
        SorStatus::SubmittedToPrincipal,
        UserRole::Principal,
        WorkflowAction::Reject,
        SorStatus::Rejected,
    ),
    rule(
        SorStatus::SubmittedToPrincipal,
        UserRole::Principal,
        WorkflowAction::RequestClarification,
        SorStatus::ClarificationRequired,
    ),
    rule(
        SorStatus::ApprovedByPrincipal,
        UserRole::Procurement,
        WorkflowAction::BeginSourcing,
        SorStatus::InProcurementReview,
    ),
    rule(
        SorStatus::InProcurementReview,
        UserRole::Procurement,
        WorkflowAction::StartInventoryCheck,
        SorStatus::InventoryCheck,
    ),
    rule(
        SorStatus::InventoryCheck,
        UserRole::Inventory,
        WorkflowAction::ConfirmNoStock,
        SorStatus::PendingFinance,
    ),
    rule(
        SorStatus::PendingFinance,
        UserRole::Finance,
        WorkflowAction::VerifyBudget,
        SorStatus::PendingCfo,
    ),
    rule(
        SorStatus::PendingCfo,
        UserRole::Cfo,
        WorkflowAction::Authorize,
        SorStatus::ApprovedForPo,
    ),
    rule(
        SorStatus::ApprovedForPo,
        UserRole::Procurement,
        WorkflowAction::GeneratePo,
        SorStatus::PoGenerated,
    ),
    rule(
        SorStatus::PoGenerated,
        UserRole::Inventory,
        WorkflowAction::ConfirmReceipt,
        SorStatus::Delivered,
    ),
    rule(
        SorStatus::Delivered,
        UserRole::Finance,
        WorkflowAction::ExecutePayment,
        SorStatus::Paid,
    ),
];

/// Actions offered to `role` on a request currently in `status`, in table order.
pub fn available_actions(status: SorStatus, role: UserRole) -> Vec<WorkflowAction> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == status && t.role == role)
        .map(|t| t.action)
        .collect()
}

/// Target status of `action`, or `None` when the table does not allow it.
pub fn next_status(status: SorStatus, role: UserRole, action: WorkflowAction) -> Option<SorStatus> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == status && t.role == role && t.action == action)
        .map(|t| t.to)
}

/// Role that owns the next step for a request in `status`, if any.
pub fn responsible_role(status: SorStatus) -> Option<UserRole> {
    TRANSITIONS.iter().find(|t| t.from == status).map(|t| t.role)
}

pub fn audit_action(to: SorStatus) -> String {
    format!("Status changed to {}", to.label())
}

#[cfg(test)]
#[path = "tests/transitions_tests.rs"]
mod tests;
