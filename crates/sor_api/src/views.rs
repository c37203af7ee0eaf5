//! Read-side projections: who sees which requests, dashboard figures and the
//! per-department work boards.

use shared::domain::{AuditEntry, Branch, Sor, SorId, SorStatus, User, UserRole};

pub fn can_view(user: &User, sor: &Sor) -> bool {
    user.role.sees_all_branches() || user.branch.branch() == Some(&sor.branch_id)
}

/// Whether `user` may work on `sor`: it is in the user's branch scope, or it
/// sits on one of the boards the user's role runs.
pub fn can_act(user: &User, sor: &Sor) -> bool {
    can_view(user, sor)
        || boards_for_role(user.role)
            .into_iter()
            .any(|kind| board_statuses(kind).any(|status| status == sor.status))
}

/// Requests the user may list, in collection order (newest first).
pub fn visible_requests<'a>(user: &User, requests: &'a [Sor]) -> Vec<&'a Sor> {
    requests.iter().filter(|sor| can_view(user, sor)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleFlags {
    pub management: bool,
    pub procurement: bool,
    pub branch_admin: bool,
}

impl RoleFlags {
    pub fn for_role(role: UserRole) -> Self {
        Self {
            management: matches!(
                role,
                UserRole::Ceo | UserRole::Cfo | UserRole::SuperAdmin | UserRole::Finance
            ),
            procurement: role == UserRole::Procurement,
            branch_admin: matches!(role, UserRole::BranchAdmin | UserRole::Principal),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchSpend {
    pub short_name: String,
    pub spent: f64,
    pub budget: f64,
}

impl BranchSpend {
    fn from_branch(branch: &Branch) -> Self {
        Self {
            short_name: branch
                .name
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            spent: branch.spent,
            budget: branch.budget,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityItem<'a> {
    pub sor_id: &'a SorId,
    pub entry: &'a AuditEntry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary<'a> {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub spent: f64,
    pub flags: RoleFlags,
    pub branches: Vec<BranchSpend>,
    pub activity: Vec<ActivityItem<'a>>,
}

pub fn dashboard_summary<'a>(
    user: &User,
    requests: &'a [Sor],
    branches: &[Branch],
    activity_limit: usize,
) -> DashboardSummary<'a> {
    let visible = visible_requests(user, requests);

    let pending = visible.iter().filter(|s| s.status.is_open()).count();
    let approved = visible
        .iter()
        .filter(|s| matches!(s.status, SorStatus::PoGenerated | SorStatus::Delivered))
        .count();
    let spent: f64 = visible
        .iter()
        .filter(|s| s.status == SorStatus::Paid)
        .map(|s| s.estimated_cost)
        .sum();

    let mut activity: Vec<ActivityItem<'a>> = visible
        .iter()
        .copied()
        .flat_map(|sor: &'a Sor| {
            sor.audit_log.iter().map(move |entry| ActivityItem {
                sor_id: &sor.id,
                entry,
            })
        })
        .collect();
    activity.sort_by(|a, b| b.entry.timestamp.cmp(&a.entry.timestamp));
    activity.truncate(activity_limit);

    DashboardSummary {
        total: visible.len(),
        pending,
        approved,
        spent,
        flags: RoleFlags::for_role(user.role),
        branches: branches.iter().map(BranchSpend::from_branch).collect(),
        activity,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKind {
    Sourcing,
    Inventory,
    Finance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardColumn<'a> {
    pub title: &'static str,
    pub statuses: &'static [SorStatus],
    pub requests: Vec<&'a Sor>,
}

const SOURCING_COLUMNS: [(&str, &[SorStatus]); 3] = [
    ("New Approvals", &[SorStatus::ApprovedByPrincipal]),
    ("Market Review", &[SorStatus::InProcurementReview]),
    ("PO Ready", &[SorStatus::ApprovedForPo]),
];

const INVENTORY_COLUMNS: [(&str, &[SorStatus]); 2] = [
    ("Stock Verification", &[SorStatus::InventoryCheck]),
    ("Inbound Deliveries", &[SorStatus::PoGenerated]),
];

const FINANCE_COLUMNS: [(&str, &[SorStatus]); 2] = [
    (
        "Pending Approvals",
        &[
            SorStatus::PendingFinance,
            SorStatus::PendingCfo,
            SorStatus::PendingCeo,
        ],
    ),
    ("Invoice Clearing", &[SorStatus::Delivered]),
];

type ColumnLayout = [(&'static str, &'static [SorStatus])];

fn layout(kind: BoardKind) -> &'static ColumnLayout {
    match kind {
        BoardKind::Sourcing => &SOURCING_COLUMNS,
        BoardKind::Inventory => &INVENTORY_COLUMNS,
        BoardKind::Finance => &FINANCE_COLUMNS,
    }
}

/// Boards run by `role`, in sidebar order.
pub fn boards_for_role(role: UserRole) -> Vec<BoardKind> {
    let mut boards = Vec::new();
    if matches!(role, UserRole::Procurement | UserRole::SuperAdmin) {
        boards.push(BoardKind::Sourcing);
    }
    if matches!(role, UserRole::Inventory | UserRole::SuperAdmin) {
        boards.push(BoardKind::Inventory);
    }
    if matches!(
        role,
        UserRole::Finance | UserRole::Cfo | UserRole::Ceo | UserRole::SuperAdmin
    ) {
        boards.push(BoardKind::Finance);
    }
    boards
}

/// Every status shown somewhere on the board.
pub fn board_statuses(kind: BoardKind) -> impl Iterator<Item = SorStatus> {
    layout(kind)
        .iter()
        .flat_map(|&(_, statuses)| statuses.iter().copied())
}

/// Boards cover the whole collection, not just the viewer's branch.
pub fn board(kind: BoardKind, requests: &[Sor]) -> Vec<BoardColumn<'_>> {
    layout(kind)
        .iter()
        .map(|&(title, statuses)| BoardColumn {
            title,
            statuses,
            requests: requests
                .iter()
                .filter(|sor| statuses.contains(&sor.status))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
