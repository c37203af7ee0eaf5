//! Cost bands and the sign-offs each band calls for.
//!
//! This table is informational. Status changes are governed only by
//! [`crate::transitions`], which never routes a request through the CEO.

use shared::domain::UserRole;

pub const PRINCIPAL_LIMIT: f64 = 500.0;
pub const FINANCE_LIMIT: f64 = 10_000.0;
pub const CFO_LIMIT: f64 = 50_000.0;

pub fn approval_path(cost: f64) -> Vec<UserRole> {
    let mut path = vec![UserRole::Principal];
    if cost > PRINCIPAL_LIMIT {
        path.push(UserRole::Finance);
    }
    if cost > FINANCE_LIMIT {
        path.push(UserRole::Cfo);
    }
    if cost > CFO_LIMIT {
        path.push(UserRole::Ceo);
    }
    path
}

/// Sign-offs the cost band asks for that the lifecycle has no step for.
pub fn unenforced_approvals(cost: f64) -> Vec<UserRole> {
    approval_path(cost)
        .into_iter()
        .filter(|role| *role == UserRole::Ceo)
        .collect()
}
