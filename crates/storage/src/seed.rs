//! Startup data for the in-memory store.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::{
    AuditEntry, Branch, BranchId, BranchScope, MessageId, Sor, SorId, SorMessage, SorPriority,
    SorStatus, User, UserId, UserRole, CREATED_ACTION,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    pub branches: Vec<Branch>,
    pub users: Vec<User>,
    pub categories: Vec<String>,
    #[serde(default)]
    pub requests: Vec<Sor>,
}

impl Seed {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse seed file '{}'", path.display()))
    }

    /// The demo organisation: six branches, one user per role of interest and
    /// two sample requests. Timestamps are pinned to `now`.
    pub fn builtin(now: DateTime<Utc>) -> Self {
        Self {
            branches: builtin_branches(),
            users: builtin_users(),
            categories: builtin_categories(),
            requests: builtin_requests(now),
        }
    }
}

fn branch(id: &str, name: &str, location: &str, budget: f64, spent: f64) -> Branch {
    Branch {
        id: BranchId::from(id),
        name: name.to_string(),
        location: location.to_string(),
        budget,
        spent,
    }
}

fn builtin_branches() -> Vec<Branch> {
    vec![
        branch("B1", "Doha West Bay", "Doha", 500_000.0, 120_000.0),
        branch("B2", "Al Wakrah Campus", "Al Wakrah", 400_000.0, 85_000.0),
        branch("B3", "Al Khor Branch", "Al Khor", 350_000.0, 45_000.0),
        branch("B4", "Lusail School", "Lusail", 600_000.0, 210_000.0),
        branch("B5", "The Pearl Academy", "The Pearl", 750_000.0, 300_000.0),
        branch("B6", "Education City Hub", "Al Rayyan", 550_000.0, 110_000.0),
    ]
}

fn user(id: &str, name: &str, email: &str, role: UserRole, scope: &str) -> User {
    User {
        id: UserId::from(id),
        name: name.to_string(),
        email: email.to_string(),
        role,
        branch: BranchScope::from(scope.to_string()),
        department: None,
    }
}

fn builtin_users() -> Vec<User> {
    let mut teacher = user("U3", "Teacher Ahmed", "ahmed@edison.qa", UserRole::Teacher, "B1");
    teacher.department = Some("IT".to_string());
    let mut inventory = user(
        "U8",
        "Inventory Officer",
        "stores@edison.qa",
        UserRole::Inventory,
        "B1",
    );
    inventory.department = Some("Stores".to_string());

    vec![
        user("U1", "Admin One", "super@edison.qa", UserRole::SuperAdmin, "GLOBAL"),
        user(
            "U2",
            "Principal Sarah",
            "principal.doha@edison.qa",
            UserRole::Principal,
            "B1",
        ),
        teacher,
        user("U4", "Procurement Lead", "proc@edison.qa", UserRole::Procurement, "GLOBAL"),
        user("U5", "Finance Controller", "finance@edison.qa", UserRole::Finance, "GLOBAL"),
        user("U6", "John CFO", "cfo@edison.qa", UserRole::Cfo, "GLOBAL"),
        user("U7", "CEO Khalid", "ceo@edison.qa", UserRole::Ceo, "GLOBAL"),
        inventory,
    ]
}

fn builtin_categories() -> Vec<String> {
    ["IT", "Stationery", "Maintenance", "HR", "Admin", "Science Lab", "Sports"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn builtin_requests(now: DateTime<Utc>) -> Vec<Sor> {
    let created = |user: &str| AuditEntry {
        action: CREATED_ACTION.to_string(),
        user: user.to_string(),
        timestamp: now,
        comment: None,
    };

    vec![
        Sor {
            id: SorId::from("SOR-2024-001"),
            branch_id: BranchId::from("B1"),
            requester_id: UserId::from("U3"),
            requester_name: "Teacher Ahmed".to_string(),
            item_name: "Interactive Smart Boards (x5)".to_string(),
            quantity: 5,
            purpose: "Classroom upgrade for Science block".to_string(),
            estimated_cost: 15_000.0,
            required_date: NaiveDate::from_ymd_opt(2024, 11, 20).unwrap_or_default(),
            category: "IT".to_string(),
            priority: SorPriority::High,
            status: SorStatus::SubmittedToPrincipal,
            created_at: now,
            messages: Vec::new(),
            attachments: Vec::new(),
            vendor: None,
            audit_log: vec![created("Teacher Ahmed")],
        },
        Sor {
            id: SorId::from("SOR-2024-002"),
            branch_id: BranchId::from("B1"),
            requester_id: UserId::from("U3"),
            requester_name: "Teacher Ahmed".to_string(),
            item_name: "Ergonomic Chairs".to_string(),
            quantity: 20,
            purpose: "Staff room refurbishment".to_string(),
            estimated_cost: 8_500.0,
            required_date: NaiveDate::from_ymd_opt(2024, 12, 5).unwrap_or_default(),
            category: "Admin".to_string(),
            priority: SorPriority::Medium,
            status: SorStatus::ApprovedByPrincipal,
            created_at: now,
            messages: vec![SorMessage {
                id: MessageId::from("M1"),
                user_id: UserId::from("U2"),
                user_name: "Principal Sarah".to_string(),
                user_role: UserRole::Principal,
                content: "Approved for procurement sourcing.".to_string(),
                timestamp: now,
                attachments: Vec::new(),
            }],
            attachments: Vec::new(),
            vendor: None,
            audit_log: vec![
                created("Teacher Ahmed"),
                AuditEntry {
                    action: "Approved by Principal".to_string(),
                    user: "Principal Sarah".to_string(),
                    timestamp: now,
                    comment: None,
                },
            ],
        },
    ]
}
