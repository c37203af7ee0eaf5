use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(BranchId);
id_newtype!(SorId);
id_newtype!(MessageId);
id_newtype!(AttachmentId);
id_newtype!(VendorId);

impl MessageId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    BranchAdmin,
    Principal,
    Teacher,
    Procurement,
    Inventory,
    Finance,
    Cfo,
    Ceo,
    Maintenance,
    Hr,
}

impl UserRole {
    pub const ALL: [UserRole; 11] = [
        UserRole::SuperAdmin,
        UserRole::BranchAdmin,
        UserRole::Principal,
        UserRole::Teacher,
        UserRole::Procurement,
        UserRole::Inventory,
        UserRole::Finance,
        UserRole::Cfo,
        UserRole::Ceo,
        UserRole::Maintenance,
        UserRole::Hr,
    ];

    pub fn code(self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::BranchAdmin => "BRANCH_ADMIN",
            UserRole::Principal => "PRINCIPAL",
            UserRole::Teacher => "TEACHER",
            UserRole::Procurement => "PROCUREMENT",
            UserRole::Inventory => "INVENTORY",
            UserRole::Finance => "FINANCE",
            UserRole::Cfo => "CFO",
            UserRole::Ceo => "CEO",
            UserRole::Maintenance => "MAINTENANCE",
            UserRole::Hr => "HR",
        }
    }

    /// Roles that see every request regardless of branch.
    pub fn sees_all_branches(self) -> bool {
        matches!(
            self,
            UserRole::SuperAdmin
                | UserRole::Ceo
                | UserRole::Cfo
                | UserRole::Procurement
                | UserRole::Finance
        )
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.code().replace('_', " "))
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        UserRole::ALL
            .into_iter()
            .find(|role| role.code() == normalized)
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SorStatus {
    #[serde(rename = "Submitted to Principal")]
    SubmittedToPrincipal,
    #[serde(rename = "Clarification Required")]
    ClarificationRequired,
    #[serde(rename = "Approved by Principal")]
    ApprovedByPrincipal,
    #[serde(rename = "Rejected")]
    Rejected,
    #[serde(rename = "In Procurement Review")]
    InProcurementReview,
    #[serde(rename = "Inventory Check")]
    InventoryCheck,
    #[serde(rename = "Pending Finance")]
    PendingFinance,
    #[serde(rename = "Pending CFO")]
    PendingCfo,
    #[serde(rename = "Pending CEO")]
    PendingCeo,
    #[serde(rename = "Approved for PO")]
    ApprovedForPo,
    #[serde(rename = "PO Generated")]
    PoGenerated,
    #[serde(rename = "Delivered")]
    Delivered,
    #[serde(rename = "Paid")]
    Paid,
}

impl SorStatus {
    pub const ALL: [SorStatus; 13] = [
        SorStatus::SubmittedToPrincipal,
        SorStatus::ClarificationRequired,
        SorStatus::ApprovedByPrincipal,
        SorStatus::Rejected,
        SorStatus::InProcurementReview,
        SorStatus::InventoryCheck,
        SorStatus::PendingFinance,
        SorStatus::PendingCfo,
        SorStatus::PendingCeo,
        SorStatus::ApprovedForPo,
        SorStatus::PoGenerated,
        SorStatus::Delivered,
        SorStatus::Paid,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SorStatus::SubmittedToPrincipal => "Submitted to Principal",
            SorStatus::ClarificationRequired => "Clarification Required",
            SorStatus::ApprovedByPrincipal => "Approved by Principal",
            SorStatus::Rejected => "Rejected",
            SorStatus::InProcurementReview => "In Procurement Review",
            SorStatus::InventoryCheck => "Inventory Check",
            SorStatus::PendingFinance => "Pending Finance",
            SorStatus::PendingCfo => "Pending CFO",
            SorStatus::PendingCeo => "Pending CEO",
            SorStatus::ApprovedForPo => "Approved for PO",
            SorStatus::PoGenerated => "PO Generated",
            SorStatus::Delivered => "Delivered",
            SorStatus::Paid => "Paid",
        }
    }

    /// Delivered, rejected and paid requests no longer count as pending work.
    pub fn is_open(self) -> bool {
        !matches!(
            self,
            SorStatus::Delivered | SorStatus::Rejected | SorStatus::Paid
        )
    }
}

impl fmt::Display for SorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SorPriority {
    Low,
    Medium,
    High,
}

impl fmt::Display for SorPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SorPriority::Low => "Low",
            SorPriority::Medium => "Medium",
            SorPriority::High => "High",
        };
        f.pad(label)
    }
}

impl FromStr for SorPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(SorPriority::Low),
            "medium" => Ok(SorPriority::Medium),
            "high" => Ok(SorPriority::High),
            _ => Err(format!("unknown priority '{s}'")),
        }
    }
}

/// Named steps of the request lifecycle. Which of them a user may take is
/// decided by the transition table in `sor_api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Approve,
    Reject,
    RequestClarification,
    BeginSourcing,
    StartInventoryCheck,
    ConfirmNoStock,
    VerifyBudget,
    Authorize,
    GeneratePo,
    ConfirmReceipt,
    ExecutePayment,
}

impl WorkflowAction {
    pub const ALL: [WorkflowAction; 11] = [
        WorkflowAction::Approve,
        WorkflowAction::Reject,
        WorkflowAction::RequestClarification,
        WorkflowAction::BeginSourcing,
        WorkflowAction::StartInventoryCheck,
        WorkflowAction::ConfirmNoStock,
        WorkflowAction::VerifyBudget,
        WorkflowAction::Authorize,
        WorkflowAction::GeneratePo,
        WorkflowAction::ConfirmReceipt,
        WorkflowAction::ExecutePayment,
    ];

    pub fn code(self) -> &'static str {
        match self {
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::RequestClarification => "request_clarification",
            WorkflowAction::BeginSourcing => "begin_sourcing",
            WorkflowAction::StartInventoryCheck => "start_inventory_check",
            WorkflowAction::ConfirmNoStock => "confirm_no_stock",
            WorkflowAction::VerifyBudget => "verify_budget",
            WorkflowAction::Authorize => "authorize",
            WorkflowAction::GeneratePo => "generate_po",
            WorkflowAction::ConfirmReceipt => "confirm_receipt",
            WorkflowAction::ExecutePayment => "execute_payment",
        }
    }

    /// Button caption shown next to the action.
    pub fn label(self) -> &'static str {
        match self {
            WorkflowAction::Approve => "Authorize Approval",
            WorkflowAction::Reject => "Decline Request",
            WorkflowAction::RequestClarification => "Request Clarification",
            WorkflowAction::BeginSourcing => "Begin Market Sourcing",
            WorkflowAction::StartInventoryCheck => "Initiate Inventory Check",
            WorkflowAction::ConfirmNoStock => "Cleared: No Stock Available",
            WorkflowAction::VerifyBudget => "Verify Budget Allocation",
            WorkflowAction::Authorize => "Sign CFO Authorization",
            WorkflowAction::GeneratePo => "Generate & Sync PO",
            WorkflowAction::ConfirmReceipt => "Confirm Asset Receipt",
            WorkflowAction::ExecutePayment => "Execute Payment",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

impl FromStr for WorkflowAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        WorkflowAction::ALL
            .into_iter()
            .find(|action| action.code() == normalized)
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}

/// A user's branch affiliation. Serialized as the branch id, or `GLOBAL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BranchScope {
    Global,
    Branch(BranchId),
}

impl BranchScope {
    pub fn branch(&self) -> Option<&BranchId> {
        match self {
            BranchScope::Global => None,
            BranchScope::Branch(id) => Some(id),
        }
    }
}

impl From<String> for BranchScope {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("GLOBAL") {
            BranchScope::Global
        } else {
            BranchScope::Branch(BranchId(value))
        }
    }
}

impl From<BranchScope> for String {
    fn from(value: BranchScope) -> Self {
        match value {
            BranchScope::Global => "GLOBAL".to_string(),
            BranchScope::Branch(id) => id.0,
        }
    }
}

impl fmt::Display for BranchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchScope::Global => f.pad("GLOBAL"),
            BranchScope::Branch(id) => f.pad(id.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub branch: BranchScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub location: String,
    pub budget: f64,
    pub spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SorAttachment {
    pub id: AttachmentId,
    pub name: String,
    pub mime_type: String,
    pub url: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SorMessage {
    pub id: MessageId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_role: UserRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SorAttachment>,
}

/// Action label of the first audit entry of every request.
pub const CREATED_ACTION: &str = "SOR Created";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRef {
    pub id: VendorId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sor {
    pub id: SorId,
    pub branch_id: BranchId,
    pub requester_id: UserId,
    pub requester_name: String,
    pub item_name: String,
    pub quantity: u32,
    pub purpose: String,
    pub estimated_cost: f64,
    pub required_date: NaiveDate,
    pub category: String,
    pub priority: SorPriority,
    pub status: SorStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<SorMessage>,
    #[serde(default)]
    pub attachments: Vec<SorAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorRef>,
    pub audit_log: Vec<AuditEntry>,
}

impl Sor {
    pub fn last_audit_timestamp(&self) -> Option<DateTime<Utc>> {
        self.audit_log.last().map(|entry| entry.timestamp)
    }
}

/// Creation form contents. Every field is optional until validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorDraft {
    pub item_name: Option<String>,
    pub quantity: Option<u32>,
    pub purpose: Option<String>,
    pub estimated_cost: Option<f64>,
    pub required_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub priority: Option<SorPriority>,
}
