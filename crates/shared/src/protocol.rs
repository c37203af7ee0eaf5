use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{MessageId, SorDraft, SorId, SorStatus, UserId, UserRole, VendorRef, WorkflowAction},
    error::ApiError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    #[default]
    Dashboard,
    Requests,
    Sourcing,
    Inventory,
    Finance,
    Users,
    Settings,
}

impl ViewId {
    pub const ALL: [ViewId; 7] = [
        ViewId::Dashboard,
        ViewId::Requests,
        ViewId::Sourcing,
        ViewId::Inventory,
        ViewId::Finance,
        ViewId::Users,
        ViewId::Settings,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ViewId::Dashboard => "dashboard",
            ViewId::Requests => "requests",
            ViewId::Sourcing => "sourcing",
            ViewId::Inventory => "inventory",
            ViewId::Finance => "finance",
            ViewId::Users => "users",
            ViewId::Settings => "settings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewId::Dashboard => "Dashboard",
            ViewId::Requests => "Order Registry",
            ViewId::Sourcing => "Sourcing Hub",
            ViewId::Inventory => "Inventory Node",
            ViewId::Finance => "Finance Matrix",
            ViewId::Users => "Staff Node",
            ViewId::Settings => "Global Config",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ViewId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = match normalized.as_str() {
            "sors" | "registry" => "requests",
            other => other,
        };
        ViewId::ALL
            .into_iter()
            .find(|view| view.code() == normalized)
            .ok_or_else(|| format!("unknown view '{s}'"))
    }
}

/// Intents the views send to the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ControllerCommand {
    SelectRequest {
        sor_id: SorId,
    },
    ClearSelection,
    OpenCreateForm,
    CreateRequest {
        draft: SorDraft,
    },
    ApplyAction {
        action: WorkflowAction,
        #[serde(default)]
        comment: Option<String>,
    },
    PostMessage {
        content: String,
    },
    AssignVendor {
        vendor: VendorRef,
    },
    SwitchRole {
        role: UserRole,
    },
    SwitchUser {
        user_id: UserId,
    },
    SwitchView {
        view: ViewId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ControllerEvent {
    RequestSelected {
        sor_id: SorId,
    },
    SelectionCleared,
    CreateFormOpened,
    RequestCreated {
        sor_id: SorId,
    },
    StatusChanged {
        sor_id: SorId,
        from: SorStatus,
        to: SorStatus,
        actor: String,
    },
    MessagePosted {
        sor_id: SorId,
        message_id: MessageId,
    },
    VendorAssigned {
        sor_id: SorId,
        vendor: VendorRef,
    },
    ActiveUserChanged {
        user_id: UserId,
        role: UserRole,
    },
    ViewChanged {
        view: ViewId,
    },
    Error(ApiError),
}
