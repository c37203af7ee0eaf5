use serde::Serialize;
use shared::{
    domain::{MessageId, Sor, SorDraft, SorId, User, UserId, UserRole, VendorRef, WorkflowAction},
    error::{ApiError, ErrorCode},
    protocol::{ControllerCommand, ControllerEvent, ViewId},
};
use sor_api::{views, ApiContext, StatusChange};
use tracing::{debug, warn};

use super::navigation::sidebar_views;

/// Root of the dashboard: owns the store (through [`ApiContext`]) and the
/// session state. Views only ever get `&Controller`.
pub struct Controller {
    api: ApiContext,
    active_user: User,
    active_view: ViewId,
    selected: Option<SorId>,
    creating: bool,
}

#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub active_user: &'a User,
    pub active_view: ViewId,
    pub selected: Option<&'a SorId>,
    pub requests: &'a [Sor],
}

impl Controller {
    pub fn new(api: ApiContext, initial_user: &UserId) -> Result<Self, ApiError> {
        let active_user = api
            .storage()
            .user(initial_user)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("user {initial_user}")))?;
        Ok(Self {
            api,
            active_user,
            active_view: ViewId::Dashboard,
            selected: None,
            creating: false,
        })
    }

    pub fn api(&self) -> &ApiContext {
        &self.api
    }

    pub fn active_user(&self) -> &User {
        &self.active_user
    }

    pub fn active_view(&self) -> ViewId {
        self.active_view
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn selected_request(&self) -> Option<&Sor> {
        self.selected
            .as_ref()
            .and_then(|id| self.api.storage().request(id))
    }

    pub fn visible_requests(&self) -> Vec<&Sor> {
        views::visible_requests(&self.active_user, self.api.storage().requests())
    }

    pub fn sidebar(&self) -> Vec<ViewId> {
        sidebar_views(self.active_user.role)
    }

    /// Buttons for the selected request.
    pub fn offered_actions(&self) -> Vec<WorkflowAction> {
        self.selected_request()
            .map(|sor| sor_api::permitted_actions(&self.active_user, sor))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            active_user: &self.active_user,
            active_view: self.active_view,
            selected: self.selected.as_ref(),
            requests: self.api.storage().requests(),
        }
    }

    pub fn select_request(&mut self, sor_id: &SorId) -> Result<(), ApiError> {
        let sor = self
            .api
            .storage()
            .request(sor_id)
            .ok_or_else(|| ApiError::not_found(format!("request {sor_id}")))?;
        if !views::can_act(&self.active_user, sor) {
            return Err(ApiError::new(
                ErrorCode::Forbidden,
                format!("{sor_id} is not visible to {}", self.active_user.name),
            ));
        }
        debug!(sor_id = %sor_id, "request selected");
        self.selected = Some(sor_id.clone());
        self.creating = false;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn open_create_form(&mut self) {
        self.selected = None;
        self.creating = true;
    }

    pub fn create_request(&mut self, draft: &SorDraft) -> Result<SorId, ApiError> {
        let sor_id = sor_api::create_request(&mut self.api, &self.active_user.id, draft)?;
        self.creating = false;
        self.selected = None;
        self.active_view = ViewId::Requests;
        Ok(sor_id)
    }

    pub fn apply_action(
        &mut self,
        action: WorkflowAction,
        comment: Option<&str>,
    ) -> Result<StatusChange, ApiError> {
        let sor_id = self.require_selection()?;
        sor_api::apply_action(&mut self.api, &self.active_user.id, &sor_id, action, comment)
    }

    pub fn post_message(&mut self, content: &str) -> Result<MessageId, ApiError> {
        let sor_id = self.require_selection()?;
        sor_api::post_message(
            &mut self.api,
            &self.active_user.id,
            &sor_id,
            content,
            Vec::new(),
        )
    }

    pub fn assign_vendor(&mut self, vendor: VendorRef) -> Result<(), ApiError> {
        let sor_id = self.require_selection()?;
        sor_api::assign_vendor(&mut self.api, &self.active_user.id, &sor_id, vendor)
    }

    /// Act as the first seeded user holding `role`.
    pub fn switch_active_role(&mut self, role: UserRole) -> Result<(), ApiError> {
        let user_id = self
            .api
            .storage()
            .first_user_with_role(role)
            .map(|u| u.id.clone())
            .ok_or_else(|| ApiError::not_found(format!("no user holds the {role} role")))?;
        self.switch_active_user(&user_id)
    }

    pub fn switch_active_user(&mut self, user_id: &UserId) -> Result<(), ApiError> {
        let user = self
            .api
            .storage()
            .user(user_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("user {user_id}")))?;

        let keep_selection = self
            .selected_request()
            .is_some_and(|sor| views::can_act(&user, sor));
        if !keep_selection {
            self.selected = None;
        }
        debug!(user_id = %user.id, role = ?user.role, keep_selection, "active user changed");
        self.active_user = user;
        self.active_view = ViewId::Dashboard;
        self.creating = false;
        Ok(())
    }

    pub fn switch_view(&mut self, view: ViewId) -> Result<(), ApiError> {
        if !self.sidebar().contains(&view) {
            return Err(ApiError::new(
                ErrorCode::Forbidden,
                format!("{} is not available to {}", view.title(), self.active_user.role),
            ));
        }
        debug!(view = %view, "view changed");
        self.active_view = view;
        self.selected = None;
        self.creating = false;
        Ok(())
    }

    pub fn handle(&mut self, command: ControllerCommand) -> ControllerEvent {
        let result = match command {
            ControllerCommand::SelectRequest { sor_id } => self
                .select_request(&sor_id)
                .map(|()| ControllerEvent::RequestSelected { sor_id }),
            ControllerCommand::ClearSelection => {
                self.clear_selection();
                Ok(ControllerEvent::SelectionCleared)
            }
            ControllerCommand::OpenCreateForm => {
                self.open_create_form();
                Ok(ControllerEvent::CreateFormOpened)
            }
            ControllerCommand::CreateRequest { draft } => self
                .create_request(&draft)
                .map(|sor_id| ControllerEvent::RequestCreated { sor_id }),
            ControllerCommand::ApplyAction { action, comment } => self
                .apply_action(action, comment.as_deref())
                .map(|change| ControllerEvent::StatusChanged {
                    sor_id: change.sor_id,
                    from: change.from,
                    to: change.to,
                    actor: change.actor,
                }),
            ControllerCommand::PostMessage { content } => {
                self.post_message(&content).and_then(|message_id| {
                    let sor_id = self.require_selection()?;
                    Ok(ControllerEvent::MessagePosted { sor_id, message_id })
                })
            }
            ControllerCommand::AssignVendor { vendor } => {
                self.assign_vendor(vendor.clone()).and_then(|()| {
                    let sor_id = self.require_selection()?;
                    Ok(ControllerEvent::VendorAssigned { sor_id, vendor })
                })
            }
            ControllerCommand::SwitchRole { role } => {
                self.switch_active_role(role).map(|()| self.user_changed())
            }
            ControllerCommand::SwitchUser { user_id } => self
                .switch_active_user(&user_id)
                .map(|()| self.user_changed()),
            ControllerCommand::SwitchView { view } => self
                .switch_view(view)
                .map(|()| ControllerEvent::ViewChanged { view }),
        };

        result.unwrap_or_else(|err| {
            warn!(code = ?err.code, message = %err.message, "command refused");
            ControllerEvent::Error(err)
        })
    }

    fn user_changed(&self) -> ControllerEvent {
        ControllerEvent::ActiveUserChanged {
            user_id: self.active_user.id.clone(),
            role: self.active_user.role,
        }
    }

    fn require_selection(&self) -> Result<SorId, ApiError> {
        self.selected
            .clone()
            .ok_or_else(|| ApiError::new(ErrorCode::Validation, "no request selected"))
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
