use chrono::{DateTime, Datelike, Utc};
use shared::{
    domain::{
        AuditEntry, MessageId, Sor, SorAttachment, SorDraft, SorId, SorMessage, SorStatus, User,
        UserId, UserRole, VendorRef, WorkflowAction, CREATED_ACTION,
    },
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tracing::{debug, info, warn};

pub mod approval;
pub mod clock;
pub mod drafts;
pub mod transitions;
pub mod views;

pub use clock::{Clock, FixedClock, SystemClock};

/// Owns the store. Every write to a request goes through the functions in
/// this crate, so the transition table cannot be bypassed.
pub struct ApiContext {
    storage: Storage,
    clock: Box<dyn Clock>,
}

impl ApiContext {
    pub fn new(storage: Storage, clock: impl Clock + 'static) -> Self {
        Self {
            storage,
            clock: Box::new(clock),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub sor_id: SorId,
    pub from: SorStatus,
    pub to: SorStatus,
    pub actor: String,
}

pub fn create_request(
    ctx: &mut ApiContext,
    actor_id: &UserId,
    draft: &SorDraft,
) -> Result<SorId, ApiError> {
    let actor = lookup_user(ctx, actor_id)?;
    let now = ctx.now();
    let valid = drafts::validate_draft(draft, ctx.storage.categories(), now.date_naive())
        .inspect_err(|err| warn!(actor = %actor.id, error = %err, "rejected request draft"))?;

    let branch_id = actor
        .branch
        .branch()
        .cloned()
        .unwrap_or_else(|| ctx.storage.default_branch().clone());
    let sor_id = ctx.storage.allocate_request_id(now.year()).map_err(internal)?;

    let sor = Sor {
        id: sor_id.clone(),
        branch_id: branch_id.clone(),
        requester_id: actor.id.clone(),
        requester_name: actor.name.clone(),
        item_name: valid.item_name,
        quantity: valid.quantity,
        purpose: valid.purpose,
        estimated_cost: valid.estimated_cost,
        required_date: valid.required_date,
        category: valid.category,
        priority: valid.priority,
        status: SorStatus::SubmittedToPrincipal,
        created_at: now,
        messages: Vec::new(),
        attachments: Vec::new(),
        vendor: None,
        audit_log: vec![AuditEntry {
            action: CREATED_ACTION.to_string(),
            user: actor.name.clone(),
            timestamp: now,
            comment: None,
        }],
    };
    ctx.storage.insert_request(sor).map_err(internal)?;

    info!(sor_id = %sor_id, actor = %actor.id, branch = %branch_id, "request created");
    Ok(sor_id)
}

/// Actions `actor` may take on the request right now. Empty when the request
/// is out of the actor's reach or the table lists nothing for the pair.
pub fn permitted_actions(actor: &User, sor: &Sor) -> Vec<WorkflowAction> {
    if !views::can_act(actor, sor) {
        return Vec::new();
    }
    transitions::available_actions(sor.status, actor.role)
}

pub fn offered_actions(
    ctx: &ApiContext,
    actor_id: &UserId,
    sor_id: &SorId,
) -> Result<Vec<WorkflowAction>, ApiError> {
    let actor = lookup_user(ctx, actor_id)?;
    let sor = lookup_request(ctx, sor_id)?;
    Ok(permitted_actions(&actor, sor))
}

pub fn apply_action(
    ctx: &mut ApiContext,
    actor_id: &UserId,
    sor_id: &SorId,
    action: WorkflowAction,
    comment: Option<&str>,
) -> Result<StatusChange, ApiError> {
    let actor = lookup_user(ctx, actor_id)?;
    let now = ctx.now();
    let sor = lookup_request(ctx, sor_id)?;
    ensure_can_act(&actor, sor)?;

    let from = sor.status;
    if !permitted_actions(&actor, sor).contains(&action) {
        warn!(
            sor_id = %sor_id,
            actor = %actor.id,
            role = ?actor.role,
            status = %from,
            action = %action,
            "refused transition"
        );
        return Err(ApiError::new(
            ErrorCode::IllegalTransition,
            format!(
                "{} cannot {} a request that is '{}'",
                actor.role, action, from
            ),
        ));
    }
    let to = transitions::next_status(from, actor.role, action).ok_or_else(|| {
        ApiError::new(ErrorCode::Internal, "transition table is inconsistent")
    })?;

    let sor = request_mut(ctx, sor_id)?;
    let timestamp = audit_timestamp(sor, now);
    sor.status = to;
    sor.audit_log.push(AuditEntry {
        action: transitions::audit_action(to),
        user: actor.name.clone(),
        timestamp,
        comment: normalized_comment(comment),
    });

    info!(sor_id = %sor_id, from = %from, to = %to, actor = %actor.name, "status changed");
    Ok(StatusChange {
        sor_id: sor_id.clone(),
        from,
        to,
        actor: actor.name,
    })
}

pub fn post_message(
    ctx: &mut ApiContext,
    actor_id: &UserId,
    sor_id: &SorId,
    content: &str,
    attachments: Vec<SorAttachment>,
) -> Result<MessageId, ApiError> {
    let actor = lookup_user(ctx, actor_id)?;
    let now = ctx.now();
    ensure_can_act(&actor, lookup_request(ctx, sor_id)?)?;
    if content.trim().is_empty() {
        return Err(ApiError::validation("content", "message is empty"));
    }

    let message_id = MessageId::random();
    let sor = request_mut(ctx, sor_id)?;
    sor.messages.push(SorMessage {
        id: message_id.clone(),
        user_id: actor.id.clone(),
        user_name: actor.name.clone(),
        user_role: actor.role,
        content: content.to_string(),
        timestamp: now,
        attachments,
    });

    debug!(sor_id = %sor_id, actor = %actor.id, message_id = %message_id, "message posted");
    Ok(message_id)
}

pub fn assign_vendor(
    ctx: &mut ApiContext,
    actor_id: &UserId,
    sor_id: &SorId,
    vendor: VendorRef,
) -> Result<(), ApiError> {
    let actor = lookup_user(ctx, actor_id)?;
    let now = ctx.now();
    let sor = lookup_request(ctx, sor_id)?;
    if actor.role != UserRole::Procurement {
        return Err(ApiError::new(
            ErrorCode::Forbidden,
            "only procurement can assign vendors",
        ));
    }
    ensure_can_act(&actor, sor)?;
    if !matches!(
        sor.status,
        SorStatus::InProcurementReview | SorStatus::ApprovedForPo
    ) {
        return Err(ApiError::new(
            ErrorCode::IllegalTransition,
            format!("cannot assign a vendor while '{}'", sor.status),
        ));
    }
    if vendor.name.trim().is_empty() || vendor.id.as_str().trim().is_empty() {
        return Err(ApiError::validation("vendor", "id and name are required"));
    }

    let sor = request_mut(ctx, sor_id)?;
    let timestamp = audit_timestamp(sor, now);
    sor.audit_log.push(AuditEntry {
        action: format!("Vendor assigned: {}", vendor.name),
        user: actor.name.clone(),
        timestamp,
        comment: None,
    });
    info!(sor_id = %sor_id, vendor = %vendor.id, actor = %actor.name, "vendor assigned");
    sor.vendor = Some(vendor);
    Ok(())
}

pub fn visible_requests<'a>(
    ctx: &'a ApiContext,
    actor_id: &UserId,
) -> Result<Vec<&'a Sor>, ApiError> {
    let actor = lookup_user(ctx, actor_id)?;
    Ok(views::visible_requests(&actor, ctx.storage.requests()))
}

fn lookup_user(ctx: &ApiContext, user_id: &UserId) -> Result<User, ApiError> {
    ctx.storage
        .user(user_id)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("user {user_id}")))
}

fn lookup_request<'a>(ctx: &'a ApiContext, sor_id: &SorId) -> Result<&'a Sor, ApiError> {
    ctx.storage
        .request(sor_id)
        .ok_or_else(|| ApiError::not_found(format!("request {sor_id}")))
}

fn request_mut<'a>(ctx: &'a mut ApiContext, sor_id: &SorId) -> Result<&'a mut Sor, ApiError> {
    ctx.storage
        .request_mut(sor_id)
        .ok_or_else(|| ApiError::not_found(format!("request {sor_id}")))
}

fn ensure_can_act(actor: &User, sor: &Sor) -> Result<(), ApiError> {
    if views::can_act(actor, sor) {
        Ok(())
    } else {
        Err(ApiError::new(
            ErrorCode::Forbidden,
            format!("{} belongs to branch {}", sor.id, sor.branch_id),
        ))
    }
}

/// Audit timestamps never go backwards, even if the clock does.
fn audit_timestamp(sor: &Sor, now: DateTime<Utc>) -> DateTime<Utc> {
    sor.last_audit_timestamp()
        .map_or(now, |last| last.max(now))
}

fn normalized_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
