//! Plain-text rendering of each dashboard view.

use std::fmt::{self, Write as _};

use shared::{
    domain::{Sor, UserRole},
    protocol::ViewId,
};
use sor_api::{approval, transitions, views};

use crate::controller::{navigation::board_for, Controller};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub currency: String,
    pub activity_limit: usize,
}

/// Runs a view writer into a fresh buffer. Writing to a `String` does not fail.
fn render_with(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    write(&mut out).map(|()| out).unwrap_or_default()
}

pub fn render_screen(controller: &Controller, opts: &RenderOptions) -> String {
    render_with(|out| write_screen(out, controller, opts))
}

fn write_screen(out: &mut String, controller: &Controller, opts: &RenderOptions) -> fmt::Result {
    let user = controller.active_user();
    writeln!(
        out,
        "== {} | {} ({}) ==",
        controller.active_view().title(),
        user.name,
        user.role
    )?;
    let nav: Vec<String> = controller
        .sidebar()
        .into_iter()
        .map(|view| {
            if view == controller.active_view() {
                format!("[{}]", view.code())
            } else {
                view.code().to_string()
            }
        })
        .collect();
    writeln!(out, "nav: {}\n", nav.join(" | "))?;

    if let Some(sor) = controller.selected_request() {
        return write_detail(out, controller, sor, opts);
    }
    if controller.is_creating() {
        return write_create_form(out, controller);
    }
    match controller.active_view() {
        ViewId::Dashboard => write_dashboard(out, controller, opts),
        ViewId::Requests => write_request_list(out, controller, opts),
        ViewId::Users => write_users(out, controller),
        ViewId::Settings => write_settings(out, controller, opts),
        view => write_board(out, controller, view, opts),
    }
}

fn write_dashboard(out: &mut String, controller: &Controller, opts: &RenderOptions) -> fmt::Result {
    let storage = controller.api().storage();
    let summary = views::dashboard_summary(
        controller.active_user(),
        storage.requests(),
        storage.branches(),
        opts.activity_limit,
    );

    writeln!(out, "MISSION CONTROL")?;
    writeln!(
        out,
        "total {} | pending {} | approved {} | spent {}",
        summary.total,
        summary.pending,
        summary.approved,
        money(&opts.currency, summary.spent)
    )?;

    if summary.flags.management {
        writeln!(out, "\nbranch spend vs budget:")?;
        for branch in &summary.branches {
            writeln!(
                out,
                "  {:<12} {:>16} / {}",
                branch.short_name,
                money(&opts.currency, branch.spent),
                money(&opts.currency, branch.budget)
            )?;
        }
    } else if summary.flags.procurement {
        let columns = views::board(views::BoardKind::Sourcing, storage.requests());
        let waiting: usize = columns.iter().map(|c| c.requests.len()).sum();
        writeln!(out, "\nsourcing queue: {waiting} request(s)")?;
    } else if summary.flags.branch_admin {
        let awaiting = controller
            .visible_requests()
            .into_iter()
            .filter(|sor| !sor_api::permitted_actions(controller.active_user(), sor).is_empty())
            .count();
        writeln!(out, "\nawaiting your decision: {awaiting}")?;
    }

    writeln!(out, "\nrecent activity:")?;
    if summary.activity.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for item in &summary.activity {
        writeln!(
            out,
            "  {} {} - {} ({})",
            item.entry.timestamp.format("%Y-%m-%d %H:%M"),
            item.sor_id,
            item.entry.action,
            item.entry.user
        )?;
    }
    Ok(())
}

fn write_request_list(
    out: &mut String,
    controller: &Controller,
    opts: &RenderOptions,
) -> fmt::Result {
    writeln!(out, "ORDER REGISTRY")?;
    writeln!(
        out,
        "{:<14} {:<32} {:<6} {:<8} {:<24} {}",
        "REF ID", "ITEM", "BRANCH", "PRIORITY", "STATUS", "EST. COST"
    )?;
    let requests = controller.visible_requests();
    if requests.is_empty() {
        writeln!(out, "(no requests)")?;
    }
    for sor in requests {
        writeln!(
            out,
            "{:<14} {:<32} {:<6} {:<8} {:<24} {}",
            sor.id,
            truncate(&sor.item_name, 32),
            sor.branch_id,
            sor.priority,
            sor.status,
            money(&opts.currency, sor.estimated_cost)
        )?;
    }
    Ok(())
}

fn write_board(
    out: &mut String,
    controller: &Controller,
    view: ViewId,
    opts: &RenderOptions,
) -> fmt::Result {
    let Some(kind) = board_for(view) else {
        return Ok(());
    };
    writeln!(out, "{}", view.title().to_ascii_uppercase())?;
    for column in views::board(kind, controller.api().storage().requests()) {
        writeln!(out, "\n[{}] ({})", column.title, column.requests.len())?;
        if column.requests.is_empty() {
            writeln!(out, "  queue clear")?;
        }
        for sor in column.requests {
            writeln!(
                out,
                "  {} {} x{} - {} [{}]",
                sor.id,
                sor.item_name,
                sor.quantity,
                money(&opts.currency, sor.estimated_cost),
                sor.status
            )?;
        }
    }
    Ok(())
}

fn write_detail(
    out: &mut String,
    controller: &Controller,
    sor: &Sor,
    opts: &RenderOptions,
) -> fmt::Result {
    writeln!(out, "{} [{}] priority {}", sor.id, sor.status, sor.priority)?;
    writeln!(out, "item:      {} x{}", sor.item_name, sor.quantity)?;
    writeln!(out, "requester: {} ({})", sor.requester_name, sor.branch_id)?;
    writeln!(out, "category:  {}", sor.category)?;
    writeln!(out, "cost:      {}", money(&opts.currency, sor.estimated_cost))?;
    writeln!(out, "needed by: {}", sor.required_date)?;
    writeln!(out, "purpose:   {}", sor.purpose)?;
    if let Some(vendor) = &sor.vendor {
        writeln!(out, "vendor:    {} ({})", vendor.name, vendor.id)?;
    }

    let path: Vec<String> = approval::approval_path(sor.estimated_cost)
        .into_iter()
        .map(|role| role.to_string())
        .collect();
    writeln!(out, "approval path: {}", path.join(" -> "))?;
    if approval::unenforced_approvals(sor.estimated_cost).contains(&UserRole::Ceo) {
        writeln!(
            out,
            "  note: cost band calls for CEO sign-off, which the workflow does not route"
        )?;
    }

    match transitions::responsible_role(sor.status) {
        Some(role) => writeln!(out, "next step: {role}")?,
        None if !sor.status.is_open() => writeln!(out, "next step: none, request closed")?,
        None => {}
    }

    writeln!(out, "\nactions:")?;
    let actions = controller.offered_actions();
    if actions.is_empty() {
        writeln!(out, "  (none for {})", controller.active_user().role)?;
    }
    for action in actions {
        writeln!(out, "  {:<22} {}", action.code(), action.label())?;
    }

    writeln!(out, "\nmessages:")?;
    if sor.messages.is_empty() {
        writeln!(out, "  (no messages)")?;
    }
    for message in &sor.messages {
        let line = format!(
            "{} [{}] {}",
            message.user_name, message.user_role, message.content
        );
        if message.user_id == controller.active_user().id {
            writeln!(out, "{line:>72}")?;
        } else {
            writeln!(out, "  {line}")?;
        }
    }

    writeln!(out, "\naudit log:")?;
    for entry in &sor.audit_log {
        write!(
            out,
            "  {} {} - {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action,
            entry.user
        )?;
        if let Some(comment) = &entry.comment {
            write!(out, " \"{comment}\"")?;
        }
        out.push('\n');
    }
    Ok(())
}

fn write_create_form(out: &mut String, controller: &Controller) -> fmt::Result {
    writeln!(out, "INITIATE REQUEST")?;
    writeln!(
        out,
        "submit with: create {{\"item_name\":..,\"quantity\":..,\"purpose\":..,\"estimated_cost\":..,\"required_date\":\"YYYY-MM-DD\",\"category\":..,\"priority\":\"Low|Medium|High\"}}"
    )?;
    writeln!(
        out,
        "categories: {}",
        controller.api().storage().categories().join(", ")
    )
}

fn write_users(out: &mut String, controller: &Controller) -> fmt::Result {
    writeln!(out, "STAFF")?;
    for user in controller.api().storage().users() {
        writeln!(
            out,
            "  {:<4} {:<20} {:<13} {:<7} {}",
            user.id, user.name, user.role, user.branch, user.email
        )?;
    }
    Ok(())
}

fn write_settings(out: &mut String, controller: &Controller, opts: &RenderOptions) -> fmt::Result {
    let storage = controller.api().storage();
    writeln!(out, "GLOBAL CONFIG")?;
    writeln!(out, "branches:")?;
    for branch in storage.branches() {
        writeln!(
            out,
            "  {:<3} {:<20} {:<10} budget {}",
            branch.id,
            branch.name,
            branch.location,
            money(&opts.currency, branch.budget)
        )?;
    }
    writeln!(out, "categories: {}", storage.categories().join(", "))
}

/// `QR 15,000` style amounts; cents are shown only when present.
pub fn money(currency: &str, amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = (cents % 100).abs();

    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if cents < 0 { "-" } else { "" };
    if frac == 0 {
        format!("{currency} {sign}{grouped}")
    } else {
        format!("{currency} {sign}{grouped}.{frac:02}")
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}~")
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
