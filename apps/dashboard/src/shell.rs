//! Line-oriented driver: each input line becomes a controller command, the
//! resulting event is echoed and the active view re-rendered.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use shared::{
    domain::{SorDraft, SorId, UserId, VendorId, VendorRef, WorkflowAction},
    protocol::{ControllerCommand, ControllerEvent, ViewId},
};

use crate::{
    controller::Controller,
    render::{render_screen, RenderOptions},
};

pub const HELP: &str = "\
commands:
  select <SOR-ID>           open a request
  back                      close the open request
  new                       open the create form
  create <json draft>       submit a new request
  act <action> [comment]    apply a workflow action to the open request
  msg <text>                post a message on the open request
  vendor <id> <name>        assign a vendor (procurement)
  role <ROLE>               act as the first user holding ROLE
  user <USER-ID>            act as a specific user
  view <view>               switch view
  show                      re-render
  export                    dump session state as JSON
  help                      this text
  quit                      leave";

#[derive(Debug, Clone)]
pub enum ShellLine {
    Command(ControllerCommand),
    Show,
    Export,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Option<ShellLine>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let parsed = match verb.to_ascii_lowercase().as_str() {
        "select" => ShellLine::Command(ControllerCommand::SelectRequest {
            sor_id: SorId::from(required(rest, "request id")?),
        }),
        "back" => ShellLine::Command(ControllerCommand::ClearSelection),
        "new" => ShellLine::Command(ControllerCommand::OpenCreateForm),
        "create" => {
            let draft: SorDraft = serde_json::from_str(required(rest, "draft json")?)
                .map_err(|err| format!("invalid draft json: {err}"))?;
            ShellLine::Command(ControllerCommand::CreateRequest { draft })
        }
        "act" => {
            let rest = required(rest, "action")?;
            let (action, comment) = match rest.split_once(char::is_whitespace) {
                Some((action, comment)) => (action, Some(comment.trim().to_string())),
                None => (rest, None),
            };
            ShellLine::Command(ControllerCommand::ApplyAction {
                action: action.parse::<WorkflowAction>()?,
                comment,
            })
        }
        "msg" => ShellLine::Command(ControllerCommand::PostMessage {
            content: rest.to_string(),
        }),
        "vendor" => {
            let (id, name) = required(rest, "vendor id")?
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: vendor <id> <name>".to_string())?;
            ShellLine::Command(ControllerCommand::AssignVendor {
                vendor: VendorRef {
                    id: VendorId::from(id),
                    name: name.trim().to_string(),
                },
            })
        }
        "role" => ShellLine::Command(ControllerCommand::SwitchRole {
            role: required(rest, "role")?.parse()?,
        }),
        "user" => ShellLine::Command(ControllerCommand::SwitchUser {
            user_id: UserId::from(required(rest, "user id")?),
        }),
        "view" => ShellLine::Command(ControllerCommand::SwitchView {
            view: required(rest, "view")?.parse::<ViewId>()?,
        }),
        "show" => ShellLine::Show,
        "export" => ShellLine::Export,
        "help" | "?" => ShellLine::Help,
        "quit" | "exit" => ShellLine::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(parsed))
}

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("missing {what}"))
    } else {
        Ok(value)
    }
}

pub fn describe_event(event: &ControllerEvent) -> String {
    match event {
        ControllerEvent::RequestSelected { sor_id } => format!("opened {sor_id}"),
        ControllerEvent::SelectionCleared => "selection cleared".to_string(),
        ControllerEvent::CreateFormOpened => "create form opened".to_string(),
        ControllerEvent::RequestCreated { sor_id } => format!("created {sor_id}"),
        ControllerEvent::StatusChanged {
            sor_id,
            from,
            to,
            actor,
        } => format!("{sor_id}: {from} -> {to} by {actor}"),
        ControllerEvent::MessagePosted { sor_id, .. } => format!("message posted on {sor_id}"),
        ControllerEvent::VendorAssigned { sor_id, vendor } => {
            format!("{sor_id}: vendor {} assigned", vendor.name)
        }
        ControllerEvent::ActiveUserChanged { user_id, role } => {
            format!("now acting as {user_id} ({role})")
        }
        ControllerEvent::ViewChanged { view } => format!("view: {}", view.title()),
        ControllerEvent::Error(err) => format!("error: {err}"),
    }
}

pub fn run(
    controller: &mut Controller,
    opts: &RenderOptions,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    write!(out, "{}", render_screen(controller, opts))?;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let parsed = match parse_line(&line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };

        match parsed {
            ShellLine::Command(command) => {
                let event = controller.handle(command);
                writeln!(out, "> {}", describe_event(&event))?;
                if !matches!(event, ControllerEvent::Error(_)) {
                    write!(out, "\n{}", render_screen(controller, opts))?;
                }
            }
            ShellLine::Show => write!(out, "{}", render_screen(controller, opts))?,
            ShellLine::Export => {
                let json = serde_json::to_string_pretty(&controller.snapshot())
                    .context("failed to serialize session")?;
                writeln!(out, "{json}")?;
            }
            ShellLine::Help => writeln!(out, "{HELP}")?,
            ShellLine::Quit => break,
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
