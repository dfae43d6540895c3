//! Interactive session
//!
//! Reads commands from stdin and drives a coordinator over the loopback
//! tunnel, printing coordinator events and tunnel state changes as they
//! happen.

use anyhow::Result;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::{select_command, status_command, SelectTarget};
use crate::output::{
    format_connection, format_event, format_servers, format_toggle, print_error, print_info,
    print_success, print_warning,
};
use firenet_coordinator::{CoordinatorEvent, SelectionCoordinator};

const HELP: &str = "\
Commands:
  select <guid>     Select a server by guid
  pick <position>   Select the server at a list position
  toggle            Connect or disconnect
  reload            Reload the server list from the store
  status            Show selection and connection state
  logout            Disconnect and remove all servers from the store
  update on|off     Block or unblock connecting for a mandatory update
  help              Show this help
  quit              Leave the session";

/// A parsed session command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Select(String),
    Pick(usize),
    Toggle,
    Reload,
    Status,
    Logout,
    Update(bool),
    Help,
    Quit,
}

/// Why a session line could not be parsed
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}' (type 'help' for commands)")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },

    #[error("'{command}' takes no more arguments (got '{extra}')")]
    UnexpectedArgument {
        command: &'static str,
        extra: String,
    },
}

impl SessionCommand {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self, SessionParseError> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(SessionParseError::Empty)?;
        let args: Vec<&str> = words.collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "select" => {
                SessionCommand::Select(one_arg("select", "a server guid", &args)?.to_string())
            }
            "pick" => {
                let raw = one_arg("pick", "a list position", &args)?;
                let position = raw
                    .parse()
                    .map_err(|_| SessionParseError::InvalidArgument {
                        command: "pick",
                        value: raw.to_string(),
                    })?;
                SessionCommand::Pick(position)
            }
            "update" => match one_arg("update", "'on' or 'off'", &args)? {
                "on" => SessionCommand::Update(true),
                "off" => SessionCommand::Update(false),
                other => {
                    return Err(SessionParseError::InvalidArgument {
                        command: "update",
                        value: other.to_string(),
                    })
                }
            },
            "toggle" => no_args("toggle", SessionCommand::Toggle, &args)?,
            "reload" => no_args("reload", SessionCommand::Reload, &args)?,
            "status" => no_args("status", SessionCommand::Status, &args)?,
            "logout" => no_args("logout", SessionCommand::Logout, &args)?,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            _ => return Err(SessionParseError::Unknown(name.to_string())),
        };

        Ok(command)
    }
}

fn one_arg<'a>(
    command: &'static str,
    argument: &'static str,
    args: &[&'a str],
) -> Result<&'a str, SessionParseError> {
    match args {
        [] => Err(SessionParseError::MissingArgument { command, argument }),
        [value] => Ok(*value),
        [_, extra, ..] => Err(SessionParseError::UnexpectedArgument {
            command,
            extra: extra.to_string(),
        }),
    }
}

fn no_args(
    command: &'static str,
    parsed: SessionCommand,
    args: &[&str],
) -> Result<SessionCommand, SessionParseError> {
    match args.first() {
        None => Ok(parsed),
        Some(extra) => Err(SessionParseError::UnexpectedArgument {
            command,
            extra: extra.to_string(),
        }),
    }
}

/// Run the interactive session until `quit` or end of input
pub async fn run_session(coordinator: SelectionCoordinator) -> Result<()> {
    let shutdown = CancellationToken::new();
    let watcher = tokio::spawn(watch_coordinator(coordinator.clone(), shutdown.clone()));

    print_info("Interactive session. Type 'help' for commands.");
    print_info(&format!(
        "{} servers loaded, tunnel {}",
        coordinator.servers().await.len(),
        format_connection(coordinator.connection_state())
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match SessionCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                print_error(&e.to_string());
                continue;
            }
        };

        if command == SessionCommand::Quit {
            break;
        }

        if let Err(e) = execute(&coordinator, command).await {
            print_error(&format!("{:#}", e));
        }
    }

    shutdown.cancel();
    let _ = watcher.await;
    tracing::debug!("Session ended");

    Ok(())
}

async fn execute(coordinator: &SelectionCoordinator, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Select(guid) => {
            select_command(coordinator, SelectTarget::Guid(guid)).await?;
        }
        SessionCommand::Pick(position) => {
            select_command(coordinator, SelectTarget::Position(position)).await?;
        }
        SessionCommand::Toggle => {
            let result = coordinator.toggle_connection().await?;
            print_success(&format_toggle(&result));
        }
        SessionCommand::Reload => {
            let summary = coordinator.reload_servers().await?;
            let servers = coordinator.servers().await;
            println!("{}", format_servers(&servers, summary.selected.as_ref()));
            if summary.dangling_selection {
                print_warning("The selected server is no longer in the list");
            }
        }
        SessionCommand::Status => {
            status_command(coordinator, false).await?;
        }
        SessionCommand::Logout => {
            coordinator.force_logout().await?;
            print_success("Logged out, server list cleared");
        }
        SessionCommand::Update(required) => {
            coordinator.set_update_required(required);
            if required {
                print_warning("Connecting is blocked until the update is installed");
            } else {
                print_info("Connecting is allowed again");
            }
        }
        SessionCommand::Help => println!("{}", HELP),
        SessionCommand::Quit => {}
    }

    Ok(())
}

async fn watch_coordinator(coordinator: SelectionCoordinator, shutdown: CancellationToken) {
    let mut events = coordinator.subscribe_events();
    let mut connection = coordinator.subscribe_connection();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Ok(CoordinatorEvent::RestartFailed { token, reason }) => {
                    print_warning(&format!("restart {} failed: {}", token, reason));
                }
                Ok(event) => print_info(&format_event(&event)),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Missed {} coordinator events", missed);
                }
                Err(RecvError::Closed) => break,
            },
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *connection.borrow_and_update();
                print_info(&format!("tunnel {}", format_connection(state)));
            }
        }
    }
}
