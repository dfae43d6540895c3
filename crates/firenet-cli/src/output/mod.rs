//! Output formatting utilities for the CLI
//!
//! Tables for the server list, the status block, one-line renderings of
//! selection results and coordinator events, and coloured status messages.

use tabled::{
    settings::{Style, Width},
    Table, Tabled,
};

use firenet_core::{ConnectionState, ServerGuid, ServerList};
use firenet_coordinator::{CoordinatorEvent, CoordinatorStatus, SelectionResult, ToggleResult};

/// Format the server list as a table, marking the selected server
///
/// Returns "No servers configured" for an empty list.
pub fn format_servers(servers: &ServerList, selected: Option<&ServerGuid>) -> String {
    if servers.is_empty() {
        return "No servers configured".to_string();
    }

    #[derive(Tabled)]
    struct ServerRow {
        #[tabled(rename = "")]
        marker: &'static str,
        #[tabled(rename = "POS")]
        position: usize,
        #[tabled(rename = "GUID")]
        guid: String,
        #[tabled(rename = "NAME")]
        name: String,
    }

    let rows: Vec<ServerRow> = servers
        .iter()
        .map(|s| ServerRow {
            marker: if Some(&s.guid) == selected { "●" } else { "" },
            position: s.position,
            guid: truncate(s.guid.as_str(), 36),
            name: s.name.clone(),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Width::wrap(100))
        .to_string()
}

/// Format the coordinator status as a human-readable block
pub fn format_status(status: &CoordinatorStatus) -> String {
    let mut output = String::new();

    let selected = match (&status.selected, status.selected_position) {
        (None, _) => "none".to_string(),
        (Some(guid), Some(position)) => format!("{} (position {})", guid, position),
        (Some(guid), None) => format!("{} (not in server list)", guid),
    };

    output.push_str(&format!("Selected server: {}\n", selected));
    output.push_str(&format!(
        "Connection: {}\n",
        format_connection(status.connection)
    ));
    output.push_str(&format!("Servers: {}\n", status.server_count));
    output.push_str(&format!(
        "Pending restart: {}\n",
        status
            .pending_restart
            .map(|t| t.to_string())
            .unwrap_or_else(|| "none".to_string())
    ));

    if status.update_required {
        output.push_str("Update required: connecting is blocked\n");
    }

    output
}

/// Human-readable connection state
pub fn format_connection(state: ConnectionState) -> String {
    match state {
        ConnectionState::Disconnected => "Disconnected".to_string(),
        ConnectionState::Transitioning => "Transitioning...".to_string(),
        ConnectionState::Connected => "Connected".to_string(),
    }
}

/// One-line summary of a selection request
pub fn format_selection(result: &SelectionResult) -> String {
    match result {
        SelectionResult::Unchanged { server } => format!("{} is already selected", server),
        SelectionResult::Changed(change) => {
            let mut line = match &change.previous {
                Some(previous) => format!("Selected {} (was {})", change.current, previous),
                None => format!("Selected {}", change.current),
            };
            if let Some(token) = change.restart {
                line.push_str(&format!(", restart {} scheduled", token));
            }
            line
        }
    }
}

/// One-line summary of a toggle request
pub fn format_toggle(result: &ToggleResult) -> String {
    match result {
        ToggleResult::Starting { server } => format!("Connecting to {}", server),
        ToggleResult::Stopping => "Disconnecting".to_string(),
    }
}

/// One-line rendering of a coordinator event
pub fn format_event(event: &CoordinatorEvent) -> String {
    match event {
        CoordinatorEvent::SelectionChanged { previous, current } => match previous {
            Some(previous) => format!("selection changed: {} -> {}", previous, current),
            None => format!("selection changed: {}", current),
        },
        CoordinatorEvent::RestartScheduled { token, server } => {
            format!("restart {} scheduled for {}", token, server)
        }
        CoordinatorEvent::RestartSuperseded { token } => format!("restart {} superseded", token),
        CoordinatorEvent::RestartCompleted { token, server } => {
            format!("restart {} started {}", token, server)
        }
        CoordinatorEvent::RestartFailed { token, reason } => {
            format!("restart {} failed: {}", token, reason)
        }
        CoordinatorEvent::ServersReloaded {
            count,
            dangling_selection,
        } => {
            if *dangling_selection {
                format!("reloaded {} servers (selected server is gone)", count)
            } else {
                format!("reloaded {} servers", count)
            }
        }
        CoordinatorEvent::LoggedOut => "logged out".to_string(),
    }
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red to stderr
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
