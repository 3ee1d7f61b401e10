//! Module `commands`
//!
//! Defines the control-channel commands and the parser turning a received
//! line into one of them.

/// A command parsed from one control-channel line.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Get(String),
    List,
    Port(u16),
    Unrecognized(String),
}

/// Represents the outcome of executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Continue,
    CloseConnection,
}

/// Parses a raw command line received from a client into the `Command` enum.
///
/// Known commands with a missing or malformed argument are `Unrecognized`.
pub fn parse_command(raw: &str) -> Command {
    match raw {
        "\\q" | "\\quit" => return Command::Quit,
        "list" => return Command::List,
        _ => {}
    }

    if raw.starts_with("get ") {
        if let Some(filename) = raw.split_whitespace().nth(1) {
            return Command::Get(filename.to_string());
        }
    } else if raw.starts_with("port ") {
        let port = raw.split_whitespace().nth(1).and_then(|p| p.parse::<u16>().ok());
        if let Some(port) = port.filter(|p| *p != 0) {
            return Command::Port(port);
        }
    }

    Command::Unrecognized(raw.to_string())
}

/// Splits one control-socket read into the command lines it carries.
///
/// A trailing `\r` is dropped from each line and blank lines are skipped.
pub fn split_commands(received: &str) -> impl Iterator<Item = &str> {
    received
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}
