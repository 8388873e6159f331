//! Line command parser.
//!
//! Parses incoming text commands into structured `Command` variants that
//! the `frontline` main loop dispatches on.

/// A parsed controller command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a new game, optionally overriding the configured seed.
    NewGame { seed: Option<u64> },

    /// Print the full snapshot as JSON.
    State,

    /// Print the phase summary for the active faction.
    Summary,

    /// Submit a batch of orders for the current phase.
    Orders { payload: String },

    /// Submit an explicit pass for the current phase.
    Pass,

    /// Enter the next phase.
    Advance,

    /// Print the most recent journal entries.
    Journal { count: Option<usize> },

    /// Terminate the process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    match head {
        "state" => Some(Command::State),
        "summary" => Some(Command::Summary),
        "pass" => Some(Command::Pass),
        "advance" => Some(Command::Advance),
        "quit" => Some(Command::Quit),

        "newgame" => parse_newgame(rest),
        "orders" => parse_orders(rest),
        "journal" => parse_journal(rest),

        other => {
            tracing::warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `newgame [seed]`.
fn parse_newgame(rest: &str) -> Option<Command> {
    if rest.is_empty() {
        return Some(Command::NewGame { seed: None });
    }
    match rest.parse::<u64>() {
        Ok(seed) => Some(Command::NewGame { seed: Some(seed) }),
        Err(_) => {
            tracing::warn!(value = rest, "invalid newgame seed");
            None
        }
    }
}

/// Parses `orders <json>`. The payload is everything after the keyword.
fn parse_orders(rest: &str) -> Option<Command> {
    if rest.is_empty() {
        tracing::warn!("malformed orders: expected 'orders <json>'");
        return None;
    }
    Some(Command::Orders {
        payload: rest.to_string(),
    })
}

/// Parses `journal [count]`.
fn parse_journal(rest: &str) -> Option<Command> {
    if rest.is_empty() {
        return Some(Command::Journal { count: None });
    }
    match rest.parse::<usize>() {
        Ok(count) => Some(Command::Journal { count: Some(count) }),
        Err(_) => {
            tracing::warn!(value = rest, "invalid journal count");
            None
        }
    }
}
