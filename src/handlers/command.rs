use thiserror::Error;

use crate::view::spec::{RoleFilter, SortSpec, UnknownSortSpec};

/// One line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stage and commit a term; empty means everything
    Search(String),
    /// Stage a term without committing it
    Type(String),
    Refresh,
    Load,
    Sort(SortSpec),
    Role(RoleFilter),
    Clear,
    Show(u64),
    Email(String),
    Status,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands")]
    Unknown(String),

    #[error("Missing argument for '{0}'")]
    MissingArgument(&'static str),

    #[error("Invalid user id '{0}'")]
    InvalidId(String),

    #[error(transparent)]
    Sort(#[from] UnknownSortSpec),
}

pub const HELP: &str = "\
Commands:
  search <term>    search the server (empty term shows everyone)
  type <term>      stage a term without sending it
  refresh          repeat the last committed search
  load             import users on the server (only when none are loaded)
  sort <option>    none | age-asc | age-desc | name-asc | name-desc
  role <name|all>  show only one role
  clear            reset sort and role filter
  show <id>        fetch one user by id
  email <address>  fetch one user by email
  status           redraw the current view
  help             this text
  quit             exit";

/// Parse a line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "search" | "s" => Command::Search(rest.to_string()),
        "type" | "t" => Command::Type(rest.to_string()),
        "refresh" | "r" => Command::Refresh,
        "load" => Command::Load,
        "sort" => Command::Sort(required(rest, "sort")?.parse()?),
        "role" => Command::Role(RoleFilter::from(required(rest, "role")?)),
        "clear" => Command::Clear,
        "show" => {
            let id = required(rest, "show")?;
            Command::Show(id.parse().map_err(|_| CommandError::InvalidId(id.to_string()))?)
        }
        "email" => Command::Email(required(rest, "email")?.to_string()),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn required<'a>(arg: &'a str, command: &'static str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(arg)
    }
}
