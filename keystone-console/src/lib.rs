//! Command grammar for the Keystone console.
//!
//! A line is whitespace-split: the first word selects the command, the rest
//! are positional arguments. Attribute arguments keep their raw
//! `Field=value` form; splitting them is the engine's job, so values here
//! may themselves contain `=`.

use keystone_types::EntityId;
use thiserror::Error;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        entity: String,
        attrs: Vec<String>,
    },
    Show {
        entity: String,
        id: EntityId,
    },
    Update {
        entity: String,
        id: EntityId,
        attrs: Vec<String>,
    },
    Destroy {
        entity: String,
        id: EntityId,
    },
    All {
        entity: String,
    },
    Register {
        username: String,
        password: String,
        email: String,
    },
    Login {
        username: String,
        password: String,
    },
    Logout,
    Whoami,
    Passwd {
        old: String,
        new: String,
    },
    RequestReset {
        email: String,
    },
    Reset {
        token: String,
        password: String,
    },
    Verify {
        token: String,
    },
    Help,
    Quit,
}

/// A line that does not fit the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The first word is not a known command.
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),
    /// An id argument is not an integer.
    #[error("{0} is not a valid id")]
    InvalidId(String),
    /// Wrong number of arguments for a known command.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parses one console line. Blank lines parse to `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head {
        "create" => match rest.as_slice() {
            [entity, attrs @ ..] => Command::Create {
                entity: (*entity).to_string(),
                attrs: owned(attrs),
            },
            [] => return Err(ParseError::Usage("create <Type> [Field=value]...")),
        },
        "show" => match rest.as_slice() {
            [entity, id] => Command::Show {
                entity: (*entity).to_string(),
                id: parse_id(id)?,
            },
            _ => return Err(ParseError::Usage("show <Type> <id>")),
        },
        "update" => match rest.as_slice() {
            [entity, id, attrs @ ..] if !attrs.is_empty() => Command::Update {
                entity: (*entity).to_string(),
                id: parse_id(id)?,
                attrs: owned(attrs),
            },
            _ => return Err(ParseError::Usage("update <Type> <id> <Field=value>...")),
        },
        "destroy" => match rest.as_slice() {
            [entity, id] => Command::Destroy {
                entity: (*entity).to_string(),
                id: parse_id(id)?,
            },
            _ => return Err(ParseError::Usage("destroy <Type> <id>")),
        },
        "all" => match rest.as_slice() {
            [entity] => Command::All {
                entity: (*entity).to_string(),
            },
            _ => return Err(ParseError::Usage("all <Type>")),
        },
        "register" => match rest.as_slice() {
            [username, password, email] => Command::Register {
                username: (*username).to_string(),
                password: (*password).to_string(),
                email: (*email).to_string(),
            },
            _ => return Err(ParseError::Usage("register <username> <password> <email>")),
        },
        "login" => match rest.as_slice() {
            [username, password] => Command::Login {
                username: (*username).to_string(),
                password: (*password).to_string(),
            },
            _ => return Err(ParseError::Usage("login <username> <password>")),
        },
        "logout" => Command::Logout,
        "whoami" => Command::Whoami,
        "passwd" => match rest.as_slice() {
            [old, new] => Command::Passwd {
                old: (*old).to_string(),
                new: (*new).to_string(),
            },
            _ => return Err(ParseError::Usage("passwd <old-password> <new-password>")),
        },
        "request-reset" => match rest.as_slice() {
            [email] => Command::RequestReset {
                email: (*email).to_string(),
            },
            _ => return Err(ParseError::Usage("request-reset <email>")),
        },
        "reset" => match rest.as_slice() {
            [token, password] => Command::Reset {
                token: (*token).to_string(),
                password: (*password).to_string(),
            },
            _ => return Err(ParseError::Usage("reset <token> <new-password>")),
        },
        "verify" => match rest.as_slice() {
            [token] => Command::Verify {
                token: (*token).to_string(),
            },
            _ => return Err(ParseError::Usage("verify <token>")),
        },
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_id(raw: &str) -> Result<EntityId, ParseError> {
    raw.parse()
        .map_err(|_| ParseError::InvalidId(raw.to_string()))
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}
