//! Turning a line of input into a request for the table.

use thiserror::Error;

use crate::row::Row;

// Non-SQL statements like .exit are called “meta-commands”.
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Unrecognized(String),
}

impl MetaCommand {
    /// `None` if `input` is not a meta-command at all.
    pub fn parse(input: &str) -> Option<MetaCommand> {
        match input {
            ".exit" => Some(MetaCommand::Exit),
            _ if input.starts_with('.') => Some(MetaCommand::Unrecognized(input.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    SelectAll,
}

/// Why a line could not become a [`Statement`].
///
/// The messages are what the REPL shows the user.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    Syntax,

    #[error("String is too long.")]
    StringTooLong,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("Unrecognized command: {0}")]
    Unrecognized(String),
}

impl Statement {
    /// Parse `insert <id> <username> <email>` or `select`.
    ///
    /// A negative id is reported before oversized strings. Id 0 is valid.
    pub fn prepare(input: &str) -> Result<Statement, PrepareError> {
        let mut tokens = input.split_whitespace();
        match tokens.next() {
            Some("insert") => {
                let args: Vec<&str> = tokens.collect();
                let &[id, username, email] = args.as_slice() else {
                    return Err(PrepareError::Syntax);
                };
                let id = parse_id(id)?;
                // only oversized fields are rejected by Row::new
                let row =
                    Row::new(id, username, email).map_err(|_| PrepareError::StringTooLong)?;
                Ok(Statement::Insert(row))
            }
            Some("select") if tokens.next().is_none() => Ok(Statement::SelectAll),
            Some("select") => Err(PrepareError::Syntax),
            _ => Err(PrepareError::Unrecognized(input.to_string())),
        }
    }
}

// Any `-` followed by digits is negative, however large.
fn parse_id(token: &str) -> Result<u32, PrepareError> {
    if let Some(digits) = token.strip_prefix('-') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PrepareError::NegativeId);
        }
        return Err(PrepareError::Syntax);
    }
    token.parse().map_err(|_| PrepareError::Syntax)
}
