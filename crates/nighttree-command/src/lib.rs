//! Command line parsing, results, and the permission registry.

pub mod error;
pub mod registry;

use std::fmt;
use std::str::FromStr;

pub use error::CommandError;
pub use registry::{builtin, BuiltinCommand, CommandRegistry, BUILTIN_COMMANDS};

/// Id used for commands typed at the server console.
pub const CONSOLE_ID: &str = "CONSOLE";

/// Who issued a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issuer {
    Console,
    Player(String),
}

impl Issuer {
    /// The issuer's id, `CONSOLE` for the console.
    pub fn id(&self) -> &str {
        match self {
            Self::Console => CONSOLE_ID,
            Self::Player(id) => id,
        }
    }

    /// The player id, or [`CommandError::PlayerOnly`] for the console.
    pub fn player(&self) -> Result<&str, CommandError> {
        match self {
            Self::Console => Err(CommandError::PlayerOnly),
            Self::Player(id) => Ok(id),
        }
    }
}

impl fmt::Display for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A tokenized command line: `/name arg1 arg2 ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split on whitespace and strip the leading `/` from the name.
    ///
    /// Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let first = parts.next()?;
        let name = first.strip_prefix('/').unwrap_or(first);
        Some(Self {
            name: name.to_string(),
            args: parts.map(String::from).collect(),
        })
    }

    /// Argument `index`, or a usage error.
    pub fn arg(&self, index: usize, usage: &'static str) -> Result<&str, CommandError> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or(CommandError::Usage(usage))
    }

    /// Argument `index` parsed as a number.
    pub fn number<T: FromStr>(
        &self,
        index: usize,
        what: &'static str,
        usage: &'static str,
    ) -> Result<T, CommandError> {
        let raw = self.arg(index, usage)?;
        raw.parse().map_err(|_| CommandError::InvalidNumber {
            what,
            value: raw.to_string(),
        })
    }
}

/// Outcome of a command, sent back to the issuer as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub messages: Vec<String>,
    /// The server should save and shut down.
    pub should_stop: bool,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
            should_stop: false,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
            should_stop: false,
        }
    }

    pub fn stop(message: impl Into<String>) -> Self {
        Self {
            should_stop: true,
            ..Self::ok(message)
        }
    }

    /// All messages joined into one reply.
    pub fn text(&self) -> String {
        self.messages.join("\n")
    }
}

impl From<CommandError> for CommandResult {
    fn from(err: CommandError) -> Self {
        Self::err(err.to_string())
    }
}

impl From<Result<CommandResult, CommandError>> for CommandResult {
    fn from(res: Result<CommandResult, CommandError>) -> Self {
        res.unwrap_or_else(Self::from)
    }
}
