use thiserror::Error;

/// A command that could not run. Rendered as the reply text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{value}' is not a valid {what}.")]
    InvalidNumber { what: &'static str, value: String },

    #[error("Unknown command '{0}'. Type /help for a list of commands.")]
    NotFound(String),

    #[error("You do not have permission to run '{0}'.")]
    PermissionDenied(String),

    #[error("This command cannot be used from console.")]
    PlayerOnly,

    #[error("{0}")]
    Failed(String),
}
