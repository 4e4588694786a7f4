//! Error types for the cadre core.
//!
//! Two disjoint families:
//!
//! - [`ConfigError`] — programming mistakes by the CLI author (duplicate
//!   aliases, malformed definitions). Raised while building the command tree
//!   or assembling the pipeline; meant to fail fast and loudly, never shown
//!   to end users as input errors.
//! - [`ParseError`] — malformed command lines typed by end users. Always
//!   recovered into data (`ParseResult`), never propagated as a panic or an
//!   error through the pipeline; downstream middleware renders them and exits
//!   with a validation status.

use thiserror::Error;

use crate::command::CommandId;
use crate::token::Token;

/// Errors raised while building the command tree or wiring the app.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// An alias was registered twice within the same command.
    #[error("duplicate alias '{alias}' on command '{command}'")]
    DuplicateAlias { command: String, alias: String },

    /// An operand was added after a list operand.
    #[error("operand '{operand}' cannot follow list operand '{list_operand}' on command '{command}'")]
    OperandAfterListOperand {
        command: String,
        operand: String,
        list_operand: String,
    },

    /// An option was registered without a long or short name.
    #[error("an option on command '{command}' must define a long or short name")]
    UnnamedOption { command: String },

    /// An option was marked both interceptor-scoped and assigned to
    /// executable subcommands.
    #[error(
        "option '{option}' on command '{command}' cannot be both an interceptor option \
         and assigned to executable subcommands"
    )]
    ConflictingOptionScope { command: String, option: String },

    /// No value parser is registered for an argument's type.
    #[error("no value parser registered for type '{type_name}'")]
    MissingTypeParser { type_name: String },

    /// An executable command has no registered handler.
    #[error("command '{command}' has no registered handler")]
    MissingHandler { command: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// User-input parse errors: the closed variant set produced by the command
/// parser.
///
/// Every variant carries the deepest resolved [`CommandId`] at the point of
/// failure and the offending [`Token`], so downstream rendering can target
/// the right node. Parsing is fail-fast: the first error stops token
/// consumption.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    /// A non-flag option reached the end of input (or a non-value token)
    /// without receiving its value.
    #[error("missing value for option '{option}'")]
    MissingOptionValue {
        command: CommandId,
        option: String,
        token: Token,
    },

    /// A value was assigned to a flag.
    #[error("option '{option}' is a flag and does not take a value ('{value}')")]
    UnexpectedOptionValue {
        command: CommandId,
        option: String,
        value: String,
        token: Token,
    },

    /// A token could not be bound to any subcommand, option, or operand.
    #[error("unrecognized argument '{}'{}", .token.raw_value(), suggestion_suffix(.suggestion))]
    UnrecognizedArgument {
        command: CommandId,
        token: Token,
        suggestion: Option<String>,
    },

    /// An option-prefixed token matched no known option.
    #[error("unrecognized option '{}'", .token.raw_value())]
    UnrecognizedOption { command: CommandId, token: Token },

    /// A value fell outside an argument's allowed values.
    #[error("'{}' is not an allowed value for '{}' (allowed: {})", .token.value(), .argument, .allowed.join(", "))]
    NotAllowedValue {
        command: CommandId,
        argument: String,
        token: Token,
        allowed: Vec<String>,
    },

    /// A non-flag option appeared in a clubbed-flag token in a non-final
    /// position.
    #[error("option '{option}' must be a flag to be clubbed with other options")]
    ExpectedFlag {
        command: CommandId,
        option: String,
        token: Token,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(text) => format!("; {text}"),
        None => String::new(),
    }
}

impl ParseError {
    /// The deepest command resolved before the failure.
    pub fn command(&self) -> CommandId {
        match self {
            ParseError::MissingOptionValue { command, .. }
            | ParseError::UnexpectedOptionValue { command, .. }
            | ParseError::UnrecognizedArgument { command, .. }
            | ParseError::UnrecognizedOption { command, .. }
            | ParseError::NotAllowedValue { command, .. }
            | ParseError::ExpectedFlag { command, .. } => *command,
        }
    }

    /// The offending token.
    pub fn token(&self) -> &Token {
        match self {
            ParseError::MissingOptionValue { token, .. }
            | ParseError::UnexpectedOptionValue { token, .. }
            | ParseError::UnrecognizedArgument { token, .. }
            | ParseError::UnrecognizedOption { token, .. }
            | ParseError::NotAllowedValue { token, .. }
            | ParseError::ExpectedFlag { token, .. } => token,
        }
    }
}
