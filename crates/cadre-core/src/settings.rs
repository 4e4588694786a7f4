//! Parser-level settings.
//!
//! These are passed explicitly into the parser (and embedded in the runtime's
//! `AppSettings`); there is no global mutable configuration.

use serde::{Deserialize, Serialize};

/// How tokens after the `--` separator are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentSeparatorStrategy {
    /// `--` only ends option parsing: separated tokens are additionally
    /// replayed as plain operand values for the target command.
    #[default]
    EndOfOptions,
    /// Separated tokens are left untouched in the separated partition for the
    /// command to consume verbatim.
    PassThru,
}

/// Settings consumed by the command parser.
///
/// Commands may override `ignore_unexpected_operands` and the separator
/// strategy per node; these are the app-wide defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// When a token cannot be bound to any operand, collect it (and all
    /// further tokens) into `remaining_operands` instead of failing.
    pub ignore_unexpected_operands: bool,
    /// Default strategy for tokens after the `--` separator.
    pub default_separator_strategy: ArgumentSeparatorStrategy,
    /// Additionally recognize `/name` and `/name:value` option tokens.
    pub allow_slash_options: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            ignore_unexpected_operands: false,
            default_separator_strategy: ArgumentSeparatorStrategy::default(),
            allow_slash_options: false,
        }
    }
}
