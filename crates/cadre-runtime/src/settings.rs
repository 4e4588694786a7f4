//! Application settings.
//!
//! All configuration is explicit: an [`AppSettings`] value is handed to the
//! runner at construction. The struct derives `Deserialize` so embedding
//! hosts can load it from a config file, but nothing here reads files or
//! global state.

use serde::Deserialize;

use cadre_core::ParserSettings;

/// Top-level settings for an [`AppRunner`](crate::runner::AppRunner).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Settings consumed by the command parser.
    pub parser: ParserSettings,
    /// Recognize `[name]` directives at the head of the input.
    pub include_directives: bool,
    /// Redirected-stdin handling.
    pub piped_input: PipedInputSettings,
    /// Logging initialization.
    pub logging: LoggingSettings,
}

/// Settings for merging redirected stdin into the input values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipedInputSettings {
    pub enabled: bool,
    /// Keep blank lines instead of dropping them.
    pub keep_blank_lines: bool,
}

impl Default for PipedInputSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            keep_blank_lines: false,
        }
    }
}

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log line formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
}

/// Log destinations. Logs default to stderr so they never mix with command
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
}

/// Settings for [`logging`](crate::logging) initialization.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Extra `target=level` filter directives.
    pub filters: Vec<String>,
}
