//! # Cadre Runtime
//!
//! Runtime orchestration for the cadre CLI framework.
//!
//! This crate assembles the parsing core (`cadre-core`) and the execution
//! pipeline (`cadre-framework`) into a runnable application:
//!
//! - **[`AppRunner`]** — builds the middleware pipeline once per run and
//!   drives a `CommandContext` through it, mapping outcomes to exit codes
//! - **[`AppSettings`]** — explicit, serde-deserializable configuration
//!   (parser behavior, piped input, logging); no global mutable state
//! - **[`logging`]** — `tracing-subscriber` initialization from settings
//! - **Input supplements** — `@file` response-file expansion, redirected
//!   stdin merged into list operands, and env-var/app-setting default-value
//!   sources
//! - **Diagnostics** — the `[parse]` directive for inspecting the token
//!   stream
//!
//! ## Exit codes
//!
//! `0` success, `1` unhandled/generic failure, `2` validation or parse
//! error. Handlers return their own codes; errors they return propagate out
//! of [`AppRunner::run`] unswallowed.

pub mod defaults;
pub mod directives;
pub mod input;
pub mod logging;
pub mod response_files;
pub mod runner;
pub mod settings;

pub use defaults::{
    AppSettingDefaults, DefaultValueSource, DefaultValueSourcesMiddleware, EnvVarDefaults,
};
pub use directives::ParseDirectiveMiddleware;
pub use input::{PipedInputMiddleware, PipedInputSource, StaticPipedInput, StdinPipedInput};
pub use response_files::{ResponseFileError, ResponseFilesMiddleware, expand_response_files};
pub use runner::{AppRunner, RunError};
pub use settings::{AppSettings, LogFormat, LogLevel, LogOutput, LoggingSettings, PipedInputSettings};
