//! # Cadre Framework
//!
//! The execution half of the cadre CLI framework: everything that happens
//! after (and around) the pure parsing core in `cadre-core`.
//!
//! - **Command context**: the run-scoped record shared across the pipeline
//!   ([`CommandContext`]), with console and cancellation access
//! - **Middleware pipeline**: stage-ordered async interceptors composed into
//!   a single continuation chain ([`InvocationPipeline`], [`Middleware`],
//!   [`Next`])
//! - **Value binder**: typed conversion of raw inputs via a pluggable
//!   [`TypeParserRegistry`]
//! - **Handlers**: the async command bodies ([`CommandHandler`]) and the
//!   built-in middleware that dispatches to them
//!
//! ## Control Flow
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌────────────┐   ┌────────┐
//! │ Tokenize │──▶│ ParseInput│──▶│ BindValues │──▶│ Invoke │
//! └──────────┘   └───────────┘   └────────────┘   └────────┘
//!       ▲ each link: (ctx, next) → exit code; short-circuit by
//!         not calling next; post-processing after next resolves
//! ```
//!
//! One `Arc<CommandContext>` flows through one chain per run; the chain is
//! async end-to-end but strictly sequenced, so there is exactly one active
//! mutator of the context at any time.

pub mod binder;
pub mod console;
pub mod context;
pub mod handler;
pub mod middleware;
pub mod pipeline;

pub use binder::{BindError, BindFailure, TypeParser, TypeParserRegistry, bind_command};
pub use console::{Console, ConsoleCapture};
pub use context::CommandContext;
pub use handler::{CommandHandler, HandlerRegistry, HandlerResult, handler_fn};
pub use middleware::{
    BindValuesMiddleware, InvokeMiddleware, ParseMiddleware, TokenizeMiddleware,
};
pub use pipeline::{
    AssembledPipeline, BoxError, InvocationPipeline, Middleware, MiddlewareStage, Next,
    PipelineError, PipelineResult, exit_code, middleware_fn,
};
