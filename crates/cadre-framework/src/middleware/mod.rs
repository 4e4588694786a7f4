//! Built-in middleware for the fixed pipeline stages.
//!
//! The runtime registers these into an [`InvocationPipeline`] in stage order:
//!
//! - [`TokenizeMiddleware`] — argv → tokens → transformations
//! - [`ParseMiddleware`] — tokens → `ParseResult`, short-circuiting with the
//!   validation exit code on user-input errors
//! - [`BindValuesMiddleware`] — raw inputs → typed values
//! - [`InvokeMiddleware`] — looks up and invokes the target command's handler
//!
//! Every built-in checks the context's cancellation token at entry and aborts
//! the chain cooperatively when a cancellation was requested.
//!
//! [`InvocationPipeline`]: crate::pipeline::InvocationPipeline

mod bind;
mod invoke;
mod parse;
mod tokenize;

pub use bind::BindValuesMiddleware;
pub use invoke::InvokeMiddleware;
pub use parse::ParseMiddleware;
pub use tokenize::TokenizeMiddleware;

use tracing::debug;

use crate::context::CommandContext;

/// `true` when the run was cancelled; the caller returns the generic failure
/// code without calling `next`.
pub(crate) fn cancelled(ctx: &CommandContext, middleware: &str) -> bool {
    if ctx.is_cancellation_requested() {
        debug!(middleware, "cancellation requested; aborting pipeline");
        true
    } else {
        false
    }
}
