//! Invoke stage: dispatch to the target command's handler.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use cadre_core::ConfigError;

use crate::context::CommandContext;
use crate::handler::HandlerRegistry;
use crate::middleware::cancelled;
use crate::pipeline::{Middleware, Next, PipelineError, PipelineResult, exit_code};

/// Invokes the handler registered for the target command. Terminal: does not
/// call `next`.
///
/// A non-executable target is a user error (a subcommand was required); an
/// executable target without a handler is a configuration error. Handler
/// errors propagate out of the pipeline as-is.
pub struct InvokeMiddleware {
    handlers: Arc<HandlerRegistry>,
}

impl InvokeMiddleware {
    pub fn new(handlers: Arc<HandlerRegistry>) -> Self {
        Self { handlers }
    }
}

#[async_trait]
impl Middleware for InvokeMiddleware {
    fn name(&self) -> &str {
        "invoke"
    }

    async fn handle(&self, ctx: Arc<CommandContext>, _next: Next) -> PipelineResult {
        if cancelled(&ctx, self.name()) {
            return Ok(exit_code::ERROR);
        }

        let Some(target) = ctx.target_command() else {
            warn!("invoke reached without a parse result");
            return Ok(exit_code::ERROR);
        };

        let (is_executable, path) =
            ctx.with_tree(|tree| (tree.get(target).is_executable(), tree.full_path(target)));

        if !is_executable {
            ctx.console()
                .write_error_line(format!("'{path}' requires a subcommand"));
            return Ok(exit_code::VALIDATION);
        }

        let Some(handler) = self.handlers.get(target).cloned() else {
            return Err(PipelineError::Config(ConfigError::MissingHandler {
                command: path,
            }));
        };

        debug!(command = %path, "invoking command");
        match handler.invoke(ctx).await {
            Ok(code) => Ok(code),
            Err(error) => Err(PipelineError::Handler(error)),
        }
    }
}
