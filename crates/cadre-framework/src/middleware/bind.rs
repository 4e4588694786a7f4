//! BindValues stage: raw string inputs → typed values.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::binder::{BindFailure, TypeParserRegistry, bind_command};
use crate::context::CommandContext;
use crate::middleware::cancelled;
use crate::pipeline::{Middleware, Next, PipelineError, PipelineResult, exit_code};

/// Binds every argument on the target command's path using the registered
/// type parsers.
pub struct BindValuesMiddleware {
    registry: Arc<TypeParserRegistry>,
}

impl BindValuesMiddleware {
    pub fn new(registry: Arc<TypeParserRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Middleware for BindValuesMiddleware {
    fn name(&self) -> &str {
        "bind-values"
    }

    async fn handle(&self, ctx: Arc<CommandContext>, next: Next) -> PipelineResult {
        if cancelled(&ctx, self.name()) {
            return Ok(exit_code::ERROR);
        }

        let Some(target) = ctx.target_command() else {
            return next.run(ctx).await;
        };

        match ctx.with_tree_mut(|tree| bind_command(tree, target, &self.registry)) {
            Ok(()) => next.run(ctx).await,
            Err(BindFailure::Invalid(error)) => {
                // User-facing: never thrown through the pipeline.
                debug!(%error, "value binding failed");
                ctx.console().write_error_line(error.to_string());
                Ok(exit_code::VALIDATION)
            }
            Err(BindFailure::Config(error)) => Err(PipelineError::Config(error)),
        }
    }
}
