//! ParseInput stage: token stream → `ParseResult`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use cadre_core::CommandParser;

use crate::context::CommandContext;
use crate::middleware::cancelled;
use crate::pipeline::{Middleware, Next, PipelineResult, exit_code};

/// Runs the command parser against the context's tokens.
///
/// Parse errors are data, not exceptions: the error is rendered on the error
/// console and the chain short-circuits with the validation exit code,
/// leaving the `ParseResult` (with its target command) on the context for
/// anything upstream of this middleware that runs post-`next` logic.
pub struct ParseMiddleware;

#[async_trait]
impl Middleware for ParseMiddleware {
    fn name(&self) -> &str {
        "parse-input"
    }

    async fn handle(&self, ctx: Arc<CommandContext>, next: Next) -> PipelineResult {
        if cancelled(&ctx, self.name()) {
            return Ok(exit_code::ERROR);
        }

        let tokens = ctx.tokens().unwrap_or_default();
        let result =
            ctx.with_tree_mut(|tree| CommandParser::parse(tree, ctx.parser_settings(), &tokens));
        let error = result.error().cloned();
        ctx.set_parse_result(result);

        if let Some(error) = error {
            debug!(%error, "input could not be parsed");
            ctx.console().write_error_line(error.to_string());
            return Ok(exit_code::VALIDATION);
        }
        next.run(ctx).await
    }
}
