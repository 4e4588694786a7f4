//! Tokenize stage: argv → token stream → transformations.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use cadre_core::{TokenTransformation, apply_transformations, tokenize};

use crate::context::CommandContext;
use crate::middleware::cancelled;
use crate::pipeline::{Middleware, Next, PipelineResult, exit_code};

/// Tokenizes the context's effective arguments and runs the transformation
/// chain (user transformations in order, then the system expansions).
pub struct TokenizeMiddleware {
    include_directives: bool,
    transformations: Vec<TokenTransformation>,
}

impl TokenizeMiddleware {
    pub fn new(include_directives: bool, transformations: Vec<TokenTransformation>) -> Self {
        Self {
            include_directives,
            transformations,
        }
    }
}

#[async_trait]
impl Middleware for TokenizeMiddleware {
    fn name(&self) -> &str {
        "tokenize"
    }

    async fn handle(&self, ctx: Arc<CommandContext>, next: Next) -> PipelineResult {
        if cancelled(&ctx, self.name()) {
            return Ok(exit_code::ERROR);
        }

        let args = ctx.effective_args();
        let tokens = apply_transformations(
            tokenize(&args, self.include_directives),
            &self.transformations,
        );
        trace!(tokens = tokens.len(), "input tokenized");
        ctx.set_tokens(tokens);
        next.run(ctx).await
    }
}
