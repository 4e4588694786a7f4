//! Diagnostic directives.
//!
//! A `[parse]` directive at the head of the input prints the token stream —
//! including transformation provenance — and exits successfully without
//! parsing or invoking anything. Useful for debugging how an input is
//! tokenized and transformed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use cadre_core::{Token, TokenKind};
use cadre_framework::{CommandContext, Middleware, Next, PipelineResult, exit_code};

/// Renders the token report when the `[parse]` directive is present.
///
/// Registered in the tokenize stage, after the tokenizer has run.
pub struct ParseDirectiveMiddleware;

impl ParseDirectiveMiddleware {
    pub const DIRECTIVE: &'static str = "parse";
}

fn kind_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Directive => "directive",
        TokenKind::Option => "option",
        TokenKind::Value => "value",
        TokenKind::Separator => "separator",
    }
}

fn describe(token: &Token) -> String {
    match token.source() {
        Some(source) => format!(
            "  {:<10} {}  (from '{}')",
            kind_name(token.kind()),
            token.raw_value(),
            source.raw_value()
        ),
        None => format!("  {:<10} {}", kind_name(token.kind()), token.raw_value()),
    }
}

#[async_trait]
impl Middleware for ParseDirectiveMiddleware {
    fn name(&self) -> &str {
        "parse-directive"
    }

    async fn handle(&self, ctx: Arc<CommandContext>, next: Next) -> PipelineResult {
        let Some(tokens) = ctx.tokens() else {
            return next.run(ctx).await;
        };
        if !tokens.has_directive(Self::DIRECTIVE) {
            return next.run(ctx).await;
        }

        debug!("parse directive active; reporting tokens without invoking");
        let console = ctx.console();
        console.write_line("token stream:");
        for token in tokens.directives() {
            console.write_line(describe(token));
        }
        for token in tokens.arguments() {
            console.write_line(describe(token));
        }
        if let Some(separator) = tokens.separator() {
            console.write_line(describe(separator));
            for token in tokens.separated() {
                console.write_line(describe(token));
            }
        }
        Ok(exit_code::SUCCESS)
    }
}
