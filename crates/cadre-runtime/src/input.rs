//! Piped-input handling: merging redirected stdin into operand inputs.
//!
//! When stdin is redirected, its lines are read, trimmed, blank lines dropped
//! (unless configured otherwise), and appended to the input values of the
//! sole list-arity operand of the resolved command — after any values it
//! already received from the command line. A command with no list operand
//! ignores piped input.

use std::io::{BufRead, IsTerminal};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use cadre_core::{InputSource, InputValue};
use cadre_framework::{CommandContext, Middleware, Next, PipelineResult, exit_code};

use crate::settings::PipedInputSettings;

/// Source of piped input; abstracted so tests can inject lines.
pub trait PipedInputSource: Send + Sync {
    /// `true` when input is redirected (not an interactive terminal).
    fn is_redirected(&self) -> bool;

    fn read_lines(&self) -> std::io::Result<Vec<String>>;
}

/// The process stdin.
pub struct StdinPipedInput;

impl PipedInputSource for StdinPipedInput {
    fn is_redirected(&self) -> bool {
        !std::io::stdin().is_terminal()
    }

    fn read_lines(&self) -> std::io::Result<Vec<String>> {
        std::io::stdin().lock().lines().collect()
    }
}

/// A fixed set of lines, for tests and embedding hosts.
pub struct StaticPipedInput {
    lines: Vec<String>,
}

impl StaticPipedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl PipedInputSource for StaticPipedInput {
    fn is_redirected(&self) -> bool {
        true
    }

    fn read_lines(&self) -> std::io::Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}

/// Post-parse middleware appending piped lines to the target command's list
/// operand.
pub struct PipedInputMiddleware {
    source: Arc<dyn PipedInputSource>,
    settings: PipedInputSettings,
}

impl PipedInputMiddleware {
    pub fn new(source: Arc<dyn PipedInputSource>, settings: PipedInputSettings) -> Self {
        Self { source, settings }
    }
}

#[async_trait]
impl Middleware for PipedInputMiddleware {
    fn name(&self) -> &str {
        "piped-input"
    }

    async fn handle(&self, ctx: Arc<CommandContext>, next: Next) -> PipelineResult {
        if ctx.is_cancellation_requested() {
            return Ok(exit_code::ERROR);
        }
        if !self.settings.enabled || !self.source.is_redirected() {
            return next.run(ctx).await;
        }
        let Some(target) = ctx.target_command() else {
            return next.run(ctx).await;
        };

        let lines = match self.source.read_lines() {
            Ok(lines) => lines,
            Err(error) => {
                warn!(%error, "failed to read piped input");
                return next.run(ctx).await;
            }
        };

        let keep_blank = self.settings.keep_blank_lines;
        let lines: Vec<String> = lines
            .iter()
            .map(|line| line.trim().to_string())
            .filter(|line| keep_blank || !line.is_empty())
            .collect();

        ctx.with_tree_mut(|tree| {
            let list_index = tree
                .get(target)
                .operands()
                .iter()
                .position(|o| o.get_arity().allows_many());
            match list_index {
                Some(index) => {
                    debug!(lines = lines.len(), "merging piped input");
                    for line in &lines {
                        tree.operand_mut(target, index)
                            .push_input(InputValue::new(line.clone(), InputSource::Piped));
                    }
                }
                None => {
                    debug!("target command has no list operand; piped input ignored");
                }
            }
        });

        next.run(ctx).await
    }
}
