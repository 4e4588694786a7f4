//! Command handlers: the async functions a resolved command invokes.
//!
//! Handlers return `Result<i32, BoxError>`: `Ok(code)` becomes the process
//! exit code (return [`exit_code::SUCCESS`](crate::pipeline::exit_code) for
//! plain success), and errors propagate out of `run` unswallowed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use cadre_core::CommandId;

use crate::context::CommandContext;
use crate::pipeline::BoxError;

/// Result of one command invocation.
pub type HandlerResult = Result<i32, BoxError>;

/// An invokable command body.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn invoke(&self, ctx: Arc<CommandContext>) -> HandlerResult;
}

struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(Arc<CommandContext>) -> BoxFuture<'static, HandlerResult> + Send + Sync,
{
    async fn invoke(&self, ctx: Arc<CommandContext>) -> HandlerResult {
        (self.f)(ctx).await
    }
}

/// Wraps a closure as a [`CommandHandler`].
///
/// ```rust,ignore
/// let handler = handler_fn(|ctx| Box::pin(async move {
///     ctx.console().write_line("hello");
///     Ok(0)
/// }));
/// ```
pub fn handler_fn<F>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(Arc<CommandContext>) -> BoxFuture<'static, HandlerResult> + Send + Sync + 'static,
{
    Arc::new(FnHandler { f })
}

/// Maps executable commands to their handlers.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<CommandId, Arc<dyn CommandHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for a command; the latest registration wins.
    pub fn register(&mut self, command: CommandId, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(command, handler);
    }

    pub fn get(&self, command: CommandId) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(&command)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
