//! The middleware execution pipeline.
//!
//! A command run is a chain of async middleware grouped into fixed
//! [`MiddlewareStage`]s. Each middleware receives the shared
//! [`CommandContext`] and a [`Next`] continuation: it may run logic before
//! calling `next`, short-circuit by not calling it, and run logic after
//! `next` resolves — which is how a trailing hook is guaranteed to run
//! strictly after the full downstream pipeline, including async invocation,
//! completes.
//!
//! Registrations are sorted by `(stage ascending, order-within-stage
//! ascending)`; an unspecified order falls back to registration sequence, so
//! composition is deterministic and reproducible across runs. The sorted list
//! is folded right-to-left into a single continuation, built once per run.
//!
//! Cancellation is cooperative: a single `CancellationToken` is attached to
//! the context before the pipeline starts, and middleware checks it at stage
//! boundaries. There is no forced abort of in-flight invocation.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use thiserror::Error;
use tracing::trace;

use cadre_core::ConfigError;

use crate::context::CommandContext;

/// Process exit codes used by the pipeline.
pub mod exit_code {
    /// Successful run.
    pub const SUCCESS: i32 = 0;
    /// Unhandled or generic failure.
    pub const ERROR: i32 = 1;
    /// Validation or parse error.
    pub const VALIDATION: i32 = 2;
}

/// A boxed error from a command handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors escaping the pipeline.
///
/// User-input problems never take this path — they are rendered on the
/// console and mapped to [`exit_code::VALIDATION`]. This type carries
/// configuration mistakes and errors thrown by command handlers, which
/// propagate out of `run` unswallowed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error returned by a command handler, passed through as-is.
    #[error("{0}")]
    Handler(BoxError),
}

/// Result of one middleware link: an exit code, or an escaping error.
pub type PipelineResult = Result<i32, PipelineError>;

/// The fixed execution stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MiddlewareStage {
    Tokenize,
    ParseInput,
    PostParseInputPreBindValues,
    BindValues,
    PostBindValuesPreInvoke,
    Invoke,
}

/// One link of the execution chain.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str {
        "middleware"
    }

    /// Processes the context and decides whether to continue the chain via
    /// `next.run(ctx)`.
    async fn handle(&self, ctx: Arc<CommandContext>, next: Next) -> PipelineResult;
}

/// The continuation over the remaining chain.
///
/// Running past the end of the chain resolves to
/// [`exit_code::SUCCESS`].
#[derive(Clone)]
pub struct Next {
    chain: Arc<[Arc<dyn Middleware>]>,
    index: usize,
}

impl Next {
    pub async fn run(mut self, ctx: Arc<CommandContext>) -> PipelineResult {
        let Some(middleware) = self.chain.get(self.index).cloned() else {
            return Ok(exit_code::SUCCESS);
        };
        self.index += 1;
        trace!(middleware = middleware.name(), "entering middleware");
        middleware.handle(ctx, self).await
    }
}

struct Registration {
    stage: MiddlewareStage,
    order: Option<i32>,
    middleware: Arc<dyn Middleware>,
}

/// An ordered set of middleware registrations, assembled into one executable
/// chain per run.
#[derive(Default)]
pub struct InvocationPipeline {
    registrations: Vec<Registration>,
}

impl InvocationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers middleware at the default order within its stage.
    pub fn register(&mut self, stage: MiddlewareStage, middleware: Arc<dyn Middleware>) {
        self.register_ordered(stage, None, middleware);
    }

    /// Registers middleware with an explicit order within its stage. Lower
    /// orders run earlier; equal orders keep registration sequence.
    pub fn register_ordered(
        &mut self,
        stage: MiddlewareStage,
        order: Option<i32>,
        middleware: Arc<dyn Middleware>,
    ) {
        self.registrations.push(Registration {
            stage,
            order,
            middleware,
        });
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Sorts registrations by `(stage, order)` — stable, so unspecified
    /// orders keep their registration sequence — and folds them into a single
    /// continuation chain.
    pub fn assemble(&self) -> AssembledPipeline {
        let mut ordered: Vec<&Registration> = self.registrations.iter().collect();
        ordered.sort_by_key(|r| (r.stage, r.order.unwrap_or(0)));

        let chain: Vec<Arc<dyn Middleware>> =
            ordered.into_iter().map(|r| r.middleware.clone()).collect();
        AssembledPipeline {
            chain: chain.into(),
        }
    }
}

impl std::fmt::Debug for InvocationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationPipeline")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

/// The composed chain for one run.
#[derive(Clone)]
pub struct AssembledPipeline {
    chain: Arc<[Arc<dyn Middleware>]>,
}

impl AssembledPipeline {
    /// Invokes the full chain with the shared context.
    pub async fn invoke(&self, ctx: Arc<CommandContext>) -> PipelineResult {
        Next {
            chain: self.chain.clone(),
            index: 0,
        }
        .run(ctx)
        .await
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

// =============================================================================
// Function middleware
// =============================================================================

struct FnMiddleware<F> {
    name: &'static str,
    f: F,
}

#[async_trait]
impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Arc<CommandContext>, Next) -> BoxFuture<'static, PipelineResult> + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    async fn handle(&self, ctx: Arc<CommandContext>, next: Next) -> PipelineResult {
        (self.f)(ctx, next).await
    }
}

/// Wraps a closure as middleware.
///
/// ```rust,ignore
/// pipeline.register(
///     MiddlewareStage::PostBindValuesPreInvoke,
///     middleware_fn("audit", |ctx, next| Box::pin(async move {
///         let code = next.run(ctx).await?;
///         // runs strictly after the downstream pipeline completed
///         Ok(code)
///     })),
/// );
/// ```
pub fn middleware_fn<F>(name: &'static str, f: F) -> Arc<dyn Middleware>
where
    F: Fn(Arc<CommandContext>, Next) -> BoxFuture<'static, PipelineResult> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware { name, f })
}
