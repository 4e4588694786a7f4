//! The application runner.
//!
//! [`AppRunner`] assembles the registered pieces — the command tree from a
//! [`CommandTreeProvider`], handlers, type parsers, token transformations,
//! default-value sources, and middleware — into one invocation pipeline, and
//! drives a [`CommandContext`] through it per run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cadre_core::{Command, CommandOption, CommandTree, Operand};
//! use cadre_framework::handler_fn;
//! use cadre_runtime::AppRunner;
//!
//! let mut tree = CommandTree::with_root_name("greet");
//! tree.add_operand(tree.root(), Operand::new("name"))?;
//! tree.add_option(tree.root(), CommandOption::named("shout").flag())?;
//!
//! let runner = AppRunner::new(tree.clone())?.handle(
//!     tree.root(),
//!     handler_fn(|ctx| Box::pin(async move {
//!         let name = ctx.operand_value("name").unwrap();
//!         ctx.console().write_line(format!("hello {name}"));
//!         Ok(0)
//!     })),
//! );
//!
//! let exit = runner.run(&["world"]).await?;
//! ```
//!
//! Independent `run` invocations are side-effect isolated: each run clones
//! the pristine command tree into its own context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use cadre_core::{
    CommandId, CommandTree, CommandTreeProvider, ConfigError, TokenTransformation,
};
use cadre_framework::{
    BindValuesMiddleware, BoxError, CommandContext, CommandHandler, Console, HandlerRegistry,
    InvocationPipeline, InvokeMiddleware, Middleware, MiddlewareStage, ParseMiddleware,
    PipelineError, TokenizeMiddleware, TypeParser, TypeParserRegistry, exit_code,
};

use crate::defaults::{DefaultValueSource, DefaultValueSourcesMiddleware};
use crate::directives::ParseDirectiveMiddleware;
use crate::input::{PipedInputMiddleware, PipedInputSource, StdinPipedInput};
use crate::logging;
use crate::response_files::ResponseFilesMiddleware;
use crate::settings::AppSettings;

/// Errors escaping [`AppRunner::run`].
///
/// Parse and value errors never take this path — they are rendered on the
/// console and mapped to the validation exit code. What escapes is either a
/// configuration mistake or an error returned by a command handler, the
/// latter passed through as-is.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Handler(BoxError),
}

/// Orchestrates command runs over a fixed command tree.
pub struct AppRunner {
    tree: CommandTree,
    settings: AppSettings,
    handlers: HandlerRegistry,
    type_parsers: TypeParserRegistry,
    transformations: Vec<TokenTransformation>,
    user_middleware: Vec<(MiddlewareStage, Option<i32>, Arc<dyn Middleware>)>,
    default_sources: Vec<Arc<dyn DefaultValueSource>>,
    piped_source: Arc<dyn PipedInputSource>,
    console: Console,
    cancellation: CancellationToken,
    expand_response_files: bool,
    parse_directive: bool,
    cancel_on_ctrl_c: bool,
    ctrl_c_armed: AtomicBool,
}

impl AppRunner {
    /// Creates a runner with default settings.
    pub fn new(provider: impl CommandTreeProvider) -> Result<Self, ConfigError> {
        Self::with_settings(provider, AppSettings::default())
    }

    /// Creates a runner with explicit settings, initializing logging from
    /// them (a no-op when a subscriber is already installed).
    pub fn with_settings(
        provider: impl CommandTreeProvider,
        settings: AppSettings,
    ) -> Result<Self, ConfigError> {
        logging::init_from_settings(&settings.logging);
        let tree = provider.command_tree()?;
        Ok(Self {
            tree,
            settings,
            handlers: HandlerRegistry::new(),
            type_parsers: TypeParserRegistry::new(),
            transformations: Vec::new(),
            user_middleware: Vec::new(),
            default_sources: Vec::new(),
            piped_source: Arc::new(StdinPipedInput),
            console: Console::system(),
            cancellation: CancellationToken::new(),
            expand_response_files: false,
            parse_directive: false,
            cancel_on_ctrl_c: false,
            ctrl_c_armed: AtomicBool::new(false),
        })
    }

    /// Registers the handler invoked for `command`.
    pub fn handle(mut self, command: CommandId, handler: Arc<dyn CommandHandler>) -> Self {
        self.handlers.register(command, handler);
        self
    }

    /// Registers user middleware at the default order within `stage`.
    pub fn use_middleware(mut self, stage: MiddlewareStage, middleware: Arc<dyn Middleware>) -> Self {
        self.user_middleware.push((stage, None, middleware));
        self
    }

    /// Registers user middleware with an explicit order within `stage`.
    pub fn use_middleware_ordered(
        mut self,
        stage: MiddlewareStage,
        order: i32,
        middleware: Arc<dyn Middleware>,
    ) -> Self {
        self.user_middleware.push((stage, Some(order), middleware));
        self
    }

    /// Registers a value parser for a custom type name.
    pub fn register_type_parser(
        mut self,
        name: impl Into<String>,
        parser: Arc<dyn TypeParser>,
    ) -> Self {
        self.type_parsers.register(name, parser);
        self
    }

    /// Adds a user token transformation; these run before the system
    /// transformations, in ascending order.
    pub fn add_token_transformation(mut self, transformation: TokenTransformation) -> Self {
        self.transformations.push(transformation);
        self
    }

    /// Adds a default-value source, consulted for arguments with no explicit
    /// input.
    pub fn add_default_source(mut self, source: Arc<dyn DefaultValueSource>) -> Self {
        self.default_sources.push(source);
        self
    }

    /// Replaces the piped-input source (tests inject lines this way).
    pub fn piped_input_source(mut self, source: Arc<dyn PipedInputSource>) -> Self {
        self.piped_source = source;
        self
    }

    /// Replaces the console (tests capture output this way).
    pub fn console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Enables `@file` response-file expansion.
    pub fn use_response_files(mut self) -> Self {
        self.expand_response_files = true;
        self
    }

    /// Enables the `[parse]` diagnostic directive (and directive
    /// tokenization).
    pub fn use_parse_directive(mut self) -> Self {
        self.parse_directive = true;
        self
    }

    /// Cancels the run token on Ctrl-C. Cancellation stays cooperative: the
    /// pipeline aborts at the next stage boundary.
    pub fn cancel_on_ctrl_c(mut self) -> Self {
        self.cancel_on_ctrl_c = true;
        self
    }

    /// Replaces the root cancellation token.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The root cancellation token; cancel it to abort in-flight runs.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    fn build_pipeline(&self) -> InvocationPipeline {
        let mut pipeline = InvocationPipeline::new();

        if self.expand_response_files {
            pipeline.register_ordered(
                MiddlewareStage::Tokenize,
                Some(-100),
                Arc::new(ResponseFilesMiddleware),
            );
        }
        let include_directives = self.settings.include_directives || self.parse_directive;
        pipeline.register(
            MiddlewareStage::Tokenize,
            Arc::new(TokenizeMiddleware::new(
                include_directives,
                self.transformations.clone(),
            )),
        );
        if self.parse_directive {
            pipeline.register_ordered(
                MiddlewareStage::Tokenize,
                Some(100),
                Arc::new(ParseDirectiveMiddleware),
            );
        }

        pipeline.register(MiddlewareStage::ParseInput, Arc::new(ParseMiddleware));

        pipeline.register(
            MiddlewareStage::PostParseInputPreBindValues,
            Arc::new(PipedInputMiddleware::new(
                self.piped_source.clone(),
                self.settings.piped_input.clone(),
            )),
        );
        if !self.default_sources.is_empty() {
            pipeline.register_ordered(
                MiddlewareStage::PostParseInputPreBindValues,
                Some(100),
                Arc::new(DefaultValueSourcesMiddleware::new(
                    self.default_sources.clone(),
                )),
            );
        }

        pipeline.register(
            MiddlewareStage::BindValues,
            Arc::new(BindValuesMiddleware::new(Arc::new(
                self.type_parsers.clone(),
            ))),
        );
        pipeline.register(
            MiddlewareStage::Invoke,
            Arc::new(InvokeMiddleware::new(Arc::new(self.handlers.clone()))),
        );

        for (stage, order, middleware) in &self.user_middleware {
            pipeline.register_ordered(*stage, *order, middleware.clone());
        }
        pipeline
    }

    fn arm_ctrl_c(&self) {
        if !self.cancel_on_ctrl_c || self.ctrl_c_armed.swap(true, Ordering::SeqCst) {
            return;
        }
        let token = self.cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("ctrl-c received; requesting cancellation");
                token.cancel();
            }
        });
    }

    /// Runs one invocation through the pipeline.
    pub async fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<i32, RunError> {
        self.arm_ctrl_c();

        let args: Vec<String> = args.iter().map(|s| s.as_ref().to_string()).collect();
        let ctx = Arc::new(CommandContext::new(
            args,
            self.tree.clone(),
            self.settings.parser.clone(),
            self.console.clone(),
            self.cancellation.child_token(),
        ));

        let pipeline = self.build_pipeline().assemble();
        debug!(middleware = pipeline.len(), "pipeline assembled");

        match pipeline.invoke(ctx).await {
            Ok(code) => {
                debug!(code, "run completed");
                Ok(code)
            }
            Err(PipelineError::Config(e)) => Err(RunError::Config(e)),
            Err(PipelineError::Handler(e)) => Err(RunError::Handler(e)),
        }
    }

    /// Runs with the process arguments (skipping the binary name).
    pub async fn run_from_env(&self) -> Result<i32, RunError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        self.run(&args).await
    }

    /// Like [`run`](Self::run), but converts escaping errors into the
    /// generic failure exit code after reporting them.
    pub async fn run_to_exit<S: AsRef<str>>(&self, args: &[S]) -> i32 {
        match self.run(args).await {
            Ok(code) => code,
            Err(e) => {
                error!(%e, "run failed");
                self.console.write_error_line(e.to_string());
                exit_code::ERROR
            }
        }
    }
}

impl std::fmt::Debug for AppRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppRunner")
            .field("command_tree", &self.tree.full_path(self.tree.root()))
            .field("handlers", &self.handlers.len())
            .field("user_middleware", &self.user_middleware.len())
            .finish_non_exhaustive()
    }
}
