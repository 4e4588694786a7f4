//! # Cadre
//!
//! A declarative, middleware-driven multi-command CLI framework.
//!
//! ## Overview
//!
//! Cadre turns an explicitly-built command tree into a running CLI: raw
//! arguments are tokenized, parsed against the tree by a fail-fast state
//! machine, bound to typed values, and dispatched to async handlers — all
//! through an ordered, stage-grouped middleware pipeline with cooperative
//! cancellation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────┐   ┌─────────────────────────────────────────────────┐   ┌─────────┐
//! │ argv │──▶│ Tokenize ▶ ParseInput ▶ BindValues ▶ Invoke     │──▶│ exit    │
//! └──────┘   │        (middleware pipeline, one Next chain)    │   │ code    │
//!            └─────────────────────────────────────────────────┘   └─────────┘
//! ```
//!
//! - **cadre-core**: tokens, tokenizer, command tree, parser
//! - **cadre-framework**: context, pipeline, value binder, handlers
//! - **cadre-runtime**: the `AppRunner`, settings, logging, input supplements
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadre::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cadre::runtime::RunError> {
//!     let mut tree = CommandTree::with_root_name("greet");
//!     tree.add_operand(tree.root(), Operand::new("name"))?;
//!     tree.add_option(tree.root(), CommandOption::named("shout").short('s').flag())?;
//!
//!     let runner = AppRunner::new(tree.clone())?.handle(
//!         tree.root(),
//!         handler_fn(|ctx| Box::pin(async move {
//!             let mut name = ctx.operand_value("name").unwrap().to_string();
//!             if ctx.flag("shout") {
//!                 name = name.to_uppercase();
//!             }
//!             ctx.console().write_line(format!("hello, {name}"));
//!             Ok(0)
//!         })),
//!     );
//!
//!     std::process::exit(runner.run_from_env().await?);
//! }
//! ```

pub use cadre_core as core;
pub use cadre_framework as framework;
pub use cadre_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use cadre::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use cadre_runtime::{AppRunner, AppSettings, RunError};

    // Command tree construction
    pub use cadre_core::{
        Arity, Command, CommandOption, CommandTree, CommandTreeProvider, DefaultValue, Operand,
        TypeKind,
    };

    // Parser configuration
    pub use cadre_core::{ArgumentSeparatorStrategy, ParserSettings};

    // Handlers and bound values
    pub use cadre_core::ArgumentValue;
    pub use cadre_framework::{
        CommandContext, CommandHandler, Console, HandlerResult, handler_fn,
    };

    // Middleware extension points
    pub use cadre_framework::{
        Middleware, MiddlewareStage, Next, PipelineResult, exit_code, middleware_fn,
    };

    // Input supplements
    pub use cadre_runtime::{AppSettingDefaults, EnvVarDefaults, StaticPipedInput};
}
