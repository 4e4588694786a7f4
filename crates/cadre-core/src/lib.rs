//! # Cadre Core
//!
//! The parsing core of the cadre CLI framework.
//!
//! This crate owns the pure, synchronous half of the framework — everything
//! needed to turn an argv slice into a resolved command with raw input values
//! recorded on its arguments:
//!
//! - **Token system**: typed lexical units and the partitioned stream
//!   ([`Token`], [`TokenCollection`])
//! - **Tokenizer**: argv → tokens, plus the ordered transformation chain
//!   (clubbed-flag expansion, assignment splitting)
//! - **Command tree**: the arena-backed model of commands, options, and
//!   operands, built by the embedding application ([`CommandTree`],
//!   [`CommandTreeProvider`])
//! - **Parser**: the token-consuming state machine producing a
//!   [`ParseResult`] or a typed [`ParseError`]
//!
//! Asynchronous concerns — the middleware pipeline, value binding, and
//! invocation — live in `cadre-framework`; runtime orchestration lives in
//! `cadre-runtime`.
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────┐    ┌───────────┐    ┌─────────────────┐    ┌─────────────┐
//! │ argv │───▶│ Tokenizer │───▶│ Transformations │───▶│ Parser      │
//! └──────┘    └───────────┘    └─────────────────┘    │ (vs tree)   │
//!                                                     └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use cadre_core::{Command, CommandOption, CommandParser, CommandTree,
//!                  Operand, ParserSettings, tokenizer};
//!
//! let mut tree = CommandTree::with_root_name("app");
//! tree.add_option(tree.root(), CommandOption::named("verbose").short('v').flag())?;
//! tree.add_operand(tree.root(), Operand::new("path"))?;
//!
//! let tokens = tokenizer::apply_transformations(
//!     tokenizer::tokenize(&["-v", "src/"], false),
//!     &[],
//! );
//! let settings = ParserSettings::default();
//! let result = CommandParser::parse(&mut tree, &settings, &tokens);
//! assert!(result.is_success());
//! ```

pub mod argument;
pub mod command;
pub mod error;
pub mod parser;
pub mod settings;
pub mod token;
pub mod tokenizer;
pub mod value;

pub use argument::{
    Arity, CommandOption, DefaultValue, InputSource, InputValue, Operand, TypeKind,
};
pub use command::{ArgumentLookup, Command, CommandId, CommandTree, CommandTreeProvider};
pub use error::{ConfigError, ConfigResult, ParseError};
pub use parser::{CommandParser, ParseResult};
pub use settings::{ArgumentSeparatorStrategy, ParserSettings};
pub use token::{OptionPrefix, OptionTokenMeta, Token, TokenCollection, TokenKind};
pub use tokenizer::{
    TokenTransformation, apply_transformations, expand_clubbed_flags, split_option_assignments,
    tokenize,
};
pub use value::ArgumentValue;
