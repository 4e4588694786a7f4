//! The run-scoped command context.
//!
//! One [`CommandContext`] is created per `run` invocation and threaded as an
//! `Arc` through every middleware stage. It carries the original input, the
//! token stream, the command tree, the parse result, the console, and the
//! cancellation token.
//!
//! There is exactly one logical mutator at any time — the continuation chain
//! enforces strict sequencing — so the interior locks exist only to satisfy
//! `Arc` sharing across await points, never for cross-task contention.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use cadre_core::{
    ArgumentLookup, ArgumentValue, CommandId, CommandTree, ParseResult, ParserSettings,
    TokenCollection,
};

use crate::console::Console;

/// The mutable record threading one command run through the pipeline.
pub struct CommandContext {
    original_args: Vec<String>,
    effective_args: RwLock<Vec<String>>,
    tokens: RwLock<Option<TokenCollection>>,
    tree: RwLock<CommandTree>,
    parse_result: RwLock<Option<ParseResult>>,
    parser_settings: ParserSettings,
    console: Console,
    cancellation: CancellationToken,
    state: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl CommandContext {
    pub fn new(
        args: Vec<String>,
        tree: CommandTree,
        parser_settings: ParserSettings,
        console: Console,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            effective_args: RwLock::new(args.clone()),
            original_args: args,
            tokens: RwLock::new(None),
            tree: RwLock::new(tree),
            parse_result: RwLock::new(None),
            parser_settings,
            console,
            cancellation,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// The argv slice exactly as passed to `run`.
    pub fn original_args(&self) -> &[String] {
        &self.original_args
    }

    /// The arguments the tokenizer will consume; pre-tokenize middleware
    /// (e.g. response-file expansion) may rewrite them.
    pub fn effective_args(&self) -> Vec<String> {
        self.effective_args.read().clone()
    }

    pub fn set_effective_args(&self, args: Vec<String>) {
        *self.effective_args.write() = args;
    }

    /// The current token stream, once tokenization has run.
    pub fn tokens(&self) -> Option<TokenCollection> {
        self.tokens.read().clone()
    }

    pub fn set_tokens(&self, tokens: TokenCollection) {
        *self.tokens.write() = Some(tokens);
    }

    /// Runs `f` with shared access to the command tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&CommandTree) -> R) -> R {
        f(&self.tree.read())
    }

    /// Runs `f` with exclusive access to the command tree.
    pub fn with_tree_mut<R>(&self, f: impl FnOnce(&mut CommandTree) -> R) -> R {
        f(&mut self.tree.write())
    }

    pub fn parse_result(&self) -> Option<ParseResult> {
        self.parse_result.read().clone()
    }

    pub fn set_parse_result(&self, result: ParseResult) {
        *self.parse_result.write() = Some(result);
    }

    /// The deepest resolved command, once parsing has run.
    pub fn target_command(&self) -> Option<CommandId> {
        self.parse_result.read().as_ref().map(|r| r.target_command())
    }

    pub fn parser_settings(&self) -> &ParserSettings {
        &self.parser_settings
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Cooperative cancellation check; middleware inspects this at stage
    /// boundaries and aborts the chain without calling `next`.
    pub fn is_cancellation_requested(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    // ─── Bound value access ───────────────────────────────────────────────────

    /// The bound value of an option resolvable from the target command by any
    /// of its aliases (including in-scope ancestor options).
    pub fn option_value(&self, alias: &str) -> Option<ArgumentValue> {
        let target = self.target_command()?;
        self.with_tree(|tree| match tree.find_argument(target, alias) {
            Some((owner, ArgumentLookup::Option(index))) => {
                tree.option(owner, index).value().cloned()
            }
            _ => None,
        })
    }

    /// The bound value of an operand of the target command.
    pub fn operand_value(&self, name: &str) -> Option<ArgumentValue> {
        let target = self.target_command()?;
        self.with_tree(|tree| match tree.find_argument(target, name) {
            Some((owner, ArgumentLookup::Operand(index))) => {
                tree.operand(owner, index).value().cloned()
            }
            _ => None,
        })
    }

    /// `true` when the named flag was set.
    pub fn flag(&self, alias: &str) -> bool {
        self.option_value(alias)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    // ─── Typed state bag ──────────────────────────────────────────────────────

    /// Stores a value in the run-scoped state map. One value per type;
    /// subsequent calls overwrite.
    pub fn set_state<T: Send + Sync + 'static>(&self, value: T) {
        self.state.lock().insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a cloned value from the state map.
    pub fn get_state<T: Clone + 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    pub fn has_state<T: 'static>(&self) -> bool {
        self.state.lock().contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns a value from the state map.
    pub fn take_state<T: 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("original_args", &self.original_args)
            .field("has_tokens", &self.tokens.read().is_some())
            .field("has_parse_result", &self.parse_result.read().is_some())
            .field("is_cancellation_requested", &self.is_cancellation_requested())
            .finish_non_exhaustive()
    }
}
