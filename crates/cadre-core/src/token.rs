//! Lexical tokens and the token collection.
//!
//! A [`Token`] is one immutable lexical unit produced by the tokenizer: a
//! directive, an option, a plain value, or the `--` argument separator. A
//! [`TokenCollection`] is the ordered stream of tokens for one invocation,
//! partitioned by derivation (not by storage) into three views:
//!
//! - **Directives** — `[name]` tokens at the head of the stream
//! - **Arguments** — the main stream up to the `--` separator
//! - **Separated** — everything after the separator, never re-interpreted
//!
//! Tokens produced by a transformation (clubbed-flag expansion, assignment
//! splitting) carry a [`source`](Token::source) link back to the token they
//! were derived from, preserving provenance through the transformation chain.

use std::sync::Arc;

/// The lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A `[name]` token recognized at the head of the stream.
    Directive,
    /// A `--name` or `-n` option token.
    Option,
    /// A plain value token.
    Value,
    /// The literal `--` argument separator.
    Separator,
}

/// The prefix an option token was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionPrefix {
    /// `--name`
    Long,
    /// `-n`
    Short,
}

impl OptionPrefix {
    /// The literal prefix characters.
    pub fn as_str(self) -> &'static str {
        match self {
            OptionPrefix::Long => "--",
            OptionPrefix::Short => "-",
        }
    }
}

/// Option-specific lexical details attached to [`TokenKind::Option`] tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTokenMeta {
    /// How the option was prefixed on the command line.
    pub prefix: OptionPrefix,
    /// The option name without prefix or assignment.
    pub name: String,
    /// The value from a `name=value` / `name:value` assignment, if present.
    pub assigned_value: Option<String>,
    /// Short-prefixed, multi-character, assignment-free tokens are candidates
    /// for clubbed-flag expansion (`-abc` → `-a -b -c`). Numeric names are
    /// excluded: `-3.5` must stay whole for the negative-number fall-through.
    pub is_clubbed_candidate: bool,
}

impl OptionTokenMeta {
    pub(crate) fn new(prefix: OptionPrefix, name: impl Into<String>) -> Self {
        let name = name.into();
        let is_clubbed_candidate = prefix == OptionPrefix::Short
            && name.chars().count() > 1
            && name.parse::<f64>().is_err();
        Self {
            prefix,
            name,
            assigned_value: None,
            is_clubbed_candidate,
        }
    }

    pub(crate) fn with_assignment(mut self, value: impl Into<String>) -> Self {
        self.assigned_value = Some(value.into());
        // An assignment disqualifies the token from clubbed expansion; the
        // parser resolves `-ab=5` itself.
        self.is_clubbed_candidate = false;
        self
    }
}

/// One immutable lexical unit.
///
/// `raw_value` is the exact argv string; `value` is the semantic payload
/// (the option name for option tokens, the directive name for directives,
/// the text itself for values).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    raw_value: String,
    value: String,
    kind: TokenKind,
    option: Option<OptionTokenMeta>,
    source: Option<Arc<Token>>,
}

impl Token {
    pub(crate) fn new(
        raw_value: impl Into<String>,
        value: impl Into<String>,
        kind: TokenKind,
        option: Option<OptionTokenMeta>,
    ) -> Self {
        Self {
            raw_value: raw_value.into(),
            value: value.into(),
            kind,
            option,
            source: None,
        }
    }

    /// Creates a plain value token.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text, TokenKind::Value, None)
    }

    /// Creates a directive token from its inner name (`parse` for `[parse]`).
    pub fn directive(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(format!("[{name}]"), name, TokenKind::Directive, None)
    }

    /// Creates the `--` separator token.
    pub fn separator() -> Self {
        Self::new("--", "--", TokenKind::Separator, None)
    }

    /// Creates an option token from its lexical meta.
    pub fn option(raw_value: impl Into<String>, meta: OptionTokenMeta) -> Self {
        Self::new(raw_value, meta.name.clone(), TokenKind::Option, Some(meta))
    }

    /// Returns a copy of this token linked back to the token it was derived
    /// from by a transformation.
    pub fn derived_from(mut self, source: &Token) -> Self {
        // Chain provenance to the original token rather than nesting.
        let origin = source.source.clone().unwrap_or_else(|| Arc::new(source.clone()));
        self.source = Some(origin);
        self
    }

    /// The exact argv string this token was read from.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// The semantic payload of the token.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Option-specific details, present only for [`TokenKind::Option`].
    pub fn option_meta(&self) -> Option<&OptionTokenMeta> {
        self.option.as_ref()
    }

    /// The token this one was derived from, if it was produced by a
    /// transformation.
    pub fn source(&self) -> Option<&Token> {
        self.source.as_deref()
    }

    /// Returns `true` if both tokens were derived from the same source token.
    pub fn shares_source_with(&self, other: &Token) -> bool {
        match (&self.source, &other.source) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw_value)
    }
}

/// The ordered token stream for one invocation.
///
/// Partitions are derived from token kinds: the directive partition is the
/// leading run of [`TokenKind::Directive`] tokens, and the separated partition
/// is everything after the first [`TokenKind::Separator`]. At most one
/// separator is ever recognized per invocation; tokens after it are always
/// plain values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenCollection {
    tokens: Vec<Token>,
}

impl TokenCollection {
    /// Wraps an already-tokenized stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(
            tokens
                .iter()
                .filter(|t| t.kind() == TokenKind::Separator)
                .count()
                <= 1,
            "a token stream holds at most one separator"
        );
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    fn directive_end(&self) -> usize {
        self.tokens
            .iter()
            .position(|t| t.kind() != TokenKind::Directive)
            .unwrap_or(self.tokens.len())
    }

    fn separator_index(&self) -> Option<usize> {
        self.tokens
            .iter()
            .position(|t| t.kind() == TokenKind::Separator)
    }

    /// The leading `[name]` directive tokens.
    pub fn directives(&self) -> &[Token] {
        &self.tokens[..self.directive_end()]
    }

    /// The main argument stream: after directives, before the separator.
    pub fn arguments(&self) -> &[Token] {
        let start = self.directive_end();
        let end = self.separator_index().unwrap_or(self.tokens.len());
        &self.tokens[start..end.max(start)]
    }

    /// The separator token, if the stream contains one.
    pub fn separator(&self) -> Option<&Token> {
        self.separator_index().map(|i| &self.tokens[i])
    }

    /// The tokens after the separator, always plain values.
    pub fn separated(&self) -> &[Token] {
        match self.separator_index() {
            Some(i) => &self.tokens[i + 1..],
            None => &[],
        }
    }

    /// Returns `true` if the stream carries the named directive.
    ///
    /// Directive names compare case-insensitively.
    pub fn has_directive(&self, name: &str) -> bool {
        self.directives()
            .iter()
            .any(|t| t.value().eq_ignore_ascii_case(name))
    }

    /// Reconstructs the raw argument array, reproducing the original input
    /// order, including the separator and separated tokens.
    pub fn to_args_array(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.raw_value().to_string()).collect()
    }

    /// Rebuilds the collection by mapping every token in the argument
    /// partition through `f`; directives, the separator, and separated tokens
    /// pass through untouched.
    ///
    /// This is the building block for token transformations: `f` returns the
    /// replacement tokens for each argument token (usually just the token
    /// itself).
    pub fn transform<F>(&self, f: F) -> TokenCollection
    where
        F: Fn(&Token) -> Vec<Token>,
    {
        let directive_end = self.directive_end();
        let separator_index = self.separator_index().unwrap_or(self.tokens.len());

        let mut tokens = Vec::with_capacity(self.tokens.len());
        for (i, token) in self.tokens.iter().enumerate() {
            if i < directive_end || i >= separator_index {
                tokens.push(token.clone());
            } else {
                tokens.extend(f(token));
            }
        }
        TokenCollection::new(tokens)
    }
}

impl<'a> IntoIterator for &'a TokenCollection {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
