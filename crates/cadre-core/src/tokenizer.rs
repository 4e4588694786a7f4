//! Converts raw argument strings into a typed [`TokenCollection`].
//!
//! Tokenization is a pure function over the argv slice:
//!
//! - `[name]` tokens at the head of the stream become directives while
//!   `include_directives` is enabled; recognition stops permanently at the
//!   first non-directive token.
//! - A literal `--` is the argument separator; everything after it is
//!   tokenized as plain values only.
//! - `--name` (but not `---...`) is a long option; `-n` with a non-`-` second
//!   character is a short option. A `:` or `=` inside an option token splits
//!   it into `(name, assigned value)` at the first occurrence.
//! - Everything else is a plain value.
//!
//! After tokenizing, [`apply_transformations`] runs user-registered
//! [`TokenTransformation`]s in ascending order, then unconditionally appends
//! the two system transformations: [`expand_clubbed_flags`] and
//! [`split_option_assignments`]. Both are idempotent, and because user
//! transformations run first they always observe pre-expansion token shapes.

use std::sync::Arc;

use tracing::trace;

use crate::token::{OptionPrefix, OptionTokenMeta, Token, TokenCollection};

/// Tokenizes an argument array.
pub fn tokenize<S: AsRef<str>>(args: &[S], include_directives: bool) -> TokenCollection {
    let mut tokens = Vec::with_capacity(args.len());
    let mut directives_done = !include_directives;
    let mut after_separator = false;

    for arg in args {
        let arg = arg.as_ref();

        if after_separator {
            tokens.push(Token::plain(arg));
            continue;
        }

        if !directives_done {
            if let Some(name) = directive_name(arg) {
                tokens.push(Token::directive(name));
                continue;
            }
            directives_done = true;
        }

        if arg == "--" {
            tokens.push(Token::separator());
            after_separator = true;
        } else if let Some(meta) = option_meta(arg) {
            tokens.push(Token::option(arg, meta));
        } else {
            tokens.push(Token::plain(arg));
        }
    }

    trace!(count = tokens.len(), "tokenized arguments");
    TokenCollection::new(tokens)
}

fn directive_name(arg: &str) -> Option<&str> {
    arg.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|name| !name.is_empty())
}

fn option_meta(arg: &str) -> Option<OptionTokenMeta> {
    if let Some(rest) = arg.strip_prefix("--") {
        // `---...` and a bare `--=...` are not options.
        if rest.starts_with('-') {
            return None;
        }
        return split_assignment(rest).filter(|(name, _)| !name.is_empty()).map(
            |(name, assigned)| {
                let meta = OptionTokenMeta::new(OptionPrefix::Long, name);
                match assigned {
                    Some(value) => meta.with_assignment(value),
                    None => meta,
                }
            },
        );
    }

    let rest = arg.strip_prefix('-')?;
    if rest.is_empty() || rest.starts_with('-') {
        return None;
    }
    split_assignment(rest)
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, assigned)| {
            let meta = OptionTokenMeta::new(OptionPrefix::Short, name);
            match assigned {
                Some(value) => meta.with_assignment(value),
                None => meta,
            }
        })
}

/// Splits `name=value` / `name:value` at the first `:` or `=`.
fn split_assignment(text: &str) -> Option<(&str, Option<&str>)> {
    match text.find([':', '=']) {
        Some(i) => Some((&text[..i], Some(&text[i + 1..]))),
        None => Some((text, None)),
    }
}

// =============================================================================
// Transformations
// =============================================================================

/// A named, ordered rewrite of the token stream, applied after tokenizing and
/// before parsing.
#[derive(Clone)]
pub struct TokenTransformation {
    name: &'static str,
    order: i32,
    apply: Arc<dyn Fn(&TokenCollection) -> TokenCollection + Send + Sync>,
}

impl TokenTransformation {
    pub fn new<F>(name: &'static str, order: i32, apply: F) -> Self
    where
        F: Fn(&TokenCollection) -> TokenCollection + Send + Sync + 'static,
    {
        Self {
            name,
            order,
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn apply(&self, tokens: &TokenCollection) -> TokenCollection {
        (self.apply)(tokens)
    }
}

impl std::fmt::Debug for TokenTransformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenTransformation")
            .field("name", &self.name)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Runs `user` transformations in ascending order (stable for equal orders),
/// then the two system transformations, unconditionally last.
pub fn apply_transformations(
    tokens: TokenCollection,
    user: &[TokenTransformation],
) -> TokenCollection {
    let mut ordered: Vec<&TokenTransformation> = user.iter().collect();
    ordered.sort_by_key(|t| t.order());

    let mut tokens = tokens;
    for transformation in ordered {
        trace!(name = transformation.name(), "applying token transformation");
        tokens = transformation.apply(&tokens);
    }
    let tokens = expand_clubbed_flags(&tokens);
    split_option_assignments(&tokens)
}

/// Expands clubbed short options (`-abc`) into individual single-character
/// option tokens (`-a -b -c`), each linked back to the club token.
///
/// No-op on tokens that are not clubbed candidates, so a second application
/// changes nothing.
pub fn expand_clubbed_flags(tokens: &TokenCollection) -> TokenCollection {
    tokens.transform(|token| {
        match token.option_meta() {
            Some(meta) if meta.is_clubbed_candidate => meta
                .name
                .chars()
                .map(|c| {
                    Token::option(
                        format!("-{c}"),
                        OptionTokenMeta::new(OptionPrefix::Short, c.to_string()),
                    )
                    .derived_from(token)
                })
                .collect(),
            _ => vec![token.clone()],
        }
    })
}

/// Splits assignment option tokens (`--opt=value`, `-o:value`) into a bare
/// option token followed by a value token, both linked back to the original.
///
/// No-op on tokens without an assignment, so a second application changes
/// nothing.
pub fn split_option_assignments(tokens: &TokenCollection) -> TokenCollection {
    tokens.transform(|token| match token.option_meta() {
        Some(meta) => match &meta.assigned_value {
            Some(value) => {
                let bare = OptionTokenMeta::new(meta.prefix, meta.name.clone());
                vec![
                    Token::option(format!("{}{}", meta.prefix.as_str(), meta.name), bare)
                        .derived_from(token),
                    Token::plain(value.clone()).derived_from(token),
                ]
            }
            None => vec![token.clone()],
        },
        None => vec![token.clone()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_kinds() {
        let tokens = tokenize(&args(&["[parse]", "do", "--opt", "-a", "value", "--", "-x"]), true);
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Directive,
                TokenKind::Value,
                TokenKind::Option,
                TokenKind::Option,
                TokenKind::Value,
                TokenKind::Separator,
                TokenKind::Value,
            ]
        );
    }

    #[test]
    fn test_directives_disabled_become_values() {
        let tokens = tokenize(&args(&["[parse]", "do"]), false);
        assert!(tokens.directives().is_empty());
        assert_eq!(tokens.arguments()[0].kind(), TokenKind::Value);
        assert_eq!(tokens.arguments()[0].raw_value(), "[parse]");
    }

    #[test]
    fn test_directive_recognition_stops_at_first_non_directive() {
        let tokens = tokenize(&args(&["[a]", "[b]", "do", "[c]"]), true);
        assert_eq!(tokens.directives().len(), 2);
        assert_eq!(tokens.arguments()[1].kind(), TokenKind::Value);
        assert_eq!(tokens.arguments()[1].raw_value(), "[c]");
    }

    #[test]
    fn test_tokens_after_separator_are_never_options() {
        let tokens = tokenize(&args(&["do", "--", "--opt", "[d]", "--"]), true);
        assert_eq!(tokens.separated().len(), 3);
        assert!(tokens.separated().iter().all(|t| t.kind() == TokenKind::Value));
    }

    #[test]
    fn test_option_shapes() {
        let tokens = tokenize(&args(&["--long", "-s", "-abc", "---dash", "-", "-1"]), false);
        let long = tokens.get(0).unwrap().option_meta().unwrap();
        assert_eq!(long.prefix, OptionPrefix::Long);
        assert_eq!(long.name, "long");
        assert!(!long.is_clubbed_candidate);

        let short = tokens.get(1).unwrap().option_meta().unwrap();
        assert_eq!(short.prefix, OptionPrefix::Short);
        assert!(!short.is_clubbed_candidate);

        let club = tokens.get(2).unwrap().option_meta().unwrap();
        assert!(club.is_clubbed_candidate);

        // `---dash` and a bare `-` are plain values.
        assert_eq!(tokens.get(3).unwrap().kind(), TokenKind::Value);
        assert_eq!(tokens.get(4).unwrap().kind(), TokenKind::Value);

        // `-1` still tokenizes as an option; the parser decides whether it is
        // a negative number operand.
        assert_eq!(tokens.get(5).unwrap().kind(), TokenKind::Option);
    }

    #[test]
    fn test_assignment_splits_at_first_delimiter() {
        let tokens = tokenize(&args(&["--opt=a=b", "-o:1:30"]), false);
        let long = tokens.get(0).unwrap().option_meta().unwrap();
        assert_eq!(long.name, "opt");
        assert_eq!(long.assigned_value.as_deref(), Some("a=b"));

        let short = tokens.get(1).unwrap().option_meta().unwrap();
        assert_eq!(short.name, "o");
        assert_eq!(short.assigned_value.as_deref(), Some("1:30"));
    }

    #[test]
    fn test_round_trip_reconstructs_input() {
        let input = args(&["[parse]", "do", "--opt=5", "-ab", "val", "--", "x", "y"]);
        let tokens = tokenize(&input, true);
        assert_eq!(tokens.to_args_array(), input);
    }

    #[test]
    fn test_expand_clubbed_flags() {
        let tokens = tokenize(&args(&["-abc", "-x", "--long"]), false);
        let expanded = expand_clubbed_flags(&tokens);
        assert_eq!(
            expanded.to_args_array(),
            vec!["-a", "-b", "-c", "-x", "--long"]
        );
        assert_eq!(expanded.get(0).unwrap().source().unwrap().raw_value(), "-abc");
        assert!(expanded.get(0).unwrap().shares_source_with(expanded.get(2).unwrap()));
    }

    #[test]
    fn test_expand_clubbed_flags_is_idempotent() {
        let tokens = tokenize(&args(&["-abc", "-x=1"]), false);
        let once = expand_clubbed_flags(&tokens);
        let twice = expand_clubbed_flags(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_split_option_assignments() {
        let tokens = tokenize(&args(&["--opt=5", "-o:x", "plain"]), false);
        let split = split_option_assignments(&tokens);
        assert_eq!(split.to_args_array(), vec!["--opt", "5", "-o", "x", "plain"]);
        assert_eq!(split.get(1).unwrap().kind(), TokenKind::Value);
        assert_eq!(split.get(0).unwrap().source().unwrap().raw_value(), "--opt=5");
    }

    #[test]
    fn test_split_option_assignments_is_idempotent() {
        let tokens = tokenize(&args(&["--opt=5", "-ab=3"]), false);
        let once = split_option_assignments(&tokens);
        let twice = split_option_assignments(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_assignment_club_survives_expansion_for_the_parser() {
        // `-ab=5` is not a clubbed candidate, so expansion leaves it alone and
        // splitting yields a multi-character short option for the parser to
        // resolve as a club.
        let tokens = tokenize(&args(&["-ab=5"]), false);
        let transformed = apply_transformations(tokens, &[]);
        assert_eq!(transformed.to_args_array(), vec!["-ab", "5"]);
        let meta = transformed.get(0).unwrap().option_meta().unwrap();
        assert!(meta.is_clubbed_candidate);
    }

    #[test]
    fn test_user_transformations_run_before_system_in_ascending_order() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        let record = |name: &'static str, seen: std::sync::Arc<std::sync::Mutex<Vec<String>>>| {
            TokenTransformation::new(name, if name == "first" { -1 } else { 1 }, move |tokens| {
                seen.lock().unwrap().push(name.to_string());
                // User transformations observe pre-expansion shapes.
                assert!(tokens.iter().any(|t| t.raw_value() == "-ab"));
                tokens.clone()
            })
        };

        let tokens = tokenize(&args(&["-ab"]), false);
        let transformed = apply_transformations(
            tokens,
            &[record("second", seen.clone()), record("first", seen.clone())],
        );
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(transformed.to_args_array(), vec!["-a", "-b"]);
    }
}
