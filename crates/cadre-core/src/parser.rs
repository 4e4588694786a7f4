//! The command parser: a state machine over the token stream.
//!
//! [`CommandParser::parse`] walks the argument partition of a
//! [`TokenCollection`] against a [`CommandTree`], resolving subcommands,
//! options (including clubbed short flags and inline assignments), and
//! operands, and recording raw input values on the resolved arguments. The
//! outcome is a [`ParseResult`]: either a target command ready for value
//! binding, or a typed [`ParseError`] plus the deepest command resolved
//! before the failure.
//!
//! Parsing is fail-fast: the first error stops token consumption. State is
//! tracked in plain fields rather than an explicit state enum:
//!
//! - the current command, starting at the root
//! - whether subcommands are still allowed (they may only appear contiguously
//!   at the start of the remaining stream; consuming any operand or option
//!   value closes the window permanently)
//! - the option awaiting a value, if any
//! - the operand queue seeded from the current command, with the trailing
//!   list operand kept sticky once dequeued
//! - whether unexpected operands are being collected verbatim

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::argument::{InputSource, InputValue};
use crate::command::{ArgumentLookup, CommandId, CommandTree};
use crate::error::ParseError;
use crate::settings::{ArgumentSeparatorStrategy, ParserSettings};
use crate::token::{OptionPrefix, OptionTokenMeta, Token, TokenCollection, TokenKind};

/// The terminal output of parsing.
///
/// `target_command` is always set — on failure it names the deepest resolved
/// command so downstream rendering targets the right node.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    target_command: CommandId,
    remaining_operands: Vec<Token>,
    separated_arguments: Vec<Token>,
    error: Option<ParseError>,
}

impl ParseResult {
    pub fn target_command(&self) -> CommandId {
        self.target_command
    }

    /// Tokens collected verbatim once unexpected operands were ignored.
    pub fn remaining_operands(&self) -> &[Token] {
        &self.remaining_operands
    }

    /// Tokens after the `--` separator, untouched by interpretation.
    pub fn separated_arguments(&self) -> &[Token] {
        &self.separated_arguments
    }

    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

struct ExpectedOption {
    owner: CommandId,
    index: usize,
    name: String,
    token: Token,
}

struct ParseState {
    command: CommandId,
    subcommands_allowed: bool,
    expected: Option<ExpectedOption>,
    operand_queue: VecDeque<usize>,
    list_operand: Option<usize>,
    ignore_remaining: bool,
    remaining_operands: Vec<Token>,
}

/// Walks tokens against a command tree, mutating argument input values on the
/// tree as they are resolved.
pub struct CommandParser<'a> {
    tree: &'a mut CommandTree,
    settings: &'a ParserSettings,
}

impl<'a> CommandParser<'a> {
    pub fn parse(
        tree: &'a mut CommandTree,
        settings: &'a ParserSettings,
        tokens: &TokenCollection,
    ) -> ParseResult {
        let mut parser = CommandParser { tree, settings };
        parser.run(tokens)
    }

    fn run(&mut self, tokens: &TokenCollection) -> ParseResult {
        let root = self.tree.root();
        let mut state = ParseState {
            command: root,
            subcommands_allowed: true,
            expected: None,
            operand_queue: (0..self.tree.get(root).operands().len()).collect(),
            list_operand: None,
            ignore_remaining: false,
            remaining_operands: Vec::new(),
        };

        for token in tokens.arguments() {
            trace!(token = %token, "consuming token");
            if let Err(error) = self.consume(&mut state, token, false) {
                return self.finish(state, tokens, Some(error));
            }
        }

        if let Some(expected) = state.expected.take() {
            let error = ParseError::MissingOptionValue {
                command: state.command,
                option: expected.name,
                token: expected.token,
            };
            return self.finish(state, tokens, Some(error));
        }

        // `EndOfOptions` additionally binds separated tokens to remaining
        // operands; `PassThru` leaves them purely in the separated partition.
        if tokens.separator().is_some() {
            let strategy = self
                .tree
                .effective_separator_strategy(state.command, self.settings.default_separator_strategy);
            if strategy == ArgumentSeparatorStrategy::EndOfOptions {
                for token in tokens.separated() {
                    if let Err(error) = self.consume(&mut state, token, true) {
                        return self.finish(state, tokens, Some(error));
                    }
                }
            }
        }

        self.finish(state, tokens, None)
    }

    fn finish(
        &self,
        state: ParseState,
        tokens: &TokenCollection,
        error: Option<ParseError>,
    ) -> ParseResult {
        if let Some(error) = &error {
            debug!(command = %self.tree.full_path(state.command), %error, "parse failed");
        }
        ParseResult {
            target_command: state.command,
            remaining_operands: state.remaining_operands,
            separated_arguments: tokens.separated().to_vec(),
            error,
        }
    }

    /// Applies one token to the state machine. `operands_only` is set while
    /// replaying separated tokens: subcommand and option matching is skipped.
    fn consume(
        &mut self,
        state: &mut ParseState,
        token: &Token,
        operands_only: bool,
    ) -> Result<(), ParseError> {
        if state.ignore_remaining {
            state.remaining_operands.push(token.clone());
            return Ok(());
        }

        if !operands_only {
            // An awaited option value takes precedence over everything.
            if let Some(expected) = state.expected.take() {
                if token.kind() == TokenKind::Value {
                    return self.bind_expected(state, expected, token);
                }
                if token.shares_source_with(&expected.token) {
                    // The club's non-final member was not a flag.
                    return Err(ParseError::ExpectedFlag {
                        command: state.command,
                        option: expected.name,
                        token: origin(&expected.token),
                    });
                }
                return Err(ParseError::MissingOptionValue {
                    command: state.command,
                    option: expected.name,
                    token: expected.token,
                });
            }

            // Subcommands may only appear before any operand or option value
            // has been consumed.
            if state.subcommands_allowed
                && token.kind() == TokenKind::Value
                && let Some(child) = self.tree.find_subcommand(state.command, token.value())
            {
                debug!(command = %self.tree.full_path(child), "descending into subcommand");
                state.command = child;
                state.operand_queue = (0..self.tree.get(child).operands().len()).collect();
                state.list_operand = None;
                return Ok(());
            }

            if token.kind() == TokenKind::Option
                && let Some(meta) = token.option_meta()
            {
                let meta = meta.clone();
                return self.resolve_option(
                    state,
                    token,
                    &meta.name,
                    meta.assigned_value.clone(),
                    meta.is_clubbed_candidate,
                    false,
                );
            }

            if self.settings.allow_slash_options
                && token.kind() == TokenKind::Value
                && let Some(rest) = token.raw_value().strip_prefix('/')
                && !rest.is_empty()
            {
                let (name, assigned) = match rest.find([':', '=']) {
                    Some(i) => (&rest[..i], Some(rest[i + 1..].to_string())),
                    None => (rest, None),
                };
                // Unresolved slash tokens fall back to operands so paths
                // keep working.
                return self.resolve_option(state, token, name, assigned, false, true);
            }
        }

        self.parse_operand(state, token)
    }

    fn bind_expected(
        &mut self,
        state: &mut ParseState,
        expected: ExpectedOption,
        token: &Token,
    ) -> Result<(), ParseError> {
        let option = self.tree.option(expected.owner, expected.index);
        if !option.allows(token.value()) {
            return Err(ParseError::NotAllowedValue {
                command: state.command,
                argument: expected.name,
                token: token.clone(),
                allowed: option.get_allowed_values().to_vec(),
            });
        }
        self.tree
            .option_mut(expected.owner, expected.index)
            .push_input(InputValue::new(token.value(), InputSource::Argv));
        state.subcommands_allowed = false;
        Ok(())
    }

    fn resolve_option(
        &mut self,
        state: &mut ParseState,
        token: &Token,
        name: &str,
        assigned: Option<String>,
        club_candidate: bool,
        operand_fallback: bool,
    ) -> Result<(), ParseError> {
        match self.tree.find_argument(state.command, name) {
            Some((_, ArgumentLookup::Subcommand(child))) => {
                // The user option-prefixed a subcommand name; suggest the
                // intended form.
                let suggestion = format!("did you mean '{}'?", self.tree.full_path(child));
                Err(ParseError::UnrecognizedArgument {
                    command: state.command,
                    token: token.clone(),
                    suggestion: Some(suggestion),
                })
            }
            Some((owner, ArgumentLookup::Option(index))) => {
                self.apply_option(state, owner, index, token, assigned)
            }
            Some((_, ArgumentLookup::Operand(_))) | None => {
                if club_candidate {
                    return self.parse_clubbed(state, token, name, assigned);
                }
                if operand_fallback {
                    return self.parse_operand(state, token);
                }
                if is_negative_number(token.raw_value()) {
                    return self.parse_operand(state, token);
                }
                Err(ParseError::UnrecognizedOption {
                    command: state.command,
                    token: token.clone(),
                })
            }
        }
    }

    /// Re-attempts a multi-character short token as clubbed flags: every
    /// character must resolve to a short-named option, and all but the last
    /// must be flags.
    fn parse_clubbed(
        &mut self,
        state: &mut ParseState,
        token: &Token,
        name: &str,
        assigned: Option<String>,
    ) -> Result<(), ParseError> {
        let chars: Vec<char> = name.chars().collect();
        let mut resolved = Vec::with_capacity(chars.len());
        for c in &chars {
            match self.tree.find_argument(state.command, &c.to_string()) {
                Some((owner, ArgumentLookup::Option(index))) => resolved.push((owner, index)),
                _ => {
                    if is_negative_number(token.raw_value()) {
                        return self.parse_operand(state, token);
                    }
                    return Err(ParseError::UnrecognizedOption {
                        command: state.command,
                        token: token.clone(),
                    });
                }
            }
        }

        let last = resolved.len() - 1;
        for (i, (owner, index)) in resolved.iter().enumerate() {
            let option = self.tree.option(*owner, *index);
            if i < last && !option.is_flag() {
                // A non-flag option can only appear last in a club.
                return Err(ParseError::ExpectedFlag {
                    command: state.command,
                    option: option.name(),
                    token: token.clone(),
                });
            }
        }

        for (owner, index) in &resolved[..last] {
            self.tree
                .option_mut(*owner, *index)
                .push_input(InputValue::new("true", InputSource::Argv));
        }

        let (owner, index) = resolved[last];
        let single = Token::option(
            format!("-{}", chars[last]),
            OptionTokenMeta::new(OptionPrefix::Short, chars[last].to_string()),
        )
        .derived_from(token);
        self.apply_option(state, owner, index, &single, assigned)
    }

    fn apply_option(
        &mut self,
        state: &mut ParseState,
        owner: CommandId,
        index: usize,
        token: &Token,
        assigned: Option<String>,
    ) -> Result<(), ParseError> {
        let option = self.tree.option(owner, index);
        let name = option.name();

        if option.is_flag() {
            if let Some(value) = assigned {
                return Err(ParseError::UnexpectedOptionValue {
                    command: state.command,
                    option: name,
                    value,
                    token: token.clone(),
                });
            }
            trace!(option = %name, "flag set");
            self.tree
                .option_mut(owner, index)
                .push_input(InputValue::new("true", InputSource::Argv));
            return Ok(());
        }

        if let Some(value) = assigned {
            if !option.allows(&value) {
                return Err(ParseError::NotAllowedValue {
                    command: state.command,
                    argument: name,
                    token: Token::plain(value).derived_from(token),
                    allowed: option.get_allowed_values().to_vec(),
                });
            }
            self.tree
                .option_mut(owner, index)
                .push_input(InputValue::new(value, InputSource::Argv));
            state.subcommands_allowed = false;
            return Ok(());
        }

        state.expected = Some(ExpectedOption {
            owner,
            index,
            name,
            token: token.clone(),
        });
        Ok(())
    }

    fn parse_operand(&mut self, state: &mut ParseState, token: &Token) -> Result<(), ParseError> {
        let next = state.operand_queue.pop_front().or(state.list_operand);

        let Some(index) = next else {
            let ignore = self.tree.effective_ignore_unexpected_operands(
                state.command,
                self.settings.ignore_unexpected_operands,
            );
            if ignore {
                debug!(command = %self.tree.full_path(state.command), "collecting unexpected operands");
                state.ignore_remaining = true;
                state.remaining_operands.push(token.clone());
                return Ok(());
            }
            return Err(ParseError::UnrecognizedArgument {
                command: state.command,
                token: token.clone(),
                suggestion: None,
            });
        };

        let operand = self.tree.operand(state.command, index);
        if operand.get_arity().allows_many() {
            // The trailing list operand is dequeued repeatedly.
            state.list_operand = Some(index);
        }

        // A negative-number token that fell through to operands must bind its
        // full raw text.
        let text = if token.kind() == TokenKind::Option {
            token.raw_value()
        } else {
            token.value()
        };

        if !operand.allows(text) {
            return Err(ParseError::NotAllowedValue {
                command: state.command,
                argument: operand.name().to_string(),
                token: token.clone(),
                allowed: operand.get_allowed_values().to_vec(),
            });
        }

        self.tree
            .operand_mut(state.command, index)
            .push_input(InputValue::new(text, InputSource::Argv));
        state.subcommands_allowed = false;
        Ok(())
    }
}

fn origin(token: &Token) -> Token {
    token.source().cloned().unwrap_or_else(|| token.clone())
}

fn is_negative_number(raw: &str) -> bool {
    raw.starts_with('-') && raw.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::{CommandOption, Operand, TypeKind};
    use crate::command::Command;
    use crate::tokenizer::{apply_transformations, tokenize};

    fn parse(tree: &mut CommandTree, args: &[&str]) -> ParseResult {
        parse_with(tree, &ParserSettings::default(), args)
    }

    fn parse_with(tree: &mut CommandTree, settings: &ParserSettings, args: &[&str]) -> ParseResult {
        let tokens = apply_transformations(tokenize(args, false), &[]);
        CommandParser::parse(tree, settings, &tokens)
    }

    fn inputs<'t>(tree: &'t CommandTree, id: CommandId, alias: &str) -> Vec<&'t str> {
        match tree.find_argument(id, alias) {
            Some((owner, ArgumentLookup::Option(i))) => tree
                .option(owner, i)
                .input_values()
                .iter()
                .map(|v| v.text.as_str())
                .collect(),
            Some((owner, ArgumentLookup::Operand(i))) => tree
                .operand(owner, i)
                .input_values()
                .iter()
                .map(|v| v.text.as_str())
                .collect(),
            _ => panic!("no argument '{alias}'"),
        }
    }

    fn basic_tree() -> CommandTree {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_option(root, CommandOption::named("opt1")).unwrap();
        tree.add_option(root, CommandOption::named("verbose").short('v').flag())
            .unwrap();
        tree.add_option(root, CommandOption::named("all").short('a').flag())
            .unwrap();
        tree.add_option(root, CommandOption::named("brief").short('b').flag())
            .unwrap();
        tree.add_operand(root, Operand::new("arg1")).unwrap();
        tree
    }

    #[test]
    fn test_option_value_then_operand() {
        let mut tree = basic_tree();
        let result = parse(&mut tree, &["--opt1", "value", "arg1"]);
        assert!(result.is_success());
        assert_eq!(inputs(&tree, result.target_command(), "opt1"), vec!["value"]);
        assert_eq!(inputs(&tree, result.target_command(), "arg1"), vec!["arg1"]);
    }

    #[test]
    fn test_inline_assignment_binds_immediately() {
        let mut tree = basic_tree();
        let result = parse(&mut tree, &["--opt1=5"]);
        assert!(result.is_success());
        assert_eq!(inputs(&tree, result.target_command(), "opt1"), vec!["5"]);
    }

    #[test]
    fn test_clubbed_flags_all_set() {
        let mut tree = basic_tree();
        let result = parse(&mut tree, &["-ab"]);
        assert!(result.is_success());
        assert_eq!(inputs(&tree, result.target_command(), "a"), vec!["true"]);
        assert_eq!(inputs(&tree, result.target_command(), "b"), vec!["true"]);
    }

    #[test]
    fn test_clubbed_trailing_non_flag_takes_assignment() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_option(root, CommandOption::named("all").short('a').flag())
            .unwrap();
        tree.add_option(root, CommandOption::named("out").short('o'))
            .unwrap();

        let result = parse(&mut tree, &["-ao=file.txt"]);
        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(inputs(&tree, root, "a"), vec!["true"]);
        assert_eq!(inputs(&tree, root, "o"), vec!["file.txt"]);

        // Next-token form as well.
        let mut tree2 = tree.clone();
        let result = parse(&mut tree2, &["-ao", "other.txt"]);
        assert!(result.is_success());
        assert_eq!(inputs(&tree2, root, "o"), vec!["file.txt", "other.txt"]);
    }

    #[test]
    fn test_clubbed_non_flag_in_non_final_position_is_expected_flag() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_option(root, CommandOption::named("out").short('o'))
            .unwrap();
        tree.add_option(root, CommandOption::named("all").short('a').flag())
            .unwrap();

        // Expanded club: `-oa` becomes `-o -a`; `-o` awaits a value and the
        // sibling from the same club arrives instead.
        let result = parse(&mut tree, &["-oa"]);
        match result.error() {
            Some(ParseError::ExpectedFlag { option, token, .. }) => {
                assert_eq!(option, "out");
                assert_eq!(token.raw_value(), "-oa");
            }
            other => panic!("expected ExpectedFlag, got {other:?}"),
        }

        // Unexpanded club with assignment takes the in-parser branch.
        let mut tree2 = tree.clone();
        let result = parse(&mut tree2, &["-oa=x"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::ExpectedFlag { option, .. }) if option == "out"
        ));
    }

    #[test]
    fn test_unresolvable_club_is_unrecognized_option() {
        let mut tree = basic_tree();
        let result = parse(&mut tree, &["-ax"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::UnrecognizedOption { token, .. }) if token.raw_value() == "-ax" || token.raw_value() == "-x"
        ));
    }

    #[test]
    fn test_long_option_requires_exact_match() {
        let mut tree = basic_tree();
        let result = parse(&mut tree, &["--verb"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::UnrecognizedOption { .. })
        ));
    }

    #[test]
    fn test_missing_option_value_at_end_of_stream() {
        let mut tree = basic_tree();
        let result = parse(&mut tree, &["--opt1"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::MissingOptionValue { option, .. }) if option == "opt1"
        ));
    }

    #[test]
    fn test_missing_option_value_before_unrelated_option() {
        let mut tree = basic_tree();
        let result = parse(&mut tree, &["--opt1", "--verbose"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::MissingOptionValue { option, .. }) if option == "opt1"
        ));
    }

    #[test]
    fn test_flag_with_assignment_is_unexpected_option_value() {
        let mut tree = basic_tree();
        let result = parse(&mut tree, &["--verbose=yes"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::UnexpectedOptionValue { option, value, .. })
                if option == "verbose" && value == "yes"
        ));
    }

    #[test]
    fn test_negative_number_falls_through_to_operand() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_operand(root, Operand::new("delta").of_type(TypeKind::Int))
            .unwrap();
        let result = parse(&mut tree, &["-3"]);
        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(inputs(&tree, root, "delta"), vec!["-3"]);

        let mut tree2 = CommandTree::with_root_name("app");
        tree2
            .add_operand(tree2.root(), Operand::new("delta"))
            .unwrap();
        let result = parse(&mut tree2, &["-3.5"]);
        assert!(result.is_success());
    }

    #[test]
    fn test_unrecognized_short_option_is_not_an_operand() {
        let mut tree = CommandTree::with_root_name("app");
        tree.add_operand(tree.root(), Operand::new("arg")).unwrap();
        let result = parse(&mut tree, &["-x"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::UnrecognizedOption { .. })
        ));
    }

    #[test]
    fn test_subcommand_descent_reseeds_operands() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_operand(root, Operand::new("root_arg")).unwrap();
        let sub = tree.add_subcommand(root, Command::new("do")).unwrap();
        tree.add_operand(sub, Operand::new("sub_arg")).unwrap();

        let result = parse(&mut tree, &["do", "value"]);
        assert!(result.is_success());
        assert_eq!(result.target_command(), sub);
        assert_eq!(inputs(&tree, sub, "sub_arg"), vec!["value"]);
        assert!(tree.operand(root, 0).input_values().is_empty());
    }

    #[test]
    fn test_subcommands_close_after_an_operand_is_consumed() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_operand(root, Operand::new("args").list()).unwrap();
        tree.add_subcommand(root, Command::new("do")).unwrap();

        let result = parse(&mut tree, &["value", "do"]);
        assert!(result.is_success());
        assert_eq!(result.target_command(), root);
        assert_eq!(inputs(&tree, root, "args"), vec!["value", "do"]);
    }

    #[test]
    fn test_flags_leave_the_subcommand_window_open() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_option(root, CommandOption::named("verbose").flag().interceptor())
            .unwrap();
        let sub = tree.add_subcommand(root, Command::new("do")).unwrap();

        let result = parse(&mut tree, &["--verbose", "do"]);
        assert!(result.is_success());
        assert_eq!(result.target_command(), sub);
        assert_eq!(inputs(&tree, sub, "verbose"), vec!["true"]);
    }

    #[test]
    fn test_option_value_closes_the_subcommand_window() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_option(root, CommandOption::named("opt").interceptor())
            .unwrap();
        tree.add_subcommand(root, Command::new("do")).unwrap();

        let result = parse(&mut tree, &["--opt", "x", "do"]);
        // `do` can no longer be a subcommand and the root has no operands.
        assert!(matches!(
            result.error(),
            Some(ParseError::UnrecognizedArgument { token, .. }) if token.raw_value() == "do"
        ));
    }

    #[test]
    fn test_interceptor_option_resolves_after_descent() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_option(
            root,
            CommandOption::named("dry-run").flag().interceptor(),
        )
        .unwrap();
        let sub = tree.add_subcommand(root, Command::new("deploy")).unwrap();

        let result = parse(&mut tree, &["deploy", "--dry-run"]);
        assert!(result.is_success());
        assert_eq!(result.target_command(), sub);
        assert_eq!(inputs(&tree, sub, "dry-run"), vec!["true"]);
    }

    #[test]
    fn test_option_prefixed_subcommand_suggests_the_command_form() {
        let mut tree = CommandTree::with_root_name("app");
        tree.add_subcommand(tree.root(), Command::new("do")).unwrap();

        let result = parse(&mut tree, &["--do"]);
        match result.error() {
            Some(ParseError::UnrecognizedArgument { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("did you mean 'app do'?"));
            }
            other => panic!("expected UnrecognizedArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_not_allowed_values() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_option(
            root,
            CommandOption::named("mode").allowed_values(["fast", "slow"]),
        )
        .unwrap();
        tree.add_operand(root, Operand::new("kind").allowed_values(["x", "y"]))
            .unwrap();

        let result = parse(&mut tree.clone(), &["--mode", "medium"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::NotAllowedValue { argument, .. }) if argument == "mode"
        ));

        let result = parse(&mut tree.clone(), &["--mode=medium"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::NotAllowedValue { argument, .. }) if argument == "mode"
        ));

        let result = parse(&mut tree, &["--mode", "fast", "z"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::NotAllowedValue { argument, .. }) if argument == "kind"
        ));
    }

    #[test]
    fn test_unexpected_operand_fails_without_ignore() {
        let mut tree = CommandTree::with_root_name("app");
        let result = parse(&mut tree, &["stray"]);
        assert!(matches!(
            result.error(),
            Some(ParseError::UnrecognizedArgument { token, .. }) if token.raw_value() == "stray"
        ));
    }

    #[test]
    fn test_ignore_unexpected_operands_collects_everything_verbatim() {
        let mut tree = CommandTree::new(
            Command::new("app").ignore_unexpected_operands(true),
        );
        let root = tree.root();
        tree.add_option(root, CommandOption::named("verbose").flag())
            .unwrap();

        let result = parse(&mut tree, &["stray", "--verbose", "-x", "more"]);
        assert!(result.is_success());
        let remaining: Vec<&str> = result
            .remaining_operands()
            .iter()
            .map(|t| t.raw_value())
            .collect();
        assert_eq!(remaining, vec!["stray", "--verbose", "-x", "more"]);
        // The flag after the switch was not interpreted.
        assert!(tree.option(root, 0).input_values().is_empty());
    }

    #[test]
    fn test_app_level_ignore_default_applies() {
        let mut tree = CommandTree::with_root_name("app");
        let settings = ParserSettings {
            ignore_unexpected_operands: true,
            ..ParserSettings::default()
        };
        let result = parse_with(&mut tree, &settings, &["stray"]);
        assert!(result.is_success());
        assert_eq!(result.remaining_operands().len(), 1);
    }

    #[test]
    fn test_separator_pass_thru_leaves_separated_untouched() {
        let mut tree = CommandTree::new(
            Command::new("app").separator_strategy(ArgumentSeparatorStrategy::PassThru),
        );
        tree.add_operand(tree.root(), Operand::new("args").list())
            .unwrap();

        let result = parse(&mut tree, &["--", "x", "y"]);
        assert!(result.is_success());
        let separated: Vec<&str> = result
            .separated_arguments()
            .iter()
            .map(|t| t.raw_value())
            .collect();
        assert_eq!(separated, vec!["x", "y"]);
        assert!(tree.operand(tree.root(), 0).input_values().is_empty());
    }

    #[test]
    fn test_separator_end_of_options_additionally_binds_operands() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_operand(root, Operand::new("args").list()).unwrap();

        let result = parse(&mut tree, &["a", "--", "-x", "y"]);
        assert!(result.is_success());
        // Separated tokens are replayed as plain operands and also remain in
        // the separated partition.
        assert_eq!(inputs(&tree, root, "args"), vec!["a", "-x", "y"]);
        assert_eq!(result.separated_arguments().len(), 2);
    }

    #[test]
    fn test_list_operand_is_sticky() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_operand(root, Operand::new("first")).unwrap();
        tree.add_operand(root, Operand::new("rest").list()).unwrap();

        let result = parse(&mut tree, &["one", "two", "three", "four"]);
        assert!(result.is_success());
        assert_eq!(inputs(&tree, root, "first"), vec!["one"]);
        assert_eq!(inputs(&tree, root, "rest"), vec!["two", "three", "four"]);
    }

    #[test]
    fn test_deepest_command_is_retained_on_error() {
        let mut tree = CommandTree::with_root_name("app");
        let sub = tree.add_subcommand(tree.root(), Command::new("do")).unwrap();

        let result = parse(&mut tree, &["do", "--nope"]);
        assert_eq!(result.target_command(), sub);
        assert!(matches!(
            result.error(),
            Some(ParseError::UnrecognizedOption { command, .. }) if *command == sub
        ));
    }

    #[test]
    fn test_slash_options_resolve_when_enabled() {
        let mut tree = CommandTree::with_root_name("app");
        let root = tree.root();
        tree.add_option(root, CommandOption::named("mode")).unwrap();
        tree.add_operand(root, Operand::new("path")).unwrap();

        let settings = ParserSettings {
            allow_slash_options: true,
            ..ParserSettings::default()
        };
        let result = parse_with(&mut tree, &settings, &["/mode:fast", "/usr/bin"]);
        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(inputs(&tree, root, "mode"), vec!["fast"]);
        // Unresolved slash tokens stay operands.
        assert_eq!(inputs(&tree, root, "path"), vec!["/usr/bin"]);
    }

    #[test]
    fn test_slash_options_disabled_by_default() {
        let mut tree = CommandTree::with_root_name("app");
        tree.add_operand(tree.root(), Operand::new("path")).unwrap();
        let result = parse(&mut tree, &["/mode:fast"]);
        assert!(result.is_success());
        assert_eq!(inputs(&tree, tree.root(), "path"), vec!["/mode:fast"]);
    }
}
