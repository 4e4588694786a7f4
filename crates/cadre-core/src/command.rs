//! The command tree: the static model of addressable commands.
//!
//! Commands form a tree built once during app configuration and treated as
//! read-only during a parse run, except for the input values and bound values
//! recorded on arguments. Ownership is kept acyclic by storing all commands in
//! an arena ([`CommandTree`]) and referencing parent/children by [`CommandId`]
//! index instead of back-pointers.
//!
//! Each command keeps an alias index mapping every name an option, operand,
//! or direct subcommand answers to onto its node, for O(1) resolution during
//! parsing. Alias uniqueness is enforced at registration; a duplicate raises a
//! [`ConfigError`] instead of silently overwriting.

use std::collections::HashMap;

use crate::argument::{CommandOption, Operand};
use crate::error::{ConfigError, ConfigResult};
use crate::settings::ArgumentSeparatorStrategy;

/// Index of a command in its [`CommandTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(usize);

impl CommandId {
    /// The root command's id.
    pub const fn root() -> Self {
        Self(0)
    }

    fn index(self) -> usize {
        self.0
    }
}

/// What an alias resolves to within a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentLookup {
    Subcommand(CommandId),
    /// Index into the command's option list.
    Option(usize),
    /// Index into the command's operand list.
    Operand(usize),
}

/// One node of the command tree.
///
/// Create with [`Command::new`] and the builder methods, then attach to a
/// [`CommandTree`]; relationship fields are managed by the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    usage: Option<String>,
    extended_help: Option<String>,
    is_executable: bool,
    ignore_unexpected_operands: Option<bool>,
    separator_strategy: Option<ArgumentSeparatorStrategy>,
    parent: Option<CommandId>,
    children: Vec<CommandId>,
    options: Vec<CommandOption>,
    operands: Vec<Operand>,
    lookup: HashMap<String, ArgumentLookup>,
}

impl Command {
    /// Creates an executable command with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            usage: None,
            extended_help: None,
            is_executable: true,
            ignore_unexpected_operands: None,
            separator_strategy: None,
            parent: None,
            children: Vec::new(),
            options: Vec::new(),
            operands: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn extended_help(mut self, extended_help: impl Into<String>) -> Self {
        self.extended_help = Some(extended_help.into());
        self
    }

    /// Non-executable commands exist only to group subcommands; invoking one
    /// directly is a user error.
    pub fn executable(mut self, is_executable: bool) -> Self {
        self.is_executable = is_executable;
        self
    }

    /// Command-level override of the app-wide default.
    pub fn ignore_unexpected_operands(mut self, ignore: bool) -> Self {
        self.ignore_unexpected_operands = Some(ignore);
        self
    }

    /// Command-level override of the app-wide separator strategy.
    pub fn separator_strategy(mut self, strategy: ArgumentSeparatorStrategy) -> Self {
        self.separator_strategy = Some(strategy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command_aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn usage_text(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn extended_help_text(&self) -> Option<&str> {
        self.extended_help.as_deref()
    }

    pub fn is_executable(&self) -> bool {
        self.is_executable
    }

    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    pub fn children(&self) -> &[CommandId] {
        &self.children
    }

    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Resolves an alias within this command only.
    pub fn find_local(&self, alias: &str) -> Option<ArgumentLookup> {
        self.lookup.get(alias).copied()
    }

    fn register_alias(&mut self, alias: String, target: ArgumentLookup) -> ConfigResult<()> {
        if self.lookup.contains_key(&alias) {
            return Err(ConfigError::DuplicateAlias {
                command: self.name.clone(),
                alias,
            });
        }
        self.lookup.insert(alias, target);
        Ok(())
    }
}

/// The arena holding every command of an application.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTree {
    commands: Vec<Command>,
}

impl CommandTree {
    /// Creates a tree with the given root command.
    pub fn new(root: Command) -> Self {
        Self {
            commands: vec![root],
        }
    }

    /// Convenience constructor for a tree rooted at a bare named command.
    pub fn with_root_name(name: impl Into<String>) -> Self {
        Self::new(Command::new(name))
    }

    pub fn root(&self) -> CommandId {
        CommandId::root()
    }

    pub fn get(&self, id: CommandId) -> &Command {
        &self.commands[id.index()]
    }

    pub fn get_mut(&mut self, id: CommandId) -> &mut Command {
        &mut self.commands[id.index()]
    }

    pub fn option(&self, id: CommandId, index: usize) -> &CommandOption {
        &self.get(id).options[index]
    }

    pub fn option_mut(&mut self, id: CommandId, index: usize) -> &mut CommandOption {
        &mut self.get_mut(id).options[index]
    }

    pub fn operand(&self, id: CommandId, index: usize) -> &Operand {
        &self.get(id).operands[index]
    }

    pub fn operand_mut(&mut self, id: CommandId, index: usize) -> &mut Operand {
        &mut self.get_mut(id).operands[index]
    }

    /// Attaches `child` under `parent`, registering its name and aliases in
    /// the parent's alias index.
    pub fn add_subcommand(&mut self, parent: CommandId, child: Command) -> ConfigResult<CommandId> {
        let id = CommandId(self.commands.len());

        let mut names = vec![child.name.clone()];
        names.extend(child.aliases.iter().cloned());

        let parent_node = self.get_mut(parent);
        for name in names {
            parent_node.register_alias(name, ArgumentLookup::Subcommand(id))?;
        }
        parent_node.children.push(id);

        let mut child = child;
        child.parent = Some(parent);
        self.commands.push(child);
        Ok(id)
    }

    /// Registers an option on a command, validating its definition and
    /// indexing all of its aliases.
    pub fn add_option(&mut self, id: CommandId, option: CommandOption) -> ConfigResult<()> {
        let command_name = self.get(id).name.clone();

        let aliases = option.aliases();
        if aliases.is_empty() {
            return Err(ConfigError::UnnamedOption {
                command: command_name,
            });
        }
        if option.is_interceptor() && option.assigns_to_executable_subcommands() {
            return Err(ConfigError::ConflictingOptionScope {
                command: command_name,
                option: option.name(),
            });
        }

        let node = self.get_mut(id);
        let index = node.options.len();
        for alias in aliases {
            node.register_alias(alias, ArgumentLookup::Option(index))?;
        }
        node.options.push(option);
        Ok(())
    }

    /// Registers an operand on a command. Only the last operand may accept
    /// multiple values, so adding anything after a list operand fails.
    pub fn add_operand(&mut self, id: CommandId, operand: Operand) -> ConfigResult<()> {
        let node = self.get(id);
        if let Some(list) = node.operands.iter().find(|o| o.get_arity().allows_many()) {
            return Err(ConfigError::OperandAfterListOperand {
                command: node.name.clone(),
                operand: operand.name().to_string(),
                list_operand: list.name().to_string(),
            });
        }

        let node = self.get_mut(id);
        let index = node.operands.len();
        node.register_alias(operand.name().to_string(), ArgumentLookup::Operand(index))?;
        node.operands.push(operand);
        Ok(())
    }

    /// Resolves an alias at `current`, falling back to ancestor options that
    /// stay in scope after descent (interceptor options and options assigned
    /// to executable subcommands). Ancestor subcommands and operands are
    /// never inherited.
    pub fn find_argument(
        &self,
        current: CommandId,
        alias: &str,
    ) -> Option<(CommandId, ArgumentLookup)> {
        if let Some(found) = self.get(current).find_local(alias) {
            return Some((current, found));
        }

        let mut ancestor = self.get(current).parent;
        while let Some(id) = ancestor {
            if let Some(ArgumentLookup::Option(index)) = self.get(id).find_local(alias) {
                let option = self.option(id, index);
                if option.is_interceptor() || option.assigns_to_executable_subcommands() {
                    return Some((id, ArgumentLookup::Option(index)));
                }
            }
            ancestor = self.get(id).parent;
        }
        None
    }

    /// Resolves a direct subcommand of `current` by any of its aliases.
    pub fn find_subcommand(&self, current: CommandId, alias: &str) -> Option<CommandId> {
        match self.get(current).find_local(alias) {
            Some(ArgumentLookup::Subcommand(id)) => Some(id),
            _ => None,
        }
    }

    /// The ids from the root down to `id`, inclusive.
    pub fn path_to(&self, id: CommandId) -> Vec<CommandId> {
        let mut path = vec![id];
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.get(parent).parent;
        }
        path.reverse();
        path
    }

    /// The space-joined command path, e.g. `"app remote add"`.
    pub fn full_path(&self, id: CommandId) -> String {
        self.path_to(id)
            .into_iter()
            .map(|c| self.get(c).name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The effective `ignore_unexpected_operands` for a command: the nearest
    /// override on the command or an ancestor, else `app_default`.
    pub fn effective_ignore_unexpected_operands(
        &self,
        id: CommandId,
        app_default: bool,
    ) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if let Some(value) = self.get(c).ignore_unexpected_operands {
                return value;
            }
            current = self.get(c).parent;
        }
        app_default
    }

    /// The effective separator strategy for a command.
    pub fn effective_separator_strategy(
        &self,
        id: CommandId,
        app_default: ArgumentSeparatorStrategy,
    ) -> ArgumentSeparatorStrategy {
        let mut current = Some(id);
        while let Some(c) = current {
            if let Some(value) = self.get(c).separator_strategy {
                return value;
            }
            current = self.get(c).parent;
        }
        app_default
    }
}

/// Abstraction over command-tree construction.
///
/// The parser and pipeline depend only on the resulting plain tree; how it is
/// produced (a fluent builder, a declarative description, generated code) is
/// up to the provider.
pub trait CommandTreeProvider {
    fn command_tree(&self) -> ConfigResult<CommandTree>;
}

impl CommandTreeProvider for CommandTree {
    fn command_tree(&self) -> ConfigResult<CommandTree> {
        Ok(self.clone())
    }
}

impl<F> CommandTreeProvider for F
where
    F: Fn() -> ConfigResult<CommandTree>,
{
    fn command_tree(&self) -> ConfigResult<CommandTree> {
        self()
    }
}
