//! Operands and options: the arguments a command accepts.
//!
//! Both argument kinds share the same shape — a type descriptor, an arity, a
//! default, optional allowed values, and the raw [`InputValue`]s accumulated
//! during parsing — and differ in how they are addressed: operands
//! positionally, options by name.

use crate::value::ArgumentValue;

/// How many values an argument accepts.
///
/// `max == 0` marks a flag (options only); `max > 1` marks a list argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    min: usize,
    max: usize,
}

impl Arity {
    /// No value at all: a flag.
    pub const fn zero() -> Self {
        Self { min: 0, max: 0 }
    }

    pub const fn exactly_one() -> Self {
        Self { min: 1, max: 1 }
    }

    pub const fn zero_or_one() -> Self {
        Self { min: 0, max: 1 }
    }

    pub const fn zero_or_more() -> Self {
        Self {
            min: 0,
            max: usize::MAX,
        }
    }

    pub const fn one_or_more() -> Self {
        Self {
            min: 1,
            max: usize::MAX,
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// `true` for list-arity arguments.
    pub fn allows_many(&self) -> bool {
        self.max > 1
    }

    /// `true` when the argument takes no value.
    pub fn is_zero(&self) -> bool {
        self.max == 0
    }
}

/// The type descriptor keying the value-parser registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    Int,
    Float,
    String,
    /// A custom type resolved by the name it was registered under.
    Custom(String),
}

impl TypeKind {
    pub fn name(&self) -> &str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Int => "int",
            TypeKind::Float => "float",
            TypeKind::String => "string",
            TypeKind::Custom(name) => name,
        }
    }
}

/// Where a raw input value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// The command line itself.
    Argv,
    /// A line of redirected stdin.
    Piped,
    /// An environment-variable default source.
    EnvVar,
    /// An app-setting default source.
    AppSetting,
}

/// One raw string input recorded against an argument during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValue {
    pub text: String,
    pub source: InputSource,
}

impl InputValue {
    pub fn new(text: impl Into<String>, source: InputSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// A default applied when an argument received no input.
///
/// Raw defaults are re-parsed exactly like user input, so they are subject to
/// the same type validation; typed defaults are assigned directly with a
/// best-effort coercion fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Typed(ArgumentValue),
    Raw(String),
    RawList(Vec<String>),
}

// =============================================================================
// Operand
// =============================================================================

/// A positional argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    name: String,
    description: Option<String>,
    type_kind: TypeKind,
    arity: Arity,
    default: Option<DefaultValue>,
    allowed_values: Vec<String>,
    input_values: Vec<InputValue>,
    value: Option<ArgumentValue>,
}

impl Operand {
    /// Creates a scalar string operand. Adjust with the builder methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            type_kind: TypeKind::String,
            arity: Arity::exactly_one(),
            default: None,
            allowed_values: Vec::new(),
            input_values: Vec::new(),
            value: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn of_type(mut self, type_kind: TypeKind) -> Self {
        self.type_kind = type_kind;
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// Marks this operand as accepting any number of values. Only the last
    /// operand of a command may be a list operand.
    pub fn list(mut self) -> Self {
        self.arity = Arity::zero_or_more();
        self
    }

    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn type_kind(&self) -> &TypeKind {
        &self.type_kind
    }

    pub fn get_arity(&self) -> Arity {
        self.arity
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn get_allowed_values(&self) -> &[String] {
        &self.allowed_values
    }

    pub fn allows(&self, value: &str) -> bool {
        self.allowed_values.is_empty() || self.allowed_values.iter().any(|v| v == value)
    }

    pub fn input_values(&self) -> &[InputValue] {
        &self.input_values
    }

    pub fn push_input(&mut self, input: InputValue) {
        self.input_values.push(input);
    }

    /// The typed value, present once binding has run.
    pub fn value(&self) -> Option<&ArgumentValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<ArgumentValue>) {
        self.value = value;
    }
}

// =============================================================================
// CommandOption
// =============================================================================

/// A named argument (`--name`, `-n`).
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    long_name: Option<String>,
    short_name: Option<char>,
    extra_aliases: Vec<String>,
    description: Option<String>,
    type_kind: TypeKind,
    arity: Arity,
    is_interceptor: bool,
    assign_to_executable_subcommands: bool,
    default: Option<DefaultValue>,
    allowed_values: Vec<String>,
    input_values: Vec<InputValue>,
    value: Option<ArgumentValue>,
}

impl CommandOption {
    /// Creates a nameless option; set at least one of
    /// [`long`](Self::long) / [`short`](Self::short) before registration.
    pub fn new() -> Self {
        Self {
            long_name: None,
            short_name: None,
            extra_aliases: Vec::new(),
            description: None,
            type_kind: TypeKind::String,
            arity: Arity::exactly_one(),
            is_interceptor: false,
            assign_to_executable_subcommands: false,
            default: None,
            allowed_values: Vec::new(),
            input_values: Vec::new(),
            value: None,
        }
    }

    /// Convenience constructor for a long-named option.
    pub fn named(long_name: impl Into<String>) -> Self {
        Self::new().long(long_name)
    }

    pub fn long(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    pub fn short(mut self, short_name: char) -> Self {
        self.short_name = Some(short_name);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.extra_aliases.push(alias.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn of_type(mut self, type_kind: TypeKind) -> Self {
        self.type_kind = type_kind;
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// Makes this option a boolean flag: arity zero, `bool` typed.
    pub fn flag(mut self) -> Self {
        self.arity = Arity::zero();
        self.type_kind = TypeKind::Bool;
        self
    }

    /// Scopes this option to the command it is defined on, while keeping it
    /// resolvable after descent into subcommands.
    pub fn interceptor(mut self) -> Self {
        self.is_interceptor = true;
        self
    }

    /// Propagates this option to descendant executable commands.
    pub fn assign_to_executable_subcommands(mut self) -> Self {
        self.assign_to_executable_subcommands = true;
        self
    }

    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    /// The display name: the long name when present, otherwise the short.
    pub fn name(&self) -> String {
        match (&self.long_name, self.short_name) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => String::new(),
        }
    }

    /// All names this option answers to.
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases = Vec::new();
        if let Some(long) = &self.long_name {
            aliases.push(long.clone());
        }
        if let Some(short) = self.short_name {
            aliases.push(short.to_string());
        }
        aliases.extend(self.extra_aliases.iter().cloned());
        aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn type_kind(&self) -> &TypeKind {
        &self.type_kind
    }

    pub fn get_arity(&self) -> Arity {
        self.arity
    }

    /// An arity-zero boolean option records `true` on sight and never awaits
    /// a value.
    pub fn is_flag(&self) -> bool {
        self.arity.is_zero() && self.type_kind == TypeKind::Bool
    }

    pub fn is_interceptor(&self) -> bool {
        self.is_interceptor
    }

    pub fn assigns_to_executable_subcommands(&self) -> bool {
        self.assign_to_executable_subcommands
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn get_allowed_values(&self) -> &[String] {
        &self.allowed_values
    }

    pub fn allows(&self, value: &str) -> bool {
        self.allowed_values.is_empty() || self.allowed_values.iter().any(|v| v == value)
    }

    pub fn input_values(&self) -> &[InputValue] {
        &self.input_values
    }

    pub fn push_input(&mut self, input: InputValue) {
        self.input_values.push(input);
    }

    pub fn value(&self) -> Option<&ArgumentValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<ArgumentValue>) {
        self.value = value;
    }
}

impl Default for CommandOption {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_is_zero_arity_bool() {
        let flag = CommandOption::named("verbose").short('v').flag();
        assert!(flag.is_flag());
        assert!(flag.get_arity().is_zero());
        assert_eq!(*flag.type_kind(), TypeKind::Bool);

        let not_flag = CommandOption::named("count").of_type(TypeKind::Int);
        assert!(!not_flag.is_flag());
    }

    #[test]
    fn test_aliases_cover_all_names() {
        let opt = CommandOption::named("output").short('o').alias("out");
        assert_eq!(opt.aliases(), vec!["output", "o", "out"]);
        assert_eq!(opt.name(), "output");
    }

    #[test]
    fn test_allowed_values() {
        let operand = Operand::new("mode").allowed_values(["fast", "slow"]);
        assert!(operand.allows("fast"));
        assert!(!operand.allows("medium"));

        let open = Operand::new("any");
        assert!(open.allows("anything"));
    }

    #[test]
    fn test_arity() {
        assert!(Arity::zero_or_more().allows_many());
        assert!(!Arity::exactly_one().allows_many());
        assert!(Arity::zero().is_zero());
        assert_eq!(Arity::one_or_more().min(), 1);
    }
}
