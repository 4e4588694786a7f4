//! The value binder: raw string inputs → typed [`ArgumentValue`]s.
//!
//! After a successful parse, every option and operand on the path from the
//! root to the target command is bound: its accumulated input values (or its
//! configured default when it received none) are converted with the parser
//! registered for its [`TypeKind`] and assigned as the argument's value.
//!
//! Raw-string defaults are re-parsed identically to user-entered values, so
//! they are subject to the same validation and error messages; typed defaults
//! are assigned directly, with a best-effort coercion fallback (an int
//! default satisfies a float-typed argument).
//!
//! Conversion failures are user-facing: they surface as a [`BindError`]
//! that the bind middleware renders on the console before short-circuiting
//! with the validation exit code. A missing parser for a registered type is a
//! configuration mistake and surfaces as a [`ConfigError`] instead.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

use cadre_core::{
    ArgumentValue, Arity, CommandId, CommandTree, ConfigError, DefaultValue, TypeKind,
};

/// Converts one raw string into a typed value.
pub trait TypeParser: Send + Sync {
    /// The human-readable type name used in error messages.
    fn type_name(&self) -> &str;

    /// Parses one value; the error is the reason text.
    fn parse(&self, raw: &str) -> Result<ArgumentValue, String>;
}

struct BoolParser;

impl TypeParser for BoolParser {
    fn type_name(&self) -> &str {
        "bool"
    }

    fn parse(&self, raw: &str) -> Result<ArgumentValue, String> {
        match raw {
            "true" | "True" | "1" => Ok(ArgumentValue::Bool(true)),
            "false" | "False" | "0" => Ok(ArgumentValue::Bool(false)),
            _ => Err(format!("'{raw}' is not a boolean")),
        }
    }
}

struct IntParser;

impl TypeParser for IntParser {
    fn type_name(&self) -> &str {
        "int"
    }

    fn parse(&self, raw: &str) -> Result<ArgumentValue, String> {
        raw.parse::<i64>()
            .map(ArgumentValue::Int)
            .map_err(|_| format!("'{raw}' is not an integer"))
    }
}

struct FloatParser;

impl TypeParser for FloatParser {
    fn type_name(&self) -> &str {
        "float"
    }

    fn parse(&self, raw: &str) -> Result<ArgumentValue, String> {
        raw.parse::<f64>()
            .map(ArgumentValue::Float)
            .map_err(|_| format!("'{raw}' is not a number"))
    }
}

struct StringParser;

impl TypeParser for StringParser {
    fn type_name(&self) -> &str {
        "string"
    }

    fn parse(&self, raw: &str) -> Result<ArgumentValue, String> {
        Ok(ArgumentValue::String(raw.to_string()))
    }
}

/// Maps [`TypeKind`]s to their parsers. The built-in kinds are registered by
/// default; custom kinds are the extensibility point.
#[derive(Clone)]
pub struct TypeParserRegistry {
    parsers: HashMap<TypeKind, Arc<dyn TypeParser>>,
}

impl TypeParserRegistry {
    pub fn new() -> Self {
        let mut parsers: HashMap<TypeKind, Arc<dyn TypeParser>> = HashMap::new();
        parsers.insert(TypeKind::Bool, Arc::new(BoolParser));
        parsers.insert(TypeKind::Int, Arc::new(IntParser));
        parsers.insert(TypeKind::Float, Arc::new(FloatParser));
        parsers.insert(TypeKind::String, Arc::new(StringParser));
        Self { parsers }
    }

    /// Registers (or replaces) the parser for a custom type name.
    pub fn register(&mut self, name: impl Into<String>, parser: Arc<dyn TypeParser>) {
        self.parsers.insert(TypeKind::Custom(name.into()), parser);
    }

    fn get(&self, kind: &TypeKind) -> Result<&Arc<dyn TypeParser>, ConfigError> {
        self.parsers.get(kind).ok_or_else(|| ConfigError::MissingTypeParser {
            type_name: kind.name().to_string(),
        })
    }
}

impl Default for TypeParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A user-facing value conversion failure.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid value for '{argument}': {reason}")]
pub struct BindError {
    pub argument: String,
    pub reason: String,
}

/// Why binding stopped.
#[derive(Debug, Error)]
pub enum BindFailure {
    /// User input failed type conversion; rendered on the console.
    #[error(transparent)]
    Invalid(#[from] BindError),

    /// A programming mistake (missing parser); escapes the pipeline.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Binds every option and operand on the path from the root to `target`.
pub fn bind_command(
    tree: &mut CommandTree,
    target: CommandId,
    registry: &TypeParserRegistry,
) -> Result<(), BindFailure> {
    for id in tree.path_to(target) {
        for index in 0..tree.get(id).options().len() {
            let option = tree.option(id, index);
            let name = option.name();
            let value = if option.is_flag() {
                bind_flag(!option.input_values().is_empty(), option.default())
            } else {
                bind_argument(
                    &name,
                    option.type_kind().clone(),
                    option.get_arity(),
                    option.default().cloned(),
                    option.input_values().iter().map(|v| v.text.clone()).collect(),
                    registry,
                )?
            };
            trace!(argument = %name, ?value, "bound option");
            tree.option_mut(id, index).set_value(value);
        }

        for index in 0..tree.get(id).operands().len() {
            let operand = tree.operand(id, index);
            let name = operand.name().to_string();
            let value = bind_argument(
                &name,
                operand.type_kind().clone(),
                operand.get_arity(),
                operand.default().cloned(),
                operand.input_values().iter().map(|v| v.text.clone()).collect(),
                registry,
            )?;
            trace!(argument = %name, ?value, "bound operand");
            tree.operand_mut(id, index).set_value(value);
        }
    }
    Ok(())
}

fn bind_flag(seen: bool, default: Option<&DefaultValue>) -> Option<ArgumentValue> {
    if seen {
        Some(ArgumentValue::Bool(true))
    } else {
        match default {
            Some(DefaultValue::Typed(ArgumentValue::Bool(value))) => {
                Some(ArgumentValue::Bool(*value))
            }
            _ => Some(ArgumentValue::Bool(false)),
        }
    }
}

fn bind_argument(
    name: &str,
    kind: TypeKind,
    arity: Arity,
    default: Option<DefaultValue>,
    raws: Vec<String>,
    registry: &TypeParserRegistry,
) -> Result<Option<ArgumentValue>, BindFailure> {
    if raws.is_empty() {
        return bind_default(name, &kind, arity, default, registry);
    }

    let parser = registry.get(&kind)?;
    if arity.allows_many() {
        let mut items = Vec::with_capacity(raws.len());
        for raw in &raws {
            items.push(parse_one(name, parser.as_ref(), raw)?);
        }
        return Ok(Some(ArgumentValue::List(items)));
    }

    // Arity-aware parsing upstream should have prevented this.
    if raws.len() > 1 {
        return Err(BindError {
            argument: name.to_string(),
            reason: format!("expected a single value, got {}", raws.len()),
        }
        .into());
    }
    Ok(Some(parse_one(name, parser.as_ref(), &raws[0])?))
}

fn bind_default(
    name: &str,
    kind: &TypeKind,
    arity: Arity,
    default: Option<DefaultValue>,
    registry: &TypeParserRegistry,
) -> Result<Option<ArgumentValue>, BindFailure> {
    let Some(default) = default else {
        return Ok(None);
    };

    match default {
        // String defaults are re-parsed like user input.
        DefaultValue::Raw(raw) => {
            let parser = registry.get(kind)?;
            let value = parse_one(name, parser.as_ref(), &raw)?;
            if arity.allows_many() {
                Ok(Some(ArgumentValue::List(vec![value])))
            } else {
                Ok(Some(value))
            }
        }
        DefaultValue::RawList(raws) => {
            let parser = registry.get(kind)?;
            let mut items = Vec::with_capacity(raws.len());
            for raw in &raws {
                items.push(parse_one(name, parser.as_ref(), raw)?);
            }
            Ok(Some(ArgumentValue::List(items)))
        }
        DefaultValue::Typed(value) => Ok(Some(coerce(name, value, kind, registry)?)),
    }
}

/// Assigns a typed default, coercing when the variant does not match the
/// argument's kind: ints widen to floats, anything else is formatted and
/// re-parsed as a best effort.
fn coerce(
    name: &str,
    value: ArgumentValue,
    kind: &TypeKind,
    registry: &TypeParserRegistry,
) -> Result<ArgumentValue, BindFailure> {
    let matches_kind = matches!(
        (&value, kind),
        (ArgumentValue::Bool(_), TypeKind::Bool)
            | (ArgumentValue::Int(_), TypeKind::Int)
            | (ArgumentValue::Float(_), TypeKind::Float)
            | (ArgumentValue::String(_), TypeKind::String)
            | (ArgumentValue::List(_), _)
            | (_, TypeKind::Custom(_))
    );
    if matches_kind {
        return Ok(value);
    }
    if let (ArgumentValue::Int(i), TypeKind::Float) = (&value, kind) {
        return Ok(ArgumentValue::Float(*i as f64));
    }
    let parser = registry.get(kind)?;
    Ok(parse_one(name, parser.as_ref(), &value.to_string())?)
}

fn parse_one(name: &str, parser: &dyn TypeParser, raw: &str) -> Result<ArgumentValue, BindError> {
    parser.parse(raw).map_err(|reason| BindError {
        argument: name.to_string(),
        reason,
    })
}
