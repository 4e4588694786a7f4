//! The typed value assigned to an argument after binding.
//!
//! Raw command-line input is always strings; the value binder converts them
//! into an [`ArgumentValue`] according to the argument's
//! [`TypeKind`](crate::argument::TypeKind). A tagged variant keeps the core
//! free of `Any`-style dynamic boxing while staying open to custom types
//! (custom parsers produce whichever variant fits, usually `String`).

/// A typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A collection value for list-arity arguments.
    List(Vec<ArgumentValue>),
}

impl ArgumentValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgumentValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgumentValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgumentValue::Float(v) => Some(*v),
            ArgumentValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ArgumentValue]> {
        match self {
            ArgumentValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Collects a list value's elements as strings; scalar strings yield a
    /// single-element vector.
    pub fn to_string_vec(&self) -> Option<Vec<String>> {
        match self {
            ArgumentValue::String(v) => Some(vec![v.clone()]),
            ArgumentValue::List(items) => items
                .iter()
                .map(|i| i.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentValue::Bool(v) => write!(f, "{v}"),
            ArgumentValue::Int(v) => write!(f, "{v}"),
            ArgumentValue::Float(v) => write!(f, "{v}"),
            ArgumentValue::String(v) => f.write_str(v),
            ArgumentValue::List(items) => {
                let mut first = true;
                for item in items {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
