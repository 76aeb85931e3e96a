use core::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{ast::FunctionDecl, environment::Environment};

// Value type that can be produced by expressions. Values that leave the
// crate are converted to [MintValue]
#[derive(Clone)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    String(Rc<str>),
    Closure(Closure),
    Unit,
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
            Self::Closure(_) => "function",
            Self::Unit => "nil",
        }
    }

    /// `nil`, `false` and the number zero are falsy, everything else is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Unit => false,
            Self::Boolean(value) => *value,
            Self::Number(number) => *number != 0.0,
            Self::String(_) | Self::Closure(_) => true,
        }
    }

    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Closure(a), Self::Closure(b)) => a.same_as(b),
            (Self::Unit, Self::Unit) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::String(value) => f.write_str(value),
            Self::Closure(closure) => write!(f, "{:?}", closure),
            Self::Unit => write!(f, "nil"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "{:?}", value),
            other => fmt::Display::fmt(other, f),
        }
    }
}

/// A function value bundled with the environment that was current when the
/// function expression was evaluated.
#[derive(Clone)]
pub struct Closure {
    pub(crate) declaration: Rc<FunctionDecl>,
    pub(crate) environment: Environment,
}

impl Closure {
    pub(crate) fn new(declaration: Rc<FunctionDecl>, environment: Environment) -> Self {
        Self {
            declaration,
            environment,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.declaration.name.as_deref()
    }

    pub fn arity(&self) -> usize {
        self.declaration.parameters.len()
    }

    // Two closures are the same function only if they come from the same
    // evaluation of the same definition
    fn same_as(&self, other: &Closure) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && self.environment.same_as(&other.environment)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "<fn {}>", name),
            None => write!(f, "<fn>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MintValue {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Function { function: String },
}

impl fmt::Display for MintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Number(number) => write!(f, "{}", number),
            Self::String(string) => f.write_str(string),
            Self::Function { function } if function.is_empty() => write!(f, "<fn>"),
            Self::Function { function } => write!(f, "<fn {}>", function),
        }
    }
}

impl From<&Value> for MintValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(number) => Self::Number(*number),
            Value::Boolean(value) => Self::Boolean(*value),
            Value::String(string) => Self::String(string.to_string()),
            Value::Closure(closure) => Self::Function {
                function: closure.name().unwrap_or_default().to_owned(),
            },
            Value::Unit => Self::Nil,
        }
    }
}

impl From<Value> for MintValue {
    fn from(value: Value) -> Self {
        (&value).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Unit.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::String("".into()).is_truthy());
    }

    #[test]
    fn display_matches_print_output() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::String("hi".into()).to_string(), "hi");
        assert_eq!(Value::Unit.to_string(), "nil");
        assert_eq!(MintValue::Function { function: String::new() }.to_string(), "<fn>");
    }

    #[test]
    fn equality_between_kinds() {
        assert!(Value::Unit.equals(&Value::Unit));
        assert!(!Value::Number(0.0).equals(&Value::Boolean(false)));
        assert!(Value::String("a".into()).equals(&Value::String("a".into())));
    }

    #[test]
    fn mint_value_json_shape() -> anyhow::Result<()> {
        let values: Vec<MintValue> = serde_json::from_str(r#"[null, true, 3, "x", {"function": "counter"}]"#)?;
        assert_eq!(values, vec![
            MintValue::Nil,
            MintValue::Boolean(true),
            MintValue::Number(3.0),
            MintValue::String("x".to_owned()),
            MintValue::Function { function: "counter".to_owned() },
        ]);
        Ok(())
    }
}
