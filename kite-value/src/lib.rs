//! Runtime values of the kite interpreter.

pub mod builtins;
pub mod object;

pub use builtins::{Builtin, Builtins, NativeFn};
pub use object::Object;

use kite_parser::ast::Type;
use std::fmt;

/// A runtime value.
/// Values are never shared: every assignment, argument binding, property read and return clones them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Str(String),
    Object(Object),
    /// An object variable that has not been constructed yet. Holds the class name.
    Null(String),
}

impl Value {
    /// The value a property of type `ty` holds before anything is assigned to it.
    /// Returns `None` for `void`.
    pub fn default_for(ty: &Type) -> Option<Value> {
        Some(match ty {
            Type::Int => Value::Int(0),
            Type::Bool => Value::Bool(false),
            Type::String => Value::Str(String::new()),
            Type::Class(class) => Value::Null(class.clone()),
            Type::Void => return None,
        })
    }

    pub fn cast_to_int(&self) -> Option<i32> {
        match self {
            Self::Int(val) => Some(*val),
            _ => None,
        }
    }

    pub fn cast_to_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(val) => Some(*val),
            _ => None,
        }
    }

    /// The runtime type tag of this value.
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Bool(_) => Type::Bool,
            Value::Str(_) => Type::String,
            Value::Object(obj) => Type::Class(obj.class.clone()),
            Value::Null(class) => Type::Class(class.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(val) => write!(f, "{}", val),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Str(val) => write!(f, "{}", val),
            Value::Object(obj) => write!(f, "{}", obj),
            Value::Null(class) => write!(f, "<null {}>", class),
        }
    }
}
