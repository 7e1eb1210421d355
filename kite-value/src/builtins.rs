//! Registry of native functions callable from kite programs.

use super::Value;
use kite_parser::ast::Type;
use std::io::{self, Write};

/// A native function. Receives its single argument and the program's output sink.
pub type NativeFn = fn(&Value, &mut dyn Write) -> io::Result<()>;

/// A `void` native function taking exactly one parameter.
#[derive(Clone)]
pub struct Builtin {
    pub ident: String,
    /// Type of the only parameter.
    pub param: Type,
    pub func: NativeFn,
}

impl Builtin {
    pub fn call(&self, arg: &Value, out: &mut dyn Write) -> io::Result<()> {
        (self.func)(arg, out)
    }
}

/// Builtin functions, in registration order.
#[derive(Clone, Default)]
pub struct Builtins {
    fns: Vec<Builtin>,
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a native function. A later registration with the same name replaces the earlier one.
    pub fn add_native_fn(&mut self, ident: &str, param: Type, func: NativeFn) {
        let builtin = Builtin {
            ident: ident.to_string(),
            param,
            func,
        };
        match self.fns.iter_mut().find(|f| f.ident == ident) {
            Some(existing) => *existing = builtin,
            None => self.fns.push(builtin),
        }
    }

    pub fn get(&self, ident: &str) -> Option<&Builtin> {
        self.fns.iter().find(|f| f.ident == ident)
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.get(ident).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.fns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(arg: &Value, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", arg)
    }

    fn shout(arg: &Value, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}!", arg)
    }

    #[test]
    fn test_lookup_and_call() {
        let mut builtins = Builtins::new();
        builtins.add_native_fn("Echo", Type::Int, echo);

        assert!(builtins.contains("Echo"));
        assert!(!builtins.contains("echo"));

        let mut out = Vec::new();
        let echo = builtins.get("Echo").unwrap();
        assert_eq!(echo.param, Type::Int);
        echo.call(&Value::Int(7), &mut out).unwrap();
        assert_eq!(out, b"7\n");
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut builtins = Builtins::new();
        builtins.add_native_fn("Echo", Type::Int, echo);
        builtins.add_native_fn("Echo", Type::String, shout);
        assert_eq!(builtins.iter().count(), 1);

        let mut out = Vec::new();
        let echo = builtins.get("Echo").unwrap();
        assert_eq!(echo.param, Type::String);
        echo.call(&Value::Str("hi".to_string()), &mut out).unwrap();
        assert_eq!(out, b"hi!\n");
    }
}
