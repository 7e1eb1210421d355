use std::io::{self, Write};

use kite_parser::ast::Type;
use kite_value::{Builtins, Value};

/// Returns the default [`Builtins`] that should be used.
pub fn default_builtins() -> Builtins {
    let mut builtins = Builtins::new();
    builtins.add_native_fn("PrintInt", Type::Int, println);
    builtins.add_native_fn("PrintBool", Type::Bool, println);
    builtins.add_native_fn("PrintString", Type::String, println);
    builtins
}

/// Writes `arg` followed by a newline.
pub fn println(arg: &Value, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", arg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builtins() {
        let builtins = default_builtins();
        let params: Vec<_> = builtins
            .iter()
            .map(|b| (b.ident.as_str(), b.param.clone()))
            .collect();
        assert_eq!(
            params,
            vec![
                ("PrintInt", Type::Int),
                ("PrintBool", Type::Bool),
                ("PrintString", Type::String)
            ]
        );
    }

    #[test]
    fn test_println() {
        let mut out = Vec::new();
        println(&Value::Int(-4), &mut out).unwrap();
        println(&Value::Bool(true), &mut out).unwrap();
        println(&Value::Str("hi".to_string()), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "-4\ntrue\nhi\n");
    }
}
