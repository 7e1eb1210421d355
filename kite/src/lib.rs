//! The kite interpreter: parse, validate, then execute.

pub mod builtin_functions;

use std::io::Write;

use kite_exec::{Executor, RuntimeError};
use kite_parser::ast::Program;
use kite_parser::parser::Parser;
use kite_passes::validate::validate;
use kite_source::{Fatal, Source};
use kite_value::Builtins;
use thiserror::Error;
use tracing::debug;

/// Why interpretation stopped. Messages are also recorded in the [`Source`] error report.
#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("syntax error: {}", .0.message())]
    Syntax(Fatal),
    #[error("semantic error: {}", .0.message())]
    Semantic(Fatal),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Parses `source` into a [`Program`].
pub fn parse(source: &Source) -> Result<Program, InterpretError> {
    debug!("parsing");
    Parser::new(source)
        .parse_program()
        .map_err(InterpretError::Syntax)
}

/// Parses and validates `source` without running it.
pub fn check(source: &Source, builtins: &Builtins) -> Result<(), InterpretError> {
    let program = parse(source)?;
    debug!("validating");
    validate(&program, builtins, source).map_err(InterpretError::Semantic)?;
    Ok(())
}

/// Runs `source` with the given `builtins`. Program output goes to `out`.
///
/// A runtime error is appended to the error report of `source` before it is returned.
pub fn interpret_with(
    source: &Source,
    builtins: &Builtins,
    out: &mut dyn Write,
) -> Result<(), InterpretError> {
    let program = parse(source)?;
    debug!("validating");
    let validated =
        validate(&program, builtins, source).map_err(InterpretError::Semantic)?;

    Executor::new(&validated, out).execute().map_err(|err| {
        source.errors.add_error(&err);
        InterpretError::Runtime(err)
    })
}

/// Runs `source` with the default builtins.
pub fn interpret(source: &Source, out: &mut dyn Write) -> Result<(), InterpretError> {
    interpret_with(source, &builtin_functions::default_builtins(), out)
}

/// Runs `source` and reports whether it completed without a syntax, semantic or runtime error.
pub fn run(source: &str, out: &mut dyn Write) -> bool {
    let source = source.into();
    interpret(&source, out).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_stage() {
        let mut out = Vec::new();

        let source = "program { def void Main() { }".into();
        let err = interpret(&source, &mut out).unwrap_err();
        assert!(matches!(err, InterpretError::Syntax(_)));

        let source = "program { def void Main() { Missing(); } }".into();
        let err = interpret(&source, &mut out).unwrap_err();
        assert!(matches!(err, InterpretError::Semantic(_)));
        assert_eq!(err.to_string(), "semantic error: Call undefined function 'Missing'");

        let source = "program { def void Main() { int z = 0; PrintInt(1 % z); } }".into();
        let err = interpret(&source, &mut out).unwrap_err();
        assert!(matches!(err, InterpretError::Runtime(_)));
        assert_eq!(
            source.errors.errors(),
            vec!["Division by zero in '%' operation"]
        );
    }

    #[test]
    fn test_check_does_not_execute() {
        let source = "program { def void Main() { int z = 0; PrintInt(1 / z); } }".into();
        assert!(check(&source, &builtin_functions::default_builtins()).is_ok());
    }

    #[test]
    fn test_run() {
        let mut out = Vec::new();
        assert!(run("program { def void Main() { PrintInt(2 + 3 * 4); } }", &mut out));
        assert_eq!(String::from_utf8(out).unwrap(), "14\n");
    }
}
