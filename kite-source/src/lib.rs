//! Source code representation and error management.

use console::style;
use std::{cell::RefCell, error::Error, fmt};

/// Represents source code.
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
    /// Accumulated errors and warnings.
    pub errors: ErrorReporter,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            errors: ErrorReporter::new(),
        }
    }

    /// Returns `true` if `Source` has no accumulated errors. Returns `false` otherwise.
    /// Warnings are not taken into account.
    pub fn has_no_errors(&self) -> bool {
        !self.errors.has_errors()
    }

    /// Returns the 1-based `(line, column)` of the byte `offset` in the content.
    /// Offsets past the end of the content map to the position right after the last character.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.content.len());
        let before = &self.content[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// Marker returned when interpretation has to stop.
/// The message that caused it is already recorded in the [`ErrorReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fatal {
    message: String,
}

impl Fatal {
    /// The message of the error that stopped interpretation.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interpretation stopped: {}", self.message)
    }
}

impl Error for Fatal {}

/// Manages all the errors and warnings.
pub struct ErrorReporter {
    errors: RefCell<Vec<String>>,
    warnings: RefCell<Vec<String>>,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter`.
    pub fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Adds an error to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn add_error(&self, message: impl ToString) {
        // This should be the only place where self.errors is borrowed mutably.
        self.errors.borrow_mut().push(message.to_string());
    }

    /// Adds a warning to the `ErrorReporter`. Warnings never stop interpretation.
    pub fn add_warning(&self, message: impl ToString) {
        self.warnings.borrow_mut().push(message.to_string());
    }

    /// Records an error that stops interpretation immediately.
    /// The returned [`Fatal`] is meant to be propagated with `?`.
    #[must_use]
    pub fn fatal(&self, message: impl ToString) -> Fatal {
        let message = message.to_string();
        self.add_error(&message);
        Fatal { message }
    }

    /// Returns [`Fatal`] if at least one error was recorded.
    pub fn check(&self) -> Result<(), Fatal> {
        match self.errors.borrow().last() {
            Some(last) => Err(Fatal {
                message: last.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.borrow().is_empty()
    }

    /// Snapshot of the accumulated error messages, in reporting order.
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    /// Snapshot of the accumulated warning messages, in reporting order.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Warnings are always rendered before errors.
impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in self.warnings.borrow().iter() {
            writeln!(f, "{} {}", style("WARNING:").yellow().bold(), warning)?;
        }
        for error in self.errors.borrow().iter() {
            writeln!(f, "{} {}", style("ERROR:").red().bold(), error)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = Source::new("program {\n  def void Main() { }\n}");
        assert_eq!(source.line_col(0), (1, 1));
        assert_eq!(source.line_col(8), (1, 9));
        assert_eq!(source.line_col(12), (2, 3));
        assert_eq!(source.line_col(1000), (3, 2));
    }

    #[test]
    fn test_fatal_is_recorded() {
        let reporter = ErrorReporter::new();
        assert!(reporter.check().is_ok());

        let fatal = reporter.fatal("Unexpected end of source file");
        assert_eq!(fatal.message(), "Unexpected end of source file");
        assert_eq!(reporter.errors(), vec!["Unexpected end of source file"]);
        assert_eq!(reporter.check(), Err(fatal));
    }

    #[test]
    fn test_warnings_do_not_count_as_errors() {
        let source = Source::new("");
        source.errors.add_warning("Return value from function 'F' is not used");
        assert!(source.has_no_errors());
        assert_eq!(source.errors.warnings().len(), 1);
    }

    #[test]
    fn test_report_order() {
        console::set_colors_enabled(false);
        let reporter = ErrorReporter::new();
        reporter.add_error("first error");
        reporter.add_warning("a warning");
        reporter.add_error("second error");
        assert_eq!(
            reporter.to_string(),
            "WARNING: a warning\nERROR: first error\nERROR: second error\n"
        );
    }
}
