//! Severity levels, source locations, and the logger contract consumed by
//! include and reference resolution.

use std::cell::Cell;
use std::fmt;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Severity of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A reference or include degraded to a placeholder.
    Error,
    /// Suspicious but recoverable markup, such as a mismatched end tag.
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

/// Where in a source document a message originated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Label of the source document.
    pub file: String,
    /// One-based line number, when known.
    pub line: Option<u32>,
}

impl Location {
    /// Location at a specific line of a document.
    pub fn at(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}", self.file),
            None => write!(f, "{}", self.file),
        }
    }
}

/// Sink for degraded-resolution messages. Resolution never aborts on a bad
/// include or reference; it reports here and continues.
pub trait Logger {
    /// Record one message with its severity and origin.
    fn log(&self, severity: Severity, message: &str, location: &Location);
}

/// Logger that prints to stderr with a bold severity prefix.
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, severity: Severity, message: &str, location: &Location) {
        eprintln!("{BOLD}{severity}{RESET}: {message} ({location})");
    }
}

/// Console logger that also tallies message counts, used to derive the
/// process exit code after a run.
pub struct CountingLogger {
    errors: Cell<u32>,
    warnings: Cell<u32>,
}

impl CountingLogger {
    /// A logger with zeroed tallies.
    pub fn new() -> Self {
        Self {
            errors: Cell::new(0),
            warnings: Cell::new(0),
        }
    }

    /// Number of error-severity messages seen so far.
    pub fn errors(&self) -> u32 {
        self.errors.get()
    }

    /// Number of warn-severity messages seen so far.
    pub fn warnings(&self) -> u32 {
        self.warnings.get()
    }
}

impl Default for CountingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for CountingLogger {
    fn log(&self, severity: Severity, message: &str, location: &Location) {
        match severity {
            Severity::Error => self.errors.set(self.errors.get().saturating_add(1)),
            Severity::Warn => self.warnings.set(self.warnings.get().saturating_add(1)),
        }
        ConsoleLogger.log(severity, message, location);
    }
}
