//! Pisscript - an esoteric programming language designed around the
//! environment of the household restroom.
//!
//! This crate provides the whole pipeline: lexing, statement building,
//! interpretation, and the diagnostics printed when a program falls over.

pub mod ast;
pub mod diagnostic;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod token;
pub mod value;

use std::fs;
use std::path::Path;

// Re-export commonly used types
pub use diagnostic::Diagnostic;
pub use error::{PissError, PissResult};
pub use interpreter::{Halt, Interpreter};
pub use parser::parse;
pub use value::{MemoryFault, Value};

use logging::{LogLevel, LogRecord, LoggerCore};

/// Program text along with the name it gets in diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub text: String,
    pub name: String,
}

impl Source {
    pub fn new(text: impl Into<String>, name: impl Into<String>) -> Self {
        Source {
            text: text.into(),
            name: name.into(),
        }
    }
}

/// Read a whole source file into memory
///
/// Windows (`\r\n`) and old Mac (`\r`) line endings are turned into `\n`,
/// so the lexer only ever sees one kind of line break.
pub fn load_source(path: impl AsRef<Path>) -> PissResult<Source> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| PissError::FileError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(Source::new(
        normalize_newlines(&text),
        path.display().to_string(),
    ))
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed,
    /// A syntax or runtime error, ready for the diagnostic reporter
    Failed(PissError),
    /// A Tub went negative. This one is never reported, only crashed on.
    Aborted { fault: MemoryFault, line: usize },
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    /// The diagnostic to print, for failed runs only
    pub fn diagnostic(&self, source: &Source) -> Option<Diagnostic> {
        match self {
            Outcome::Failed(error) => Some(Diagnostic::from_error(source, error)),
            _ => None,
        }
    }
}

impl From<Result<(), Halt>> for Outcome {
    fn from(result: Result<(), Halt>) -> Self {
        match result {
            Ok(()) => Outcome::Completed,
            Err(Halt::Error(error)) => Outcome::Failed(error),
            Err(Halt::Fault { fault, line }) => Outcome::Aborted { fault, line },
        }
    }
}

/// Run Pisscript source from start to finish
///
/// # Example
/// ```
/// use pisscript::{run, Outcome, Source};
///
/// let source = Source::new("tub x\nfill x with 2\nejaculate x", "example.piss");
/// assert_eq!(run(&source), Outcome::Completed);
/// ```
pub fn run(source: &Source) -> Outcome {
    run_with_logger(source, LoggerCore::from_env()).0
}

/// Run Pisscript source and capture output
///
/// Returns the outcome along with every line printed by `ejaculate`
/// before the run ended.
pub fn run_with_output(source: &Source) -> (Outcome, Vec<String>) {
    let (outcome, interpreter) = run_with_logger(source, LoggerCore::from_env());
    (outcome, interpreter.get_output().to_vec())
}

/// Run Pisscript source with a specific logger, handing back the
/// interpreter so its Tubs and output can be inspected afterwards
pub fn run_with_logger(source: &Source, mut logger: LoggerCore) -> (Outcome, Interpreter) {
    let program = match parse(&source.text) {
        Ok(program) => program,
        Err(error) => {
            logger.log(
                &LogRecord::new(LogLevel::Debug, "pisscript::parser", "parse failed")
                    .at_line(error.line().unwrap_or(0))
                    .field("file", &source.name)
                    .field("error", &error),
            );
            return (Outcome::Failed(error), Interpreter::with_logger(logger));
        }
    };
    logger.log(
        &LogRecord::new(LogLevel::Debug, "pisscript::parser", "parsed")
            .field("file", &source.name)
            .field("statements", program.len()),
    );

    let mut interpreter = Interpreter::with_logger(logger);
    let outcome = Outcome::from(interpreter.interpret(&program));
    (outcome, interpreter)
}
