use std::fmt;

use thiserror::Error;

/// Everything that can go wrong in a Pisscript program and still be reported.
/// The fatal negative-number fault is [`crate::value::MemoryFault`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PissError {
    // === Lexical ===
    #[error("Unexpected token {found:?}")]
    UnexpectedCharacter { found: char, line: usize },

    #[error("Unterminated string literal")]
    UnterminatedString { line: usize },

    // === Statement building ===
    #[error("Expected statement, found token '{found}'")]
    ExpectedStatement { found: String, line: usize },

    // === Runtime ===
    #[error("{expected}")]
    MissingArgument { expected: &'static str, line: usize },

    #[error("Expected token of type '{expected}', found token '{found}'")]
    WrongTokenKind {
        expected: &'static str,
        found: String,
        line: usize,
    },

    #[error("Expected '{keyword}'")]
    ExpectedKeyword { keyword: &'static str, line: usize },

    #[error("Tub with name '{name}' already exists!")]
    TubAlreadyExists { name: String, line: usize },

    #[error("No Tub exists with name '{name}'")]
    NoSuchTub { name: String, line: usize },

    #[error("Unexpected keyword '{keyword}' (Cannot resolve value)")]
    UnexpectedKeyword { keyword: String, line: usize },

    #[error("Cannot resolve expression value of token '{token}'")]
    CannotResolve { token: String, line: usize },

    #[error("Cannot pour into Tub containing Words")]
    PourIntoWords { line: usize },

    #[error("Cannot pour Words into Tub")]
    PourWords { line: usize },

    #[error("Cannnot measure Tub containing Words")]
    MeasureWords { line: usize },

    #[error("Cannot append Number to Words")]
    AppendNumber { line: usize },

    // === Outside the program ===
    #[error("Cannot read the file '{path}': {reason}")]
    FileError { path: String, reason: String },
}

/// Which heading a diagnostic goes under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Runtime,
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "Syntax Error"),
            ErrorCategory::Runtime => write!(f, "Runtime Error"),
            ErrorCategory::Io => write!(f, "IO Error"),
        }
    }
}

impl PissError {
    pub fn line(&self) -> Option<usize> {
        match self {
            PissError::UnexpectedCharacter { line, .. } => Some(*line),
            PissError::UnterminatedString { line } => Some(*line),
            PissError::ExpectedStatement { line, .. } => Some(*line),
            PissError::MissingArgument { line, .. } => Some(*line),
            PissError::WrongTokenKind { line, .. } => Some(*line),
            PissError::ExpectedKeyword { line, .. } => Some(*line),
            PissError::TubAlreadyExists { line, .. } => Some(*line),
            PissError::NoSuchTub { line, .. } => Some(*line),
            PissError::UnexpectedKeyword { line, .. } => Some(*line),
            PissError::CannotResolve { line, .. } => Some(*line),
            PissError::PourIntoWords { line } => Some(*line),
            PissError::PourWords { line } => Some(*line),
            PissError::MeasureWords { line } => Some(*line),
            PissError::AppendNumber { line } => Some(*line),
            PissError::FileError { .. } => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PissError::UnexpectedCharacter { .. }
            | PissError::UnterminatedString { .. }
            | PissError::ExpectedStatement { .. } => ErrorCategory::Syntax,
            PissError::FileError { .. } => ErrorCategory::Io,
            _ => ErrorCategory::Runtime,
        }
    }
}

pub type PissResult<T> = Result<T, PissError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PissError::UnexpectedCharacter {
            found: '@',
            line: 1,
        };
        assert_eq!(err.to_string(), "Unexpected token '@'");

        let err = PissError::UnexpectedCharacter {
            found: '\t',
            line: 1,
        };
        assert_eq!(err.to_string(), "Unexpected token '\\t'");

        let err = PissError::TubAlreadyExists {
            name: "bowl".to_string(),
            line: 4,
        };
        assert_eq!(err.to_string(), "Tub with name 'bowl' already exists!");

        let err = PissError::MissingArgument {
            expected: "Expected Tub name",
            line: 1,
        };
        assert_eq!(err.to_string(), "Expected Tub name");
    }

    #[test]
    fn test_error_line_method() {
        assert_eq!(PissError::UnterminatedString { line: 5 }.line(), Some(5));
        assert_eq!(
            PissError::ExpectedStatement {
                found: "x".to_string(),
                line: 10
            }
            .line(),
            Some(10)
        );
        assert_eq!(PissError::MeasureWords { line: 3 }.line(), Some(3));
        assert_eq!(
            PissError::FileError {
                path: "x".to_string(),
                reason: "gone".to_string()
            }
            .line(),
            None
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            PissError::UnterminatedString { line: 1 }.category(),
            ErrorCategory::Syntax
        );
        assert_eq!(
            PissError::PourWords { line: 1 }.category(),
            ErrorCategory::Runtime
        );
        assert_eq!(ErrorCategory::Runtime.to_string(), "Runtime Error");
        assert_eq!(ErrorCategory::Syntax.to_string(), "Syntax Error");
    }
}
