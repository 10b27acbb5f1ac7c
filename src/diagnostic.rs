use std::fmt;

use crate::error::{ErrorCategory, PissError};
use crate::Source;

/// Printed under every diagnostic
pub const CLOSING_REMARK: &str = "that's kinda mungus moment if u ask me ඞ";

/// A failure, ready to show to whoever wrote the program
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub category: ErrorCategory,
    pub message: String,
    /// The offending source line with surrounding whitespace trimmed
    pub excerpt: String,
}

impl Diagnostic {
    pub fn from_error(source: &Source, error: &PissError) -> Self {
        let line = error.line().unwrap_or(0);
        Diagnostic {
            file: source.name.clone(),
            line,
            category: error.category(),
            message: error.to_string(),
            excerpt: source_line(&source.text, line).trim().to_string(),
        }
    }

    /// The `^^^^` row sitting under the excerpt
    pub fn underline(&self) -> String {
        "^".repeat(self.excerpt.chars().count())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:{}", self.file, self.line)?;
        writeln!(f, "{}: {}", self.category, self.message)?;
        writeln!(f, " | {}", self.excerpt)?;
        writeln!(f, "   {}", self.underline())?;
        write!(f, "{}", CLOSING_REMARK)
    }
}

/// Line `line` (1-based) of `text`, or "" when it's out of range
fn source_line(text: &str, line: usize) -> &str {
    if line == 0 {
        return "";
    }
    text.split('\n').nth(line - 1).unwrap_or("")
}
