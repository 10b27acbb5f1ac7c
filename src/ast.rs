use std::fmt;

use crate::token::{Token, Verb};

/// A program is a list of statements, one per non-blank line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// A verb and whatever followed it on the line
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub verb: Verb,
    pub args: Vec<Token>,
    pub line: usize,
}

impl Statement {
    pub fn new(verb: Verb, args: Vec<Token>, line: usize) -> Self {
        Statement { verb, args, line }
    }

    /// Argument `n`, if the line was long enough to have one
    pub fn arg(&self, n: usize) -> Option<&Token> {
        self.args.get(n)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn test_statement_args() {
        let stmt = Statement::new(
            Verb::Fill,
            vec![
                Token::new(TokenKind::Name, "bowl", 1),
                Token::new(TokenKind::Name, "with", 1),
            ],
            1,
        );

        assert_eq!(stmt.arg(0).map(|t| t.text.as_str()), Some("bowl"));
        assert!(stmt.arg(2).is_none());
        assert_eq!(stmt.to_string(), "fill <name \"bowl\"> <name \"with\">");
    }
}
