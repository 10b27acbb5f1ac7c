use crate::ast::{Program, Statement};
use crate::error::{PissError, PissResult};
use crate::lexer::Lexer;
use crate::token::{TokenKind, Verb};

/// What a single line of source turned out to be
enum Line {
    Statement(Statement),
    Blank,
    End,
}

/// The statement builder - groups the token stream into one statement per line
pub struct Parser<'source> {
    lexer: Lexer<'source>,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source str) -> Self {
        Parser {
            lexer: Lexer::new(source),
        }
    }

    /// Parse the whole source into a program
    pub fn parse(&mut self) -> PissResult<Program> {
        let mut statements = Vec::new();

        loop {
            match self.line()? {
                Line::Statement(statement) => statements.push(statement),
                Line::Blank => continue,
                Line::End => break,
            }
        }

        Ok(Program::new(statements))
    }

    fn line(&mut self) -> PissResult<Line> {
        let token = self.lexer.next_token()?;

        let verb = match token.kind {
            TokenKind::Eof => return Ok(Line::End),
            TokenKind::Endl => return Ok(Line::Blank),
            TokenKind::Verb => Verb::from_keyword(&token.text),
            _ => None,
        };
        let Some(verb) = verb else {
            return Err(PissError::ExpectedStatement {
                found: token.text,
                line: token.line,
            });
        };

        let mut args = Vec::new();
        loop {
            let arg = self.lexer.next_token()?;
            if arg.ends_statement() {
                break;
            }
            args.push(arg);
        }

        Ok(Line::Statement(Statement::new(verb, args, token.line)))
    }
}

/// Lex and parse a string in one go
pub fn parse(source: &str) -> PissResult<Program> {
    Parser::new(source).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    #[test]
    fn test_single_statement() {
        let program = parse("fill bowl with 5").unwrap();

        assert_eq!(program.len(), 1);
        let stmt = &program.statements[0];
        assert_eq!(stmt.verb, Verb::Fill);
        assert_eq!(stmt.line, 1);
        assert_eq!(
            stmt.args,
            vec![
                Token::new(TokenKind::Name, "bowl", 1),
                Token::new(TokenKind::Name, "with", 1),
                Token::new(TokenKind::Number, "5", 1),
            ]
        );
    }

    #[test]
    fn test_blank_lines_make_no_statements() {
        let program = parse("\n\ntub x\n   \n\nejaculate x\n").unwrap();

        assert_eq!(program.len(), 2);
        assert_eq!(program.statements[0].verb, Verb::Tub);
        assert_eq!(program.statements[0].line, 3);
        assert_eq!(program.statements[1].verb, Verb::Ejaculate);
        assert_eq!(program.statements[1].line, 6);
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n\n").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_verb_with_no_arguments() {
        let program = parse("measure").unwrap();
        assert_eq!(program.statements[0].verb, Verb::Measure);
        assert!(program.statements[0].args.is_empty());
    }

    #[test]
    fn test_verbs_can_be_arguments() {
        let program = parse("ejaculate tub").unwrap();
        assert_eq!(program.statements[0].args[0].kind, TokenKind::Verb);
    }

    #[test]
    fn test_expected_statement() {
        let err = parse("tub x\nflush x").unwrap_err();
        assert_eq!(
            err,
            PissError::ExpectedStatement {
                found: "flush".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn test_string_at_statement_start() {
        let err = parse("\"hello\"").unwrap_err();
        assert!(matches!(err, PissError::ExpectedStatement { found, line: 1 } if found == "hello"));
    }

    #[test]
    fn test_lex_errors_surface_through_parse() {
        let err = parse("tub x\ntub y\nejaculate #").unwrap_err();
        assert_eq!(err, PissError::UnexpectedCharacter { found: '#', line: 3 });
    }
}
