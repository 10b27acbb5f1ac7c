use logos::Logos;

use crate::error::{PissError, PissResult};
use crate::token::{Pattern, Token, TokenKind, Verb};

/// The lexer - hands out one token at a time, on demand
pub struct Lexer<'source> {
    source: &'source str,
    cursor: usize,
    line: usize,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Lexer {
            source,
            cursor: 0,
            line: 1,
        }
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.source.len()
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.source[self.cursor..self.cursor + len];
        self.line += consumed.matches('\n').count();
        self.cursor += len;
    }

    /// Scan the next token. Spaces are swallowed here so callers never see
    /// them, and once the cursor hits the end every call hands back `Eof`.
    pub fn next_token(&mut self) -> PissResult<Token> {
        loop {
            let rest = &self.source[self.cursor..];
            let Some(first) = rest.chars().next() else {
                return Ok(Token::eof(self.line));
            };
            let line = self.line;

            // A fresh scan from the cursor each time. After a keyword is split
            // off the front of a name, the rest of that name has to be
            // scanned again from where the keyword ended.
            let mut patterns = Pattern::lexer(rest);
            let pattern = match patterns.next() {
                Some(Ok(pattern)) => pattern,
                _ => {
                    return Err(PissError::UnexpectedCharacter { found: first, line });
                }
            };
            let lexeme = patterns.slice();

            let token = match pattern {
                Pattern::Space => {
                    self.advance(lexeme.len());
                    continue;
                }
                Pattern::Newline => Token::new(TokenKind::Endl, lexeme, line),
                Pattern::Number => Token::new(TokenKind::Number, lexeme, line),
                Pattern::Verb => Token::new(TokenKind::Verb, lexeme, line),
                Pattern::String => {
                    self.advance(lexeme.len());
                    return Ok(Token::new(
                        TokenKind::String,
                        &lexeme[1..lexeme.len() - 1],
                        line,
                    ));
                }
                Pattern::UnterminatedString => {
                    return Err(PissError::UnterminatedString { line });
                }
                // First match wins: a keyword at the front of a name is
                // taken on its own and the rest is scanned afresh.
                Pattern::Name => match Verb::prefix_of(lexeme) {
                    Some(verb) => Token::new(TokenKind::Verb, verb.keyword(), line),
                    None => Token::new(TokenKind::Name, lexeme, line),
                },
            };

            self.advance(token.text.len());
            return Ok(token);
        }
    }
}

/// Convenience function to lex a whole string, up to and including `Eof`
pub fn lex(source: &str) -> PissResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        let done = token.is_eof();
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
