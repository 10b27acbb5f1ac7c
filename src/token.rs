use logos::Logos;
use std::fmt;

/// The raw lexical patterns, scanned with logos.
///
/// Logos picks the longest candidate at the cursor. The lexer narrows that
/// back down to first-match-wins, so a keyword at the front of a longer
/// identifier still comes out as a verb (see `Lexer::next_token`).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    #[regex(r"[0-9]+")]
    Number,

    #[token("tub")]
    #[token("fill")]
    #[token("pour")]
    #[token("ejaculate")]
    #[token("measure")]
    #[token("stick")]
    Verb,

    #[token(" ")]
    Space,

    #[token("\n")]
    Newline,

    /// At least one character between the quotes
    #[regex(r#""[^"\n]+""#)]
    String,

    /// A quote with no partner before the end of the line. An empty `""`
    /// lands here too, because a string needs at least one character.
    #[regex(r#""[^"\n]*"#)]
    UnterminatedString,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name,
}

/// The kinds of token the statement builder gets to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Name,
    String,
    Verb,
    Endl,
    Eof,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::Name => "name",
            TokenKind::String => "string",
            TokenKind::Verb => "verb",
            TokenKind::Endl => "endl",
            TokenKind::Eof => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The fixed keyword set, in the order the lexer tries them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// tub - declare a new Tub
    Tub,
    /// fill - overwrite a Tub
    Fill,
    /// pour - drain a value into a Tub
    Pour,
    /// ejaculate - print a value
    Ejaculate,
    /// measure - turn a number into Words
    Measure,
    /// stick - append Words onto a Tub
    Stick,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::Tub,
        Verb::Fill,
        Verb::Pour,
        Verb::Ejaculate,
        Verb::Measure,
        Verb::Stick,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Verb::Tub => "tub",
            Verb::Fill => "fill",
            Verb::Pour => "pour",
            Verb::Ejaculate => "ejaculate",
            Verb::Measure => "measure",
            Verb::Stick => "stick",
        }
    }

    pub fn from_keyword(text: &str) -> Option<Verb> {
        Verb::ALL.into_iter().find(|verb| verb.keyword() == text)
    }

    /// The first keyword that `text` starts with, if any
    pub fn prefix_of(text: &str) -> Option<Verb> {
        Verb::ALL
            .into_iter()
            .find(|verb| text.starts_with(verb.keyword()))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A token with its text and the line it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenKind::Eof, "", line)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Whether this token ends the current statement
    pub fn ends_statement(&self) -> bool {
        matches!(self.kind, TokenKind::Endl | TokenKind::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {:?}>", self.kind, self.text)
    }
}
