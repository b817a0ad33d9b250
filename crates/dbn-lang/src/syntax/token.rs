use std::fmt;
use std::sync::Arc;

/// A location in a named source. Lines and columns are 1-based and count characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: Arc<str>, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = if self.file.is_empty() { "<input>" } else { &self.file };
        write!(f, "{}:{}:{}", file, self.line, self.column)
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Integer,
    Str,
    Ident,

    // Keywords
    Paper,
    Pen,
    Line,
    Set,
    Repeat,
    Same,       // Same?
    NotSame,    // NotSame?
    Smaller,    // Smaller?
    NotSmaller, // NotSmaller?
    Command,
    Number,
    Value,
    Load,

    // Punctuation
    LBrace,   // {
    RBrace,   // }
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Lt,       // <
    Gt,       // >
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /

    Newline,
    /// Unterminated string or a character the grammar has no use for.
    Illegal,
    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Paper | Self::Pen | Self::Line | Self::Set | Self::Repeat
            | Self::Same | Self::NotSame | Self::Smaller | Self::NotSmaller
            | Self::Command | Self::Number | Self::Value | Self::Load
        )
    }

    /// True for tokens that can open a number expression.
    pub fn starts_expr(&self) -> bool {
        matches!(self, Self::Integer | Self::Ident | Self::LParen | Self::Lt)
    }
}

/// Plain keywords, matched without regard to case.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("paper",   TokenKind::Paper),
    ("pen",     TokenKind::Pen),
    ("line",    TokenKind::Line),
    ("set",     TokenKind::Set),
    ("repeat",  TokenKind::Repeat),
    ("command", TokenKind::Command),
    ("number",  TokenKind::Number),
    ("value",   TokenKind::Value),
    ("load",    TokenKind::Load),
];

/// Keywords that only exist with a trailing `?`.
const QUESTION_KEYWORDS: &[(&str, TokenKind)] = &[
    ("same",       TokenKind::Same),
    ("notsame",    TokenKind::NotSame),
    ("smaller",    TokenKind::Smaller),
    ("notsmaller", TokenKind::NotSmaller),
];

fn lookup(table: &[(&str, TokenKind)], word: &str) -> Option<TokenKind> {
    table.iter()
        .find(|(kw, _)| kw.eq_ignore_ascii_case(word))
        .map(|(_, kind)| *kind)
}

/// Maps a scanned word to its keyword, if it is one.
pub fn keyword(word: &str) -> Option<TokenKind> {
    lookup(KEYWORDS, word)
}

/// Maps a scanned word to its `?` keyword. The caller confirms the `?`.
pub fn question_keyword(word: &str) -> Option<TokenKind> {
    lookup(QUESTION_KEYWORDS, word)
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; string literals have their quotes stripped.
    pub text: String,
    /// Where the token starts.
    pub pos: Position,
    /// The position just past the token's last character.
    pub end: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: Position, end: Position) -> Self {
        Self { kind, text: text.into(), pos, end }
    }
}
