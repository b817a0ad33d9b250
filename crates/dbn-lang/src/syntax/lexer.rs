use std::sync::Arc;

use crate::syntax::token::{Position, Token, TokenKind, keyword, question_keyword};

/// Turns source text into tokens. Newlines are tokens; every other kind of
/// whitespace and all comments are dropped. The stream ends with a single `Eof`.
pub struct Lexer {
    source: Vec<char>,
    file: Arc<str>,
    pos: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(source: &str, file: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.chars().collect(),
            file: file.into(),
            pos: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    pub fn tokenize(self) -> Vec<Token> {
        self.collect()
    }

    fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.current_position();
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, "", start.clone(), start);
        };

        let (kind, text) = match ch {
            '\n' => (TokenKind::Newline, "\n".to_string()),
            '{' => (TokenKind::LBrace, ch.to_string()),
            '}' => (TokenKind::RBrace, ch.to_string()),
            '(' => (TokenKind::LParen, ch.to_string()),
            ')' => (TokenKind::RParen, ch.to_string()),
            '[' => (TokenKind::LBracket, ch.to_string()),
            ']' => (TokenKind::RBracket, ch.to_string()),
            '<' => (TokenKind::Lt, ch.to_string()),
            '>' => (TokenKind::Gt, ch.to_string()),
            '+' => (TokenKind::Plus, ch.to_string()),
            '-' => (TokenKind::Minus, ch.to_string()),
            '*' => (TokenKind::Star, ch.to_string()),
            '/' => (TokenKind::Slash, ch.to_string()),
            '"' => self.read_string(),
            c if c.is_ascii_digit() => (TokenKind::Integer, self.read_while(c, |c| c.is_ascii_digit())),
            c if c.is_alphabetic() || c == '_' => self.read_word(c),
            other => (TokenKind::Illegal, other.to_string()),
        };

        Token::new(kind, text, start, self.current_position())
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> Option<char> {
        let ch = *self.source.get(self.pos)?;
        self.pos += 1;
        if ch == '\n' { self.line += 1; self.column = 1; }
        else { self.column += 1; }
        Some(ch)
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn current_position(&self) -> Position {
        Position::new(Arc::clone(&self.file), self.line, self.column)
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' => { self.advance(); }
                '/' if self.peek_next() == Some('/') => self.skip_line(),
                '/' if self.peek_next() == Some('*') => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    /// Stops before the newline so it still separates statements.
    fn skip_line(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') { self.advance(); }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // /
        self.advance(); // *
        while self.peek().is_some() {
            if self.peek() == Some('*') && self.peek_next() == Some('/') {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_while(&mut self, first: char, accept: impl Fn(char) -> bool) -> String {
        let mut s = String::from(first);
        while let Some(c) = self.peek().filter(|c| accept(*c)) {
            s.push(c);
            self.advance();
        }
        s
    }

    /// Identifier or keyword. `Same`, `NotSame`, `Smaller` and `NotSmaller`
    /// become keywords only when a `?` follows immediately.
    fn read_word(&mut self, first: char) -> (TokenKind, String) {
        let mut word = self.read_while(first, |c| c.is_alphanumeric() || c == '_');
        if let Some(kind) = keyword(&word) {
            return (kind, word);
        }
        if let Some(kind) = question_keyword(&word) {
            if self.peek() == Some('?') {
                self.advance();
                word.push('?');
                return (kind, word);
            }
        }
        (TokenKind::Ident, word)
    }

    /// The opening quote is already consumed. A string may not span lines.
    fn read_string(&mut self) -> (TokenKind, String) {
        let mut s = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => return (TokenKind::Illegal, format!("\"{s}")),
                Some('"') => { self.advance(); return (TokenKind::Str, s); }
                Some('\\') => {
                    self.advance();
                    s.push('\\');
                    if let Some(c) = self.peek().filter(|c| *c != '\n') {
                        s.push(c);
                        self.advance();
                    }
                }
                Some(c) => { s.push(c); self.advance(); }
            }
        }
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let tok = self.next_token();
        if tok.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(tok)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
