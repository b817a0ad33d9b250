use std::rc::Rc;

use crate::error::Error;
use crate::syntax::ast::*;
use crate::syntax::token::{Token, TokenKind};

/// Recursive-descent parser with one token of lookahead. Parsing stops at
/// the first mismatch; there is no recovery.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// `tokens` must end with `Eof`, as `Lexer::tokenize` guarantees.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Program, Vec<Error>> {
        self.parse_program().map_err(|e| vec![e])
    }

    fn parse_program(&mut self) -> Result<Program, Error> {
        let body = self.parse_stmt_list(TokenKind::Eof)?;
        Ok(Program { body })
    }

    /// Statements separated by one or more newlines, with newlines allowed
    /// before the first and after the last, up to (not including) `end`.
    fn parse_stmt_list(&mut self, end: TokenKind) -> Result<Vec<Stmt>, Error> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.check(end) {
            stmts.push(self.parse_stmt()?);
            if self.check(end) { break; }
            self.expect(TokenKind::Newline)?;
            self.skip_newlines();
        }
        Ok(stmts)
    }

    fn parse_block(&mut self) -> Result<Block, Error> {
        self.expect(TokenKind::LBrace)?;
        let stmts = self.parse_stmt_list(TokenKind::RBrace)?;
        self.expect(TokenKind::RBrace)?;
        Ok(Block { stmts })
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_stmt(&mut self) -> Result<Stmt, Error> {
        match self.peek_kind() {
            TokenKind::Paper => { self.advance(); Ok(Stmt::Paper(self.parse_expr()?)) }
            TokenKind::Pen   => { self.advance(); Ok(Stmt::Pen(self.parse_expr()?)) }
            TokenKind::Line  => self.parse_line(),
            TokenKind::Set   => self.parse_set(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::Same       => self.parse_conditional(Condition::Equal),
            TokenKind::NotSame    => self.parse_conditional(Condition::NotEqual),
            TokenKind::Smaller    => self.parse_conditional(Condition::Less),
            TokenKind::NotSmaller => self.parse_conditional(Condition::GreaterOrEqual),
            TokenKind::Command => Ok(Stmt::DefineCommand(self.parse_definition()?)),
            TokenKind::Number  => Ok(Stmt::DefineNumber(self.parse_definition()?)),
            TokenKind::Value => { self.advance(); Ok(Stmt::Return(self.parse_expr()?)) }
            TokenKind::Load  => {
                self.advance();
                Ok(Stmt::Load(self.expect(TokenKind::Str)?))
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Ident => {
                let name = self.advance();
                let args = self.parse_args()?;
                Ok(Stmt::CallCommand { name, args })
            }
            _ => Err(self.syntax_error()),
        }
    }

    fn parse_line(&mut self) -> Result<Stmt, Error> {
        self.expect(TokenKind::Line)?;
        let x1 = self.parse_expr()?;
        let y1 = self.parse_expr()?;
        let x2 = self.parse_expr()?;
        let y2 = self.parse_expr()?;
        Ok(Stmt::Line { x1, y1, x2, y2 })
    }

    /// `Set name expr`, `Set [x y] expr` or `Set name [x y]`, told apart by
    /// where the `[` appears.
    fn parse_set(&mut self) -> Result<Stmt, Error> {
        self.expect(TokenKind::Set)?;
        if self.check(TokenKind::LBracket) {
            let (x, y) = self.parse_coords()?;
            let value = self.parse_expr()?;
            return Ok(Stmt::SetPixel { x, y, value });
        }
        let name = self.expect(TokenKind::Ident)?.text;
        if self.check(TokenKind::LBracket) {
            let (x, y) = self.parse_coords()?;
            Ok(Stmt::ReadPixel { name, x, y })
        } else {
            let value = self.parse_expr()?;
            Ok(Stmt::Assign { name, value })
        }
    }

    fn parse_coords(&mut self) -> Result<(Expr, Expr), Error> {
        self.expect(TokenKind::LBracket)?;
        let x = self.parse_expr()?;
        let y = self.parse_expr()?;
        self.expect(TokenKind::RBracket)?;
        Ok((x, y))
    }

    fn parse_repeat(&mut self) -> Result<Stmt, Error> {
        self.expect(TokenKind::Repeat)?;
        let name = self.expect(TokenKind::Ident)?.text;
        let from = self.parse_expr()?;
        let to = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::Repeat { name, from, to, body })
    }

    fn parse_conditional(&mut self, test: Condition) -> Result<Stmt, Error> {
        self.advance(); // the `?` keyword
        let left = self.parse_expr()?;
        let right = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::Conditional { test, left, right, body })
    }

    fn parse_definition(&mut self) -> Result<Rc<Definition>, Error> {
        self.advance(); // `Command` or `Number`
        let name = self.expect(TokenKind::Ident)?.text;
        let mut params = Vec::new();
        while self.check(TokenKind::Ident) {
            params.push(self.advance().text);
        }
        let body = self.parse_block()?;
        Ok(Rc::new(Definition { name, params, body }))
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let at = self.advance().end;
            let right = self.parse_term()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), at };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_atom()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star  => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            let at = self.advance().end;
            let right = self.parse_atom()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), at };
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<Expr, Error> {
        match self.peek_kind() {
            TokenKind::Integer => Ok(Expr::Integer(self.advance().text)),
            TokenKind::Ident => Ok(Expr::Ident(self.advance())),
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Lt => {
                self.advance();
                let name = self.expect(TokenKind::Ident)?;
                let args = self.parse_args()?;
                self.expect(TokenKind::Gt)?;
                Ok(Expr::NumberCall { name, args })
            }
            _ => Err(self.syntax_error()),
        }
    }

    /// Zero or more expressions, as many as follow.
    fn parse_args(&mut self) -> Result<Vec<Expr>, Error> {
        let mut args = Vec::new();
        while self.peek_kind().starts_expr() {
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.syntax_error())
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) { self.advance(); }
    }

    fn syntax_error(&self) -> Error {
        Error::Syntax { pos: self.peek().pos.clone() }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
