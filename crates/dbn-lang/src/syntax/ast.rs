//! Syntax tree. Every node renders back to source through `Display`; the
//! rendering re-parses to the same tree.

use std::fmt;
use std::rc::Rc;

use crate::syntax::token::{Position, Token};

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

/// A brace-delimited statement list. Loop, conditional and definition
/// bodies are always blocks.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

/// `Command name params { }` or `Number name params { }`. Shared so the
/// environment can bind the node itself.
#[derive(Debug)]
pub struct Definition {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
}

// ─── Statements ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `Paper c`
    Paper(Expr),
    /// `Pen c`
    Pen(Expr),
    /// `Line x1 y1 x2 y2`
    Line {
        x1: Expr,
        y1: Expr,
        x2: Expr,
        y2: Expr,
    },
    /// `Set name value`
    Assign { name: String, value: Expr },
    /// `Set [x y] value`
    SetPixel { x: Expr, y: Expr, value: Expr },
    /// `Set name [x y]`
    ReadPixel { name: String, x: Expr, y: Expr },
    /// `{ ... }`
    Block(Block),
    /// `Repeat name from to { }`
    Repeat {
        name: String,
        from: Expr,
        to: Expr,
        body: Block,
    },
    /// `Same? l r { }` and friends.
    Conditional {
        test: Condition,
        left: Expr,
        right: Expr,
        body: Block,
    },
    DefineCommand(Rc<Definition>),
    /// `name args...`
    CallCommand { name: Token, args: Vec<Expr> },
    DefineNumber(Rc<Definition>),
    /// `Value expr`
    Return(Expr),
    /// `Load "path"`
    Load(Token),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Equal,
    NotEqual,
    Less,
    GreaterOrEqual,
}

impl Condition {
    pub fn holds(self, left: i64, right: i64) -> bool {
        match self {
            Self::Equal          => left == right,
            Self::NotEqual       => left != right,
            Self::Less           => left < right,
            Self::GreaterOrEqual => left >= right,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Equal          => "Same?",
            Self::NotEqual       => "NotSame?",
            Self::Less           => "Smaller?",
            Self::GreaterOrEqual => "NotSmaller?",
        }
    }
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Expr {
    /// Digits as written. Parsed when evaluated.
    Integer(String),
    Ident(Token),
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        /// Just past the operator; used to report division by zero.
        at: Position,
    },
    /// `<name args...>`
    NumberCall { name: Token, args: Vec<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add, Sub, Mul, Div,
}

impl BinOp {
    /// Wrapping 64-bit arithmetic; division truncates toward zero.
    /// `None` only for division by zero.
    pub fn apply(self, left: i64, right: i64) -> Option<i64> {
        match self {
            Self::Add => Some(left.wrapping_add(right)),
            Self::Sub => Some(left.wrapping_sub(right)),
            Self::Mul => Some(left.wrapping_mul(right)),
            Self::Div => (right != 0).then(|| left.wrapping_div(right)),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

// ─── Canonical rendering ─────────────────────────────────────────────────────

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    args.iter().try_for_each(|a| write!(f, " {a}"))
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(text) => f.write_str(text),
            Expr::Ident(tok) => f.write_str(&tok.text),
            Expr::BinOp { left, op, right, .. } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::NumberCall { name, args } => {
                write!(f, "<{}", name.text)?;
                write_args(f, args)?;
                f.write_str(">")
            }
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{\n")?;
        for stmt in &self.stmts {
            writeln!(f, "{stmt}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for p in &self.params {
            write!(f, " {p}")?;
        }
        write!(f, " {}", self.body)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Paper(c) => write!(f, "Paper {c}"),
            Stmt::Pen(c) => write!(f, "Pen {c}"),
            Stmt::Line { x1, y1, x2, y2 } => write!(f, "Line {x1} {y1} {x2} {y2}"),
            Stmt::Assign { name, value } => write!(f, "Set {name} {value}"),
            Stmt::SetPixel { x, y, value } => write!(f, "Set [{x} {y}] {value}"),
            Stmt::ReadPixel { name, x, y } => write!(f, "Set {name} [{x} {y}]"),
            Stmt::Block(b) => write!(f, "{b}"),
            Stmt::Repeat { name, from, to, body } => write!(f, "Repeat {name} {from} {to} {body}"),
            Stmt::Conditional { test, left, right, body } => {
                write!(f, "{} {left} {right} {body}", test.keyword())
            }
            Stmt::DefineCommand(def) => write!(f, "Command {def}"),
            Stmt::CallCommand { name, args } => {
                f.write_str(&name.text)?;
                write_args(f, args)
            }
            Stmt::DefineNumber(def) => write!(f, "Number {def}"),
            Stmt::Return(e) => write!(f, "Value {e}"),
            Stmt::Load(path) => write!(f, "Load \"{}\"", path.text),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.body {
            writeln!(f, "{stmt}")?;
        }
        Ok(())
    }
}
