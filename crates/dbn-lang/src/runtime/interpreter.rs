//! Tree-walking evaluator. Draws onto an owned canvas and collects errors
//! instead of stopping; only a syntax error in the top-level program (checked
//! before an `Interpreter` is built) prevents execution.

use std::io::Read;

use log::{debug, warn};

use crate::error::Error;
use crate::runtime::canvas::{Canvas, Rgba};
use crate::runtime::environment::Environment;
use crate::runtime::frames::Recorder;
use crate::runtime::value::Value;
use crate::syntax::ast::{Block, Definition, Expr, Program, Stmt};
use crate::syntax::token::Token;
use crate::{Outcome, Settings, parse};

pub struct Interpreter<'a> {
    settings: &'a Settings,
    canvas: Canvas,
    pen: Rgba,
    env: Environment,
    errors: Vec<Error>,
    recorder: Recorder,
    /// Set by `Value` inside a number body; unwinds statement execution up
    /// to the number call that consumes it.
    return_value: Option<i64>,
    /// True while the innermost active call is a number.
    in_number: bool,
}

impl<'a> Interpreter<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            canvas: Canvas::square(settings.length),
            pen: Rgba::BLACK,
            env: Environment::new(),
            errors: Vec::new(),
            recorder: Recorder::new(settings.record_frames, settings.max_frames, settings.scale),
            return_value: None,
            in_number: false,
        }
    }

    /// Runs the built-in library, paints the paper white and runs `program`.
    pub fn run(mut self, program: &Program) -> Outcome {
        self.load_builtins();
        self.canvas.fill(Rgba::WHITE);
        self.recorder.capture(&self.canvas);
        self.exec_stmts(&program.body);
        self.finish()
    }

    fn finish(self) -> Outcome {
        Outcome {
            canvas: self.canvas.scaled(self.settings.scale),
            frames: self.recorder.into_frames(),
            errors: self.errors,
        }
    }

    fn load_builtins(&mut self) {
        let settings = self.settings;
        for source in settings.builtins.sources() {
            match parse(&source.text, &source.name) {
                Ok(program) => {
                    self.exec_stmts(&program.body);
                    debug!("loaded built-in {}", source.name);
                }
                Err(errs) => {
                    warn!("built-in {} failed to parse", source.name);
                    self.errors.extend(errs);
                }
            }
        }
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn exec_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.exec_stmt(stmt);
            if self.return_value.is_some() { break; }
        }
    }

    fn exec_block(&mut self, block: &Block) {
        self.exec_stmts(&block.stmts);
    }

    fn exec_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Paper(color) => {
                let color = self.eval_color(color);
                self.canvas.fill(color);
                self.recorder.capture(&self.canvas);
            }
            Stmt::Pen(color) => {
                self.pen = self.eval_color(color);
            }
            Stmt::Line { x1, y1, x2, y2 } => {
                let (x1, y1) = (self.eval(x1), self.eval(y1));
                let (x2, y2) = (self.eval(x2), self.eval(y2));
                let (y1, y2) = (self.flip(y1), self.flip(y2));
                self.canvas.line(x1, y1, x2, y2, self.pen);
                self.recorder.capture(&self.canvas);
            }
            Stmt::Assign { name, value } => {
                let value = self.eval(value);
                self.env.set(name.as_str(), Value::Integer(value));
            }
            Stmt::SetPixel { x, y, value } => {
                let (x, y) = (self.eval(x), self.eval(y));
                let color = self.eval_color(value);
                let y = self.flip(y);
                self.canvas.set(x, y, color);
                self.recorder.capture(&self.canvas);
            }
            Stmt::ReadPixel { name, x, y } => {
                let (x, y) = (self.eval(x), self.eval(y));
                let ink = self.canvas.pixel(x, self.flip(y)).ink();
                self.env.set(name.as_str(), Value::Integer(ink));
            }
            Stmt::Block(block) => self.exec_block(block),
            Stmt::Repeat { name, from, to, body } => {
                let mut i = self.eval(from);
                // `to` is re-read every pass, so the body can move the bound.
                while i <= self.eval(to) {
                    self.env.set(name.as_str(), Value::Integer(i));
                    self.exec_block(body);
                    if self.return_value.is_some() { break; }
                    let Some(next) = i.checked_add(1) else { break };
                    i = next;
                }
            }
            Stmt::Conditional { test, left, right, body } => {
                let left = self.eval(left);
                let right = self.eval(right);
                if test.holds(left, right) {
                    self.exec_block(body);
                }
            }
            Stmt::DefineCommand(def) => {
                self.env.set(def.name.as_str(), Value::Command(def.clone()));
            }
            Stmt::DefineNumber(def) => {
                self.env.set(def.name.as_str(), Value::Number(def.clone()));
            }
            Stmt::CallCommand { name, args } => self.call_command(name, args),
            Stmt::Return(expr) => {
                if self.in_number {
                    self.return_value = Some(self.eval(expr));
                } else {
                    warn!("`Value` outside a number body is ignored: {expr}");
                }
            }
            Stmt::Load(path) => self.load(path),
        }
    }

    /// Language y grows upward from the bottom row.
    fn flip(&self, y: i64) -> i64 {
        (self.canvas.height() as i64 - 1).wrapping_sub(y)
    }

    // ─── Calls ───────────────────────────────────────────────────────────────

    /// Evaluates `args` in the caller's frame, then pushes a frame on top of
    /// it holding the parameters. Surplus arguments are dropped; missing ones
    /// leave their parameter unbound.
    fn enter(&mut self, def: &Definition, args: &[Expr]) {
        let values: Vec<i64> = args.iter().map(|a| self.eval(a)).collect();
        self.env.push_frame();
        for (param, value) in def.params.iter().zip(values) {
            self.env.set(param.as_str(), Value::Integer(value));
        }
    }

    fn call_command(&mut self, name: &Token, args: &[Expr]) {
        let Some(def) = self.env.get(&name.text).and_then(Value::as_command).cloned() else {
            self.errors.push(Error::CommandNotFound { pos: name.end.clone(), name: name.text.clone() });
            return;
        };
        self.enter(&def, args);
        let outer = std::mem::replace(&mut self.in_number, false);
        self.exec_block(&def.body);
        self.in_number = outer;
        self.env.pop_frame();
    }

    fn call_number(&mut self, name: &Token, args: &[Expr]) -> i64 {
        let Some(def) = self.env.get(&name.text).and_then(Value::as_number).cloned() else {
            self.errors.push(Error::NumberNotFound { pos: name.end.clone(), name: name.text.clone() });
            return 0;
        };
        self.enter(&def, args);
        let outer = std::mem::replace(&mut self.in_number, true);
        self.exec_block(&def.body);
        self.in_number = outer;
        self.env.pop_frame();
        // A body that never reaches `Value` yields 0.
        self.return_value.take().unwrap_or(0)
    }

    // ─── Load ────────────────────────────────────────────────────────────────

    /// Runs another source in the current frame. Its errors join the run's
    /// list; a parse failure skips the file but not the rest of the caller.
    fn load(&mut self, path: &Token) {
        let pos = path.end.clone();
        let mut reader = match self.settings.opener.open(&path.text) {
            Ok(reader) => reader,
            Err(e) => {
                self.errors.push(Error::SourceUnavailable { pos, message: e.to_string() });
                return;
            }
        };
        let mut bytes = Vec::new();
        if let Err(e) = reader.read_to_end(&mut bytes) {
            let message = format!("read {}: {e}", path.text);
            self.errors.push(Error::SourceUnavailable { pos, message });
            return;
        }

        match parse(&String::from_utf8_lossy(&bytes), &path.text) {
            Ok(program) => {
                debug!("loaded {} ({} statements)", path.text, program.body.len());
                self.exec_stmts(&program.body);
            }
            Err(errs) => self.errors.extend(errs),
        }
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    /// Every expression form is numeric, so every color resolves to a gray.
    fn eval_color(&mut self, expr: &Expr) -> Rgba {
        Rgba::from_ink(self.eval(expr))
    }

    fn eval(&mut self, expr: &Expr) -> i64 {
        match expr {
            // Literals too large for i64 read as 0.
            Expr::Integer(text) => text.parse().unwrap_or(0),
            Expr::Ident(tok) => match self.env.get(&tok.text).and_then(Value::as_integer) {
                Some(n) => n,
                None => {
                    self.errors.push(Error::IdentifierNotFound { pos: tok.end.clone(), name: tok.text.clone() });
                    0
                }
            },
            Expr::BinOp { left, op, right, at } => {
                let left = self.eval(left);
                let right = self.eval(right);
                op.apply(left, right).unwrap_or_else(|| {
                    self.errors.push(Error::DivisionByZero { pos: at.clone() });
                    0
                })
            }
            Expr::NumberCall { name, args } => self.call_number(name, args),
        }
    }
}
