pub mod builtins;
pub mod error;
pub mod runtime;
pub mod source;
pub mod syntax;

pub use builtins::Builtins;
pub use error::{Error, ErrorCode};
pub use runtime::canvas::{Canvas, Rgba};
pub use runtime::frames::Frame;
pub use runtime::value::Value;
pub use source::{DirOpener, MemoryOpener, NullOpener, SourceOpener};
pub use syntax::token::{Position, Token, TokenKind};

use std::io::Read;
use std::sync::Arc;

use log::debug;

use runtime::interpreter::Interpreter;
use syntax::ast::Program;

// ─── Public API types ─────────────────────────────────────────────────────────

/// Canvas edge length when none is configured.
pub const DEFAULT_LENGTH: usize = 100;

/// Everything a run can be configured with.
#[derive(Clone)]
pub struct Settings {
    /// Canvas edge length in pixels.
    pub length: usize,
    /// Output scale factor; below 1 is treated as 1.
    pub scale: usize,
    /// Resolves `Load` paths.
    pub opener: Arc<dyn SourceOpener>,
    pub record_frames: bool,
    /// Frame cap, 0 for none.
    pub max_frames: usize,
    /// Run into the root frame before the program.
    pub builtins: Builtins,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            scale: 1,
            opener: Arc::new(NullOpener),
            record_frames: false,
            max_frames: 0,
            builtins: Builtins::standard(),
        }
    }
}

impl Settings {
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_scale(mut self, scale: usize) -> Self {
        self.scale = scale.max(1);
        self
    }

    pub fn with_opener(mut self, opener: impl SourceOpener + 'static) -> Self {
        self.opener = Arc::new(opener);
        self
    }

    /// Turns frame capture on, keeping at most `max` frames (0 = all).
    pub fn with_frames(mut self, max: usize) -> Self {
        self.record_frames = true;
        self.max_frames = max;
        self
    }

    pub fn with_builtins(mut self, builtins: Builtins) -> Self {
        self.builtins = builtins;
        self
    }
}

/// The result of one evaluation. An image is always produced; callers
/// should not trust it unless `is_clean()`.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Final canvas, already scaled.
    pub canvas: Canvas,
    pub frames: Vec<Frame>,
    pub errors: Vec<Error>,
}

impl Outcome {
    /// Nothing executed: a transparent canvas of the output size.
    fn blank(settings: &Settings, errors: Vec<Error>) -> Self {
        Self {
            canvas: Canvas::square(settings.length).scaled(settings.scale),
            frames: Vec::new(),
            errors,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// ─── Public API ───────────────────────────────────────────────────────────────

pub fn tokenize(source: &str, name: &str) -> Vec<Token> {
    syntax::lexer::Lexer::new(source, name).tokenize()
}

/// Parse source text. Stops at the first syntax error.
pub fn parse(source: &str, name: &str) -> Result<Program, Vec<Error>> {
    syntax::parser::Parser::new(tokenize(source, name)).parse()
}

/// Read, parse and run a program. `name` is the file name used in error
/// positions. Invalid UTF-8 is replaced rather than rejected.
pub fn evaluate(mut source: impl Read, name: &str, settings: &Settings) -> Outcome {
    let mut bytes = Vec::new();
    if let Err(e) = source.read_to_end(&mut bytes) {
        let error = Error::Unreadable { name: name.to_string(), message: e.to_string() };
        return Outcome::blank(settings, vec![error]);
    }
    evaluate_str(&String::from_utf8_lossy(&bytes), name, settings)
}

pub fn evaluate_str(source: &str, name: &str, settings: &Settings) -> Outcome {
    let program = match parse(source, name) {
        Ok(program) => program,
        Err(errors) => return Outcome::blank(settings, errors),
    };
    debug!("parsed {name}: {} top-level statements", program.body.len());
    Interpreter::new(settings).run(&program)
}
