use thiserror::Error;

use crate::syntax::token::Position;

/// Error codes prefixed by phase: P = parser, E = evaluation, I = source I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    P001, // syntax error

    E001, // identifier not found
    E002, // command not found
    E003, // number not found
    E004, // division by zero

    I001, // `Load` target could not be opened
    I002, // program or built-in stream could not be read
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P001 => "P001",
            Self::E001 => "E001",
            Self::E002 => "E002",
            Self::E003 => "E003",
            Self::E004 => "E004",
            Self::I001 => "I001",
            Self::I002 => "I002",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// Everything that can go wrong in one evaluation. Errors are collected in
/// order, never thrown; only a syntax error in the top-level program stops
/// execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{pos}: syntax error")]
    Syntax { pos: Position },

    #[error("{pos}: Identifier not found: {name}")]
    IdentifierNotFound { pos: Position, name: String },

    #[error("{pos}: Command not found: {name}")]
    CommandNotFound { pos: Position, name: String },

    #[error("{pos}: Number not found: {name}")]
    NumberNotFound { pos: Position, name: String },

    #[error("{pos}: Division by zero")]
    DivisionByZero { pos: Position },

    #[error("{pos}: {message}")]
    SourceUnavailable { pos: Position, message: String },

    #[error("{name}: {message}")]
    Unreadable { name: String, message: String },
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Syntax { .. }             => ErrorCode::P001,
            Self::IdentifierNotFound { .. } => ErrorCode::E001,
            Self::CommandNotFound { .. }    => ErrorCode::E002,
            Self::NumberNotFound { .. }     => ErrorCode::E003,
            Self::DivisionByZero { .. }     => ErrorCode::E004,
            Self::SourceUnavailable { .. }  => ErrorCode::I001,
            Self::Unreadable { .. }         => ErrorCode::I002,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::Syntax { pos }
            | Self::IdentifierNotFound { pos, .. }
            | Self::CommandNotFound { pos, .. }
            | Self::NumberNotFound { pos, .. }
            | Self::DivisionByZero { pos }
            | Self::SourceUnavailable { pos, .. } => Some(pos),
            Self::Unreadable { .. } => None,
        }
    }
}
