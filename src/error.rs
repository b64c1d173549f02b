//! Crate-level error type
//!
//! [`EppError`] unifies the failures of each stage so host code can use `?`
//! from source text to execution. Its `Display` is the stage's own friendly
//! diagnostic, unchanged.

use crate::interpreter::errors::RuntimeError;
use crate::parser::lexer::LexError;
use crate::parser::parse::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EppError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EppError {
    /// True when more input could complete the source (an unclosed block)
    pub fn is_incomplete(&self) -> bool {
        matches!(self, EppError::Parse(err) if err.is_incomplete())
    }

    /// Line the error points at, when it has one
    pub fn line(&self) -> Option<usize> {
        match self {
            EppError::Lex(err) => Some(err.line),
            EppError::Parse(err) => Some(err.line),
            EppError::Runtime(err) => Some(err.line()),
            EppError::Io(_) => None,
        }
    }
}
