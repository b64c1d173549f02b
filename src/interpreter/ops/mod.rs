//! Operator semantics on [`Value`](crate::memory::value::Value)s
//!
//! - [`binary`]: arithmetic, comparison and membership
//! - [`unary`]: negation, unary plus and `not`
//! - [`access`]: indexing into lists, text and maps
//!
//! These are pure functions. The caller attaches the source line and the
//! surrounding message when turning an [`OpError`] into a runtime error.

pub mod access;
pub mod binary;
pub mod unary;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("{0}")]
    Invalid(String),
}

impl OpError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        OpError::Invalid(message.into())
    }
}
