//! Runtime error types for the E++ interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to lex or parse errors).
//!
//! All runtime errors are fatal to the current execution unit: one script run
//! or one REPL submission. The `Display` form is the friendly diagnostic shown
//! to the user.

use thiserror::Error;

/// Broad classification of a [`RuntimeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Name,
    Type,
    Arity,
    DivisionByZero,
    Value,
    RunawayLoop,
    Context,
    Evaluation,
    Io,
}

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A name used inside an expression has no binding
    #[error("Oops! On line {line}, I can't find '{name}'. Try setting it first.")]
    UndefinedName { name: String, line: usize },

    /// The target of an in-place update has no binding
    #[error("Oops! On line {line}, I can't find '{name}'. Try 'set {name} to ...' first.")]
    UndefinedVariable { name: String, line: usize },

    #[error("Oops! On line {line}, I can't find '{name}'. Try defining it first.")]
    UndefinedFunction { name: String, line: usize },

    #[error("Oops! On line {line}, '{name}' is not a function.")]
    NotCallable { name: String, line: usize },

    #[error("Oops! On line {line}, '{name}' is not a list.")]
    NotAList { name: String, line: usize },

    #[error("Oops! On line {line}, {message}")]
    TypeError { message: String, line: usize },

    /// `expected` is a count or a range such as `1 to 3`
    #[error("Oops! On line {line}, Function '{function}' expects {expected} argument(s), but got {got}.")]
    ArgumentCountMismatch {
        function: String,
        expected: String,
        got: usize,
        line: usize,
    },

    #[error("Oops! On line {line}, Division by zero is not allowed.")]
    DivisionByZero { line: usize },

    #[error("Oops! On line {line}, {message}")]
    ValueError { message: String, line: usize },

    #[error("Oops! On line {line}, Function '{name}' called itself too many times.")]
    RecursionTooDeep { name: String, line: usize },

    #[error("Oops! On line {line}, This loop seems to be running forever. Consider adding a stop condition.")]
    RunawayLoop { line: usize },

    /// `return`, `stop` or `skip` with no construct to catch it
    #[error("Oops! On line {line}, I found '{keyword}' outside of a {context}.")]
    OutsideContext {
        keyword: &'static str,
        context: &'static str,
        line: usize,
    },

    #[error("Oops! On line {line}, Function '{name}' failed: {message}")]
    BuiltinFailed {
        name: String,
        message: String,
        line: usize,
    },

    #[error("Oops! On line {line}, I couldn't read the expression '{expression}'.")]
    UnreadableExpression { expression: String, line: usize },

    #[error("Oops! On line {line}, I couldn't evaluate '{expression}': {message}")]
    EvaluationFailed {
        expression: String,
        message: String,
        line: usize,
    },

    #[error("Oops! On line {line}, I couldn't evaluate this condition: {message}")]
    ConditionFailed { message: String, line: usize },

    /// `verb` comes from [`crate::parser::ast::MutateOp::describe`]
    #[error("Oops! On line {line}, I couldn't {verb} '{name}': {message}")]
    MutationFailed {
        verb: &'static str,
        name: String,
        message: String,
        line: usize,
    },

    #[error("Oops! On line {line}, I couldn't read your answer: {message}")]
    InputFailed { message: String, line: usize },
}

impl RuntimeError {
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::UndefinedName { line, .. }
            | RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::UndefinedFunction { line, .. }
            | RuntimeError::NotCallable { line, .. }
            | RuntimeError::NotAList { line, .. }
            | RuntimeError::TypeError { line, .. }
            | RuntimeError::ArgumentCountMismatch { line, .. }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::ValueError { line, .. }
            | RuntimeError::RunawayLoop { line }
            | RuntimeError::RecursionTooDeep { line, .. }
            | RuntimeError::OutsideContext { line, .. }
            | RuntimeError::BuiltinFailed { line, .. }
            | RuntimeError::UnreadableExpression { line, .. }
            | RuntimeError::EvaluationFailed { line, .. }
            | RuntimeError::ConditionFailed { line, .. }
            | RuntimeError::MutationFailed { line, .. }
            | RuntimeError::InputFailed { line, .. } => *line,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::UndefinedName { .. }
            | RuntimeError::UndefinedVariable { .. }
            | RuntimeError::UndefinedFunction { .. } => ErrorKind::Name,
            RuntimeError::NotCallable { .. }
            | RuntimeError::NotAList { .. }
            | RuntimeError::TypeError { .. } => ErrorKind::Type,
            RuntimeError::ArgumentCountMismatch { .. } => ErrorKind::Arity,
            RuntimeError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            RuntimeError::ValueError { .. } => ErrorKind::Value,
            RuntimeError::RunawayLoop { .. } | RuntimeError::RecursionTooDeep { .. } => {
                ErrorKind::RunawayLoop
            }
            RuntimeError::OutsideContext { .. } => ErrorKind::Context,
            RuntimeError::BuiltinFailed { .. }
            | RuntimeError::UnreadableExpression { .. }
            | RuntimeError::EvaluationFailed { .. }
            | RuntimeError::ConditionFailed { .. }
            | RuntimeError::MutationFailed { .. } => ErrorKind::Evaluation,
            RuntimeError::InputFailed { .. } => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_line_numbers() {
        let err = RuntimeError::UndefinedFunction {
            name: "greet".to_string(),
            line: 4,
        };
        assert_eq!(
            err.to_string(),
            "Oops! On line 4, I can't find 'greet'. Try defining it first."
        );
        assert_eq!(err.line(), 4);
        assert_eq!(err.kind(), ErrorKind::Name);
    }

    #[test]
    fn test_outside_context_message() {
        let err = RuntimeError::OutsideContext {
            keyword: "stop",
            context: "loop",
            line: 2,
        };
        assert_eq!(err.to_string(), "Oops! On line 2, I found 'stop' outside of a loop.");
        assert_eq!(err.kind(), ErrorKind::Context);
    }

    #[test]
    fn test_arity_message() {
        let err = RuntimeError::ArgumentCountMismatch {
            function: "add".to_string(),
            expected: "2".to_string(),
            got: 1,
            line: 9,
        };
        assert_eq!(
            err.to_string(),
            "Oops! On line 9, Function 'add' expects 2 argument(s), but got 1."
        );
    }
}
