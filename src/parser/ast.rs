//! Abstract Syntax Tree (AST) definitions for E++ programs
//!
//! Statements keep their expressions as source text. Expression text is
//! parsed lazily by the interpreter (see [`crate::parser::expressions`]),
//! which mirrors how the language treats everything after a statement's
//! keywords as a free-form expression.

use std::fmt;

/// Root of an E++ program
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// In-place update applied by `add`/`increase`, `subtract`/`decrease`,
/// `multiply` and `divide`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutateOp {
    /// Appends when the target is a list, otherwise adds
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MutateOp {
    /// Verb used in "I couldn't ... 'x'" messages
    pub fn describe(&self) -> &'static str {
        match self {
            MutateOp::Add => "add to",
            MutateOp::Subtract => "subtract from",
            MutateOp::Multiply => "multiply",
            MutateOp::Divide => "divide",
        }
    }
}

/// Comparison operators produced by the condition parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    Equal,
    NotEqual,
    Contains,
    NotContains,
    /// Single operand; the left expression's truthiness decides
    Truthy,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Greater => ">",
            CompareOp::Less => "<",
            CompareOp::GreaterEqual => ">=",
            CompareOp::LessEqual => "<=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::Contains => "contains",
            CompareOp::NotContains => "not_contains",
            CompareOp::Truthy => "truthy",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub left: String,
    pub op: CompareOp,
    /// Absent only for [`CompareOp::Truthy`]
    pub right: Option<String>,
    pub line: usize,
}

/// One `otherwise if ... then` branch of a conditional
#[derive(Debug, Clone, PartialEq)]
pub struct ElseIfBranch {
    pub condition: Condition,
    pub body: Vec<Statement>,
    pub line: usize,
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `set x to ...`, `let x be ...`, `put ... into x`
    Assign {
        name: String,
        expr: String,
        line: usize,
    },

    /// `say ...`, `print ...`, `show ...`
    Output { expr: String, line: usize },

    /// `ask ... and store in x`
    Input {
        prompt: String,
        name: String,
        line: usize,
    },

    /// `create list x`
    ListCreate { name: String, line: usize },

    /// `remove ... from x`
    ListRemove {
        value: String,
        name: String,
        line: usize,
    },

    ArithmeticMutate {
        op: MutateOp,
        name: String,
        value: String,
        line: usize,
    },

    Conditional {
        condition: Condition,
        body: Vec<Statement>,
        branches: Vec<ElseIfBranch>,
        else_body: Option<Vec<Statement>>,
        line: usize,
    },

    RepeatCount {
        count: String,
        body: Vec<Statement>,
        line: usize,
    },

    RepeatWhile {
        condition: Condition,
        body: Vec<Statement>,
        line: usize,
    },

    ForEach {
        item: String,
        iterable: String,
        body: Vec<Statement>,
        line: usize,
    },

    FunctionDefine {
        name: String,
        params: Vec<String>,
        body: Vec<Statement>,
        line: usize,
    },

    /// `call f with a, b` (also the target of the web phrasings)
    FunctionCall {
        name: String,
        args: Vec<String>,
        line: usize,
    },

    Return { expr: Option<String>, line: usize },

    Break { line: usize },

    Continue { line: usize },
}

impl Statement {
    pub fn line(&self) -> usize {
        match self {
            Statement::Assign { line, .. }
            | Statement::Output { line, .. }
            | Statement::Input { line, .. }
            | Statement::ListCreate { line, .. }
            | Statement::ListRemove { line, .. }
            | Statement::ArithmeticMutate { line, .. }
            | Statement::Conditional { line, .. }
            | Statement::RepeatCount { line, .. }
            | Statement::RepeatWhile { line, .. }
            | Statement::ForEach { line, .. }
            | Statement::FunctionDefine { line, .. }
            | Statement::FunctionCall { line, .. }
            | Statement::Return { line, .. }
            | Statement::Break { line }
            | Statement::Continue { line } => *line,
        }
    }
}
