//! E++ source parser
//!
//! This module transforms E++ source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: line classification (source text → line records)
//! - [`parse`]: block structure and the [`parse::Parser`] coordinator
//! - [`statements`]: the ordered statement phrase table
//! - [`conditions`]: natural-language comparisons
//! - [`expressions`]: the expression grammar used at evaluation time
//! - [`ast`]: AST node definitions
//!
//! # Parser Implementation
//!
//! Statements are recognized by matching whole lines against word-level
//! phrase patterns ([`patterns`]) in a fixed priority order. Blocks are
//! parsed by recursive descent with a stop set of closing keywords.

pub mod ast;
pub mod conditions;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod patterns;
pub mod statements;
pub mod suggestions;

use crate::error::EppError;
use ast::Program;
use parse::Parser;

/// Tokenize and parse `source` into a program.
pub fn parse_source(source: &str) -> Result<Program, EppError> {
    let mut parser = Parser::new(source)?;
    Ok(parser.parse_program()?)
}
