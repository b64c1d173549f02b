//! Line tokenizer for E++ source
//!
//! E++ is line-oriented, so the lexer does not split statements into words.
//! It turns raw text into one [`LineRecord`] per source line and classifies
//! each line as blank, comment (`#`), or statement. Statement recognition is
//! entirely the parser's job.

use thiserror::Error;

/// Classification of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Statement,
}

/// One source line with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub line: usize,
    pub text: String,
    pub kind: LineKind,
}

impl LineRecord {
    pub fn is_statement(&self) -> bool {
        self.kind == LineKind::Statement
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Oops! On line {line}, {message}")]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

/// Lexer for E++ source text
pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Split the source into classified line records.
    pub fn tokenize(&self) -> Result<Vec<LineRecord>, LexError> {
        let mut records = Vec::new();

        for (index, raw_line) in self.source.lines().enumerate() {
            let line = index + 1;
            let text = if line == 1 {
                raw_line.trim_start_matches('\u{feff}')
            } else {
                raw_line
            };

            if text.contains('\0') {
                return Err(LexError {
                    line,
                    message: "I found an invalid null character.".to_string(),
                });
            }

            let trimmed = text.trim();
            let kind = if trimmed.is_empty() {
                LineKind::Blank
            } else if trimmed.starts_with('#') {
                LineKind::Comment
            } else {
                LineKind::Statement
            };

            records.push(LineRecord {
                line,
                text: text.to_string(),
                kind,
            });
        }

        Ok(records)
    }
}

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(source: &str) -> Result<Vec<LineRecord>, LexError> {
    Lexer::new(source).tokenize()
}
