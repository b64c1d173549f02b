//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the block machinery shared
//! by every statement form: the line cursor, closing-keyword normalization,
//! and stop sets.
//!
//! # Parser Architecture
//!
//! - This module: Parser struct, block parsing, conditionals, errors
//! - `statements`: the ordered phrase table that recognizes one line
//! - `conditions`: natural-language comparisons and parameter lists
//! - `suggestions`: "Did you mean ...?" hints for unknown lines
//!
//! Parser methods are split across files using `impl Parser` blocks.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, LineRecord, Lexer};
use crate::parser::patterns::{canonical, Phrase};
use std::sync::OnceLock;
use thiserror::Error;

/// Parser error type
///
/// `incomplete` marks errors caused only by running out of input inside an
/// open block; an interactive host keeps buffering lines when it is set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Oops! On line {line}, {message}{}", suggestion_suffix(.suggestion))]
pub struct ParseError {
    pub line: usize,
    pub message: String,
    pub suggestion: Option<String>,
    pub incomplete: bool,
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(text) => format!(" {}", text),
        None => String::new(),
    }
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        ParseError {
            line,
            message: message.into(),
            suggestion: None,
            incomplete: false,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }
}

/// Canonical closing keywords for every block kind.
pub(crate) const CLOSING_KEYWORDS: &[&str] =
    &["otherwise", "end if", "end repeat", "end define", "end for"];

/// Branch prefix that also closes the block before it.
pub(crate) const ELSE_IF_PREFIX: &str = "otherwise if ";

const CLOSING_ALIASES: &[(&str, &str)] = &[
    ("else", "otherwise"),
    ("finish if", "end if"),
    ("finish repeat", "end repeat"),
    ("finish for", "end for"),
    ("end function", "end define"),
    ("finish define", "end define"),
    ("finish function", "end define"),
];

const CLOSING_PREFIX_ALIASES: &[(&str, &str)] =
    &[("or if ", ELSE_IF_PREFIX), ("else if ", ELSE_IF_PREFIX)];

/// Closers that end a block, plus whether `otherwise if ...` also ends it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StopSet {
    pub keywords: &'static [&'static str],
    pub else_if: bool,
}

impl StopSet {
    pub const TOP_LEVEL: StopSet = StopSet {
        keywords: &[],
        else_if: false,
    };
    pub const REPEAT: StopSet = StopSet {
        keywords: &["end repeat"],
        else_if: false,
    };
    pub const FOR: StopSet = StopSet {
        keywords: &["end for"],
        else_if: false,
    };
    pub const DEFINE: StopSet = StopSet {
        keywords: &["end define"],
        else_if: false,
    };
    pub const IF_BODY: StopSet = StopSet {
        keywords: &["otherwise", "end if"],
        else_if: true,
    };
    pub const ELSE_BODY: StopSet = StopSet {
        keywords: &["end if"],
        else_if: false,
    };

    fn is_empty(&self) -> bool {
        self.keywords.is_empty() && !self.else_if
    }

    fn accepts(&self, closer: &str) -> bool {
        self.keywords.contains(&closer) || (self.else_if && closer.starts_with(ELSE_IF_PREFIX))
    }

    /// "end if or otherwise or otherwise if..."
    fn describe(&self) -> String {
        let mut parts: Vec<String> = self.keywords.iter().map(|k| k.to_string()).collect();
        parts.sort();
        if self.else_if {
            parts.push(format!("{}...", ELSE_IF_PREFIX.trim_end()));
        }
        parts.join(" or ")
    }
}

/// The line that ended a block.
#[derive(Debug, Clone)]
pub(crate) struct Closer {
    /// Trimmed source text, case preserved
    pub text: String,
    /// Normalized closing form, e.g. "end if" or "otherwise if x then"
    pub canonical: String,
    pub line: usize,
}

/// Case-fold, collapse whitespace and resolve closing aliases.
pub(crate) fn normalize_closer(text: &str) -> String {
    let folded = canonical(text);
    let resolved = CLOSING_ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, target)| target.to_string())
        .unwrap_or(folded);

    for (alias, target) in CLOSING_PREFIX_ALIASES {
        if let Some(rest) = resolved.strip_prefix(alias) {
            return format!("{}{}", target, rest);
        }
    }
    resolved
}

pub(crate) fn is_closing_keyword(normalized: &str) -> bool {
    CLOSING_KEYWORDS.contains(&normalized) || normalized.starts_with(ELSE_IF_PREFIX)
}

fn else_if_phrase() -> &'static Phrase {
    static PHRASE: OnceLock<Phrase> = OnceLock::new();
    PHRASE.get_or_init(|| Phrase::compile("( otherwise | or | else ) if {condition} then"))
}

/// Line-oriented recursive descent parser for E++
pub struct Parser {
    pub(crate) records: Vec<LineRecord>,
    pub(crate) position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, LexError> {
        let records = Lexer::new(source).tokenize()?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<LineRecord>) -> Self {
        Parser {
            records,
            position: 0,
        }
    }

    /// Parse the whole input as a top-level block.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let (statements, _) = self.parse_block(StopSet::TOP_LEVEL)?;
        Ok(Program::new(statements))
    }

    /// Parse statements until a closer from `stop` appears.
    ///
    /// Returns the closer that ended the block, or `None` at end of input
    /// for the top-level block. Any other closer is a structural error.
    pub(crate) fn parse_block(
        &mut self,
        stop: StopSet,
    ) -> Result<(Vec<Statement>, Option<Closer>), ParseError> {
        let mut statements = Vec::new();

        while let Some(record) = self.advance() {
            if !record.is_statement() {
                continue;
            }

            let normalized = normalize_closer(&record.text);
            if stop.accepts(&normalized) {
                let closer = Closer {
                    text: record.text.trim().to_string(),
                    canonical: normalized,
                    line: record.line,
                };
                return Ok((statements, Some(closer)));
            }

            if is_closing_keyword(&normalized) {
                let suggestion = if stop.is_empty() {
                    "This closing word does not match any open block.".to_string()
                } else {
                    format!("I expected {} before this line.", stop.describe())
                };
                return Err(ParseError::new(
                    record.line,
                    format!("'{}' is out of place.", record.text.trim()),
                )
                .with_suggestion(suggestion));
            }

            statements.push(self.parse_statement(&record)?);
        }

        if stop.is_empty() {
            return Ok((statements, None));
        }

        let line = self.records.last().map(|r| r.line).unwrap_or(1);
        Err(ParseError {
            line,
            message: format!(
                "I reached the end of the file, but I'm still waiting for {}.",
                stop.describe()
            ),
            suggestion: None,
            incomplete: true,
        })
    }

    /// Parse the bodies of an `if ... then` statement whose header was on
    /// `line`: the if-body, any number of else-if branches, and an optional
    /// else-body.
    pub(crate) fn parse_conditional(
        &mut self,
        condition_text: &str,
        line: usize,
    ) -> Result<Statement, ParseError> {
        let condition = self.parse_condition(condition_text, line);
        let (body, mut closer) = self.parse_block(StopSet::IF_BODY)?;

        let mut branches = Vec::new();
        while let Some(end) = closer.take() {
            if !end.canonical.starts_with(ELSE_IF_PREFIX) {
                closer = Some(end);
                break;
            }

            // The raw text keeps the case of string literals in the condition.
            let branch_text = else_if_phrase()
                .matches(&end.text)
                .map(|caps| caps.text("condition"))
                .ok_or_else(|| {
                    ParseError::new(
                        end.line,
                        "I expected 'otherwise if ... then' or 'or if ... then'.",
                    )
                    .with_suggestion("Try: otherwise if x equals 10 then")
                })?;

            let branch_condition = self.parse_condition(&branch_text, end.line);
            let (branch_body, next) = self.parse_block(StopSet::IF_BODY)?;
            branches.push(ElseIfBranch {
                condition: branch_condition,
                body: branch_body,
                line: end.line,
            });
            closer = next;
        }

        let else_body = match closer {
            Some(end) if end.canonical == "otherwise" => {
                let (else_body, _) = self.parse_block(StopSet::ELSE_BODY)?;
                Some(else_body)
            }
            _ => None,
        };

        Ok(Statement::Conditional {
            condition,
            body,
            branches,
            else_body,
            line,
        })
    }

    // ===== Helper methods =====

    pub(crate) fn advance(&mut self) -> Option<LineRecord> {
        let record = self.records.get(self.position).cloned();
        if record.is_some() {
            self.position += 1;
        }
        record
    }
}
