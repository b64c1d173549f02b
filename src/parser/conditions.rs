//! Natural-language conditions and parameter lists
//!
//! Conditions are matched against an ordered phrasing table, most specific
//! first: "is greater than or equal to" must be tried before "is greater
//! than", and "is not equal to" before "is not". Text that matches no
//! phrasing becomes a single-operand truthiness test, which is how plain
//! expressions such as `r1 < 1 or r1 > 6` reach the expression evaluator.

use crate::parser::ast::{CompareOp, Condition};
use crate::parser::parse::{ParseError, Parser};
use crate::parser::patterns::{is_identifier, word_spans, Phrase};
use std::sync::OnceLock;

const CONDITION_TABLE: &[(&str, CompareOp)] = &[
    ("{left?} is greater than or equal to {right}", CompareOp::GreaterEqual),
    ("{left?} is less than or equal to {right}", CompareOp::LessEqual),
    ("{left?} is not equal to {right}", CompareOp::NotEqual),
    ("{left?} is equal to {right}", CompareOp::Equal),
    ("{left?} is at least {right}", CompareOp::GreaterEqual),
    ("{left?} is at most {right}", CompareOp::LessEqual),
    ("{left?} does not contain {right}", CompareOp::NotContains),
    ("{left?} contains {right}", CompareOp::Contains),
    ("{left?} is greater than {right}", CompareOp::Greater),
    ("{left?} is bigger than {right}", CompareOp::Greater),
    ("{left?} is less than {right}", CompareOp::Less),
    ("{left?} is smaller than {right}", CompareOp::Less),
    ("{left?} equals {right}", CompareOp::Equal),
    ("{left?} is not {right}", CompareOp::NotEqual),
];

fn condition_phrases() -> &'static [(Phrase, CompareOp)] {
    static PHRASES: OnceLock<Vec<(Phrase, CompareOp)>> = OnceLock::new();
    PHRASES.get_or_init(|| {
        CONDITION_TABLE
            .iter()
            .map(|(pattern, op)| (Phrase::compile(pattern), *op))
            .collect()
    })
}

/// Split `raw` into a condition. Never fails: unmatched text is a
/// truthiness test.
pub fn parse_condition_text(raw: &str, line: usize) -> Condition {
    let text = raw.trim();
    for (phrase, op) in condition_phrases() {
        if let Some(caps) = phrase.matches(text) {
            return Condition {
                left: caps.text("left"),
                op: *op,
                right: Some(caps.text("right")),
                line,
            };
        }
    }

    Condition {
        left: text.to_string(),
        op: CompareOp::Truthy,
        right: None,
        line,
    }
}

impl Parser {
    pub(crate) fn parse_condition(&self, raw: &str, line: usize) -> Condition {
        parse_condition_text(raw, line)
    }

    /// Parameter names after `define f with ...`.
    ///
    /// Comma separated when a comma is present, otherwise separated by the
    /// word "and".
    pub(crate) fn split_parameters(
        &self,
        raw: &str,
        line: usize,
    ) -> Result<Vec<String>, ParseError> {
        let parts: Vec<String> = if raw.contains(',') {
            raw.split(',').map(|p| p.trim().to_string()).collect()
        } else {
            split_on_and(raw)
        };

        let mut params = Vec::new();
        for part in parts {
            if part.is_empty() {
                continue;
            }
            if !is_identifier(&part) {
                return Err(ParseError::new(
                    line,
                    format!("'{}' is not a valid parameter name.", part),
                )
                .with_suggestion("Use names like 'x', 'total', or 'item_count'."));
            }
            if params.contains(&part) {
                return Err(ParseError::new(
                    line,
                    format!("Parameter '{}' appears more than once.", part),
                )
                .with_suggestion("Give each parameter its own name."));
            }
            params.push(part);
        }
        Ok(params)
    }
}

/// Split on interior "and" words; a leading or trailing "and" stays part of
/// its neighbour.
fn split_on_and(raw: &str) -> Vec<String> {
    let text = raw.trim();
    let words = word_spans(text);
    let mut parts = Vec::new();
    let mut start = 0;

    for (index, span) in words.iter().enumerate() {
        let interior = index > 0 && index + 1 < words.len();
        if interior && text[span.clone()].eq_ignore_ascii_case("and") {
            parts.push(text[start..span.start].trim().to_string());
            start = span.end;
        }
    }
    parts.push(text[start..].trim().to_string());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(text: &str) -> (String, CompareOp, Option<String>) {
        let c = parse_condition_text(text, 1);
        (c.left, c.op, c.right)
    }

    #[test]
    fn test_specific_phrasings_win() {
        assert_eq!(
            cond("x is greater than or equal to 10"),
            ("x".into(), CompareOp::GreaterEqual, Some("10".into()))
        );
        assert_eq!(
            cond("x is not equal to y"),
            ("x".into(), CompareOp::NotEqual, Some("y".into()))
        );
        assert_eq!(
            cond("items does not contain 5"),
            ("items".into(), CompareOp::NotContains, Some("5".into()))
        );
        assert_eq!(
            cond("score is at least 80"),
            ("score".into(), CompareOp::GreaterEqual, Some("80".into()))
        );
        assert_eq!(
            cond("name is not \"Bob\""),
            ("name".into(), CompareOp::NotEqual, Some("\"Bob\"".into()))
        );
    }

    #[test]
    fn test_phrasing_keywords_are_case_insensitive() {
        assert_eq!(
            cond("Mode EQUALS \"Easy\""),
            ("Mode".into(), CompareOp::Equal, Some("\"Easy\"".into()))
        );
    }

    #[test]
    fn test_unmatched_text_is_truthy() {
        assert_eq!(
            cond("  r1 < 1 or r1 > 6 "),
            ("r1 < 1 or r1 > 6".into(), CompareOp::Truthy, None)
        );
    }

    #[test]
    fn test_parameters_split_on_commas_or_and() {
        let parser = Parser::from_records(Vec::new());
        assert_eq!(
            parser.split_parameters("a and b", 1).unwrap(),
            vec!["a", "b"]
        );
        assert_eq!(
            parser.split_parameters("a, b ,c", 1).unwrap(),
            vec!["a", "b", "c"]
        );
        assert!(parser.split_parameters("", 1).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_parameter_is_named() {
        let parser = Parser::from_records(Vec::new());
        let err = parser.split_parameters("a, 2b", 4).unwrap_err();
        assert_eq!(err.line, 4);
        assert_eq!(err.message, "'2b' is not a valid parameter name.");
    }

    #[test]
    fn test_duplicate_parameter_is_rejected() {
        let parser = Parser::from_records(Vec::new());
        let err = parser.split_parameters("a and b and a", 2).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.message, "Parameter 'a' appears more than once.");
    }
}
