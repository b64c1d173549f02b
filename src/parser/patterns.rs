//! Word-level phrase matching
//!
//! Statement and condition recognition is table driven. Each table entry is a
//! small phrase pattern such as `"put {value} into <name>"`, compiled once and
//! matched against a whole source line:
//!
//! - `say|print|show` matches one word from the alternatives (ASCII
//!   case-insensitive)
//! - `<slot>` captures a single identifier-shaped word
//! - `{slot}` captures one or more words, preferring the longest run
//! - `{slot?}` captures one or more words, preferring the shortest run
//! - `[ ... ]` is optional, tried present-first
//! - `( a b | c )` chooses between word sequences, tried left to right
//!
//! Captures are byte ranges of the matched line, so the captured text keeps
//! its original case and inner spacing.

use std::ops::Range;

#[derive(Debug, Clone)]
enum Atom {
    Word(Vec<&'static str>),
    Name(&'static str),
    Text { slot: &'static str, lazy: bool },
}

#[derive(Debug, Clone)]
enum Node {
    Atom(Atom),
    Optional(Vec<Node>),
    Choice(Vec<Vec<Node>>),
}

/// A compiled phrase pattern.
#[derive(Debug, Clone)]
pub struct Phrase {
    source: &'static str,
    alternatives: Vec<Vec<Atom>>,
}

/// Slots captured by a successful [`Phrase::matches`].
#[derive(Debug, Clone)]
pub struct Captures<'t> {
    text: &'t str,
    spans: Vec<(&'static str, Range<usize>)>,
}

impl<'t> Captures<'t> {
    pub fn get(&self, slot: &str) -> Option<&'t str> {
        self.spans
            .iter()
            .find(|(name, _)| *name == slot)
            .map(|(_, range)| &self.text[range.clone()])
    }

    /// Captured text for a slot that every alternative of the phrase binds.
    pub fn text(&self, slot: &str) -> String {
        self.get(slot).unwrap_or_default().trim().to_string()
    }
}

impl Phrase {
    pub fn compile(source: &'static str) -> Self {
        let tokens = pattern_tokens(source);
        let mut position = 0;
        let nodes = parse_sequence(&tokens, &mut position);
        Phrase {
            source,
            alternatives: expand(&nodes),
        }
    }

    /// Match the whole of `text`, returning the captured slots.
    pub fn matches<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        let words = word_spans(text);
        let mut spans = Vec::new();
        for atoms in &self.alternatives {
            spans.clear();
            if match_atoms(atoms, &words, text, &mut spans) {
                return Some(Captures { text, spans });
            }
        }
        None
    }
}

/// Byte ranges of the whitespace-separated words in `text`.
pub fn word_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (index, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(begin) = start.take() {
                spans.push(begin..index);
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        spans.push(begin..text.len());
    }
    spans
}

pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Lowercased text with runs of whitespace collapsed to one space.
pub fn canonical(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split an argument list on top-level commas.
///
/// Commas inside quoted text or inside `()`, `[]` and `{}` groups do not
/// split. Empty pieces are dropped.
pub fn split_arguments(raw: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut chunk = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for ch in raw.trim().chars() {
        if let Some(open) = quote {
            chunk.push(ch);
            if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                chunk.push(ch);
            }
            '(' | '[' | '{' => {
                depth += 1;
                chunk.push(ch);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                chunk.push(ch);
            }
            ',' if depth == 0 => {
                let candidate = chunk.trim();
                if !candidate.is_empty() {
                    arguments.push(candidate.to_string());
                }
                chunk.clear();
            }
            _ => chunk.push(ch),
        }
    }

    let candidate = chunk.trim();
    if !candidate.is_empty() {
        arguments.push(candidate.to_string());
    }
    arguments
}

// ===== Pattern compilation =====

fn pattern_tokens(source: &'static str) -> Vec<&'static str> {
    let mut tokens = Vec::new();
    for word in source.split_whitespace() {
        let mut rest = word;
        while !rest.is_empty() {
            let split = rest
                .find(|c| matches!(c, '[' | ']' | '(' | ')'))
                .unwrap_or(rest.len());
            if split == 0 {
                tokens.push(&rest[..1]);
                rest = &rest[1..];
            } else {
                tokens.push(&rest[..split]);
                rest = &rest[split..];
            }
        }
    }
    tokens
}

fn parse_sequence(tokens: &[&'static str], position: &mut usize) -> Vec<Node> {
    let mut nodes = Vec::new();
    while let Some(&token) = tokens.get(*position) {
        match token {
            "]" | ")" | "|" => break,
            "[" => {
                *position += 1;
                let inner = parse_sequence(tokens, position);
                if tokens.get(*position) == Some(&"]") {
                    *position += 1;
                }
                nodes.push(Node::Optional(inner));
            }
            "(" => {
                *position += 1;
                let mut branches = vec![parse_sequence(tokens, position)];
                while tokens.get(*position) == Some(&"|") {
                    *position += 1;
                    branches.push(parse_sequence(tokens, position));
                }
                if tokens.get(*position) == Some(&")") {
                    *position += 1;
                }
                nodes.push(Node::Choice(branches));
            }
            _ => {
                *position += 1;
                nodes.push(Node::Atom(parse_atom(token)));
            }
        }
    }
    nodes
}

fn parse_atom(token: &'static str) -> Atom {
    if let Some(slot) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Atom::Name(slot);
    }
    if let Some(inner) = token.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
        return match inner.strip_suffix('?') {
            Some(slot) => Atom::Text { slot, lazy: true },
            None => Atom::Text {
                slot: inner,
                lazy: false,
            },
        };
    }
    Atom::Word(token.split('|').collect())
}

/// Flatten optional and choice nodes into plain atom sequences, preserving
/// the order in which they should be tried.
fn expand(nodes: &[Node]) -> Vec<Vec<Atom>> {
    let mut results: Vec<Vec<Atom>> = vec![Vec::new()];
    for node in nodes {
        let options: Vec<Vec<Atom>> = match node {
            Node::Atom(atom) => vec![vec![atom.clone()]],
            Node::Optional(inner) => {
                let mut present = expand(inner);
                present.push(Vec::new());
                present
            }
            Node::Choice(branches) => branches.iter().flat_map(|b| expand(b)).collect(),
        };

        let mut next = Vec::with_capacity(results.len() * options.len());
        for prefix in &results {
            for option in &options {
                let mut combined = prefix.clone();
                combined.extend(option.iter().cloned());
                next.push(combined);
            }
        }
        results = next;
    }
    results
}

// ===== Matching =====

fn match_atoms(
    atoms: &[Atom],
    words: &[Range<usize>],
    text: &str,
    spans: &mut Vec<(&'static str, Range<usize>)>,
) -> bool {
    let Some((atom, rest)) = atoms.split_first() else {
        return words.is_empty();
    };

    match atom {
        Atom::Word(options) => match words.first() {
            Some(span) => {
                let word = &text[span.clone()];
                options.iter().any(|o| o.eq_ignore_ascii_case(word))
                    && match_atoms(rest, &words[1..], text, spans)
            }
            None => false,
        },
        Atom::Name(slot) => match words.first() {
            Some(span) if is_identifier(&text[span.clone()]) => {
                spans.push((*slot, span.clone()));
                if match_atoms(rest, &words[1..], text, spans) {
                    return true;
                }
                spans.pop();
                false
            }
            _ => false,
        },
        Atom::Text { slot, lazy } => {
            let count = words.len();
            let lengths: Vec<usize> = if *lazy {
                (1..=count).collect()
            } else {
                (1..=count).rev().collect()
            };
            for length in lengths {
                let range = words[0].start..words[length - 1].end;
                spans.push((*slot, range));
                if match_atoms(rest, &words[length..], text, spans) {
                    return true;
                }
                spans.pop();
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_words_are_case_insensitive() {
        let phrase = Phrase::compile("set <name> to {value}");
        let caps = phrase.matches("SET Total To 10 + 2").unwrap();
        assert_eq!(caps.get("name"), Some("Total"));
        assert_eq!(caps.get("value"), Some("10 + 2"));
    }

    #[test]
    fn test_greedy_capture_takes_last_separator() {
        let phrase = Phrase::compile("put {value} into <name>");
        let caps = phrase.matches("put \"into\" into box").unwrap();
        assert_eq!(caps.get("value"), Some("\"into\""));
        assert_eq!(caps.get("name"), Some("box"));
    }

    #[test]
    fn test_lazy_capture_takes_first_separator() {
        let phrase = Phrase::compile("{left?} equals {right}");
        let caps = phrase.matches("a equals b equals c").unwrap();
        assert_eq!(caps.get("left"), Some("a"));
        assert_eq!(caps.get("right"), Some("b equals c"));
    }

    #[test]
    fn test_optional_and_choice_groups() {
        let phrase = Phrase::compile(
            "create|make [a] ( website | web site ) [called {title?}] and store <name>",
        );
        let caps = phrase.matches("make a web site and store app").unwrap();
        assert_eq!(caps.get("title"), None);
        assert_eq!(caps.get("name"), Some("app"));

        let caps = phrase
            .matches("create website called \"My  Site\" and store app")
            .unwrap();
        assert_eq!(caps.get("title"), Some("\"My  Site\""));
    }

    #[test]
    fn test_name_slot_rejects_non_identifiers() {
        let phrase = Phrase::compile("create list <name>");
        assert!(phrase.matches("create list 9lives").is_none());
        assert!(phrase.matches("create list my list").is_none());
    }

    #[test]
    fn test_split_arguments_respects_quotes_and_nesting() {
        let args = split_arguments(r#"app, "a, b", [1, 2], f(3, 4) , "#);
        assert_eq!(args, vec!["app", "\"a, b\"", "[1, 2]", "f(3, 4)"]);
        assert!(split_arguments("   ").is_empty());
    }

    #[test]
    fn test_canonical_collapses_whitespace() {
        assert_eq!(canonical("  End    IF "), "end if");
    }
}
