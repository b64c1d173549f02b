//! "Did you mean ...?" hints for lines the parser does not understand
//!
//! The offending line is compared against a catalogue of command keys with
//! a matching-blocks similarity ratio (`2 * matched / total length`). The
//! whole line is tried first, then its first two words.

use crate::parser::patterns::canonical;

/// Minimum similarity for a hint to be offered.
const SIMILARITY_CUTOFF: f64 = 0.45;

const FALLBACK_HINT: &str = "Try commands like 'set x to 10' or 'say \"Hello\"'.";

/// Command keys and the example offered for each.
const COMMAND_EXAMPLES: &[(&str, &str)] = &[
    ("set", "set x to 10"),
    ("let", "let x be 10"),
    ("put", "put 10 into x"),
    ("say", "say \"Hello World\""),
    ("print", "print \"Hello World\""),
    ("show", "show \"Hello World\""),
    ("add", "add 5 to x"),
    ("increase", "increase x by 5"),
    ("subtract", "subtract 3 from x"),
    ("decrease", "decrease x by 3"),
    ("multiply", "multiply x by 2"),
    ("divide", "divide x by 4"),
    ("if", "if x is greater than 10 then"),
    ("when", "when x is greater than 10 then"),
    ("otherwise", "otherwise"),
    ("else", "else"),
    ("otherwise if", "otherwise if x is less than 5 then"),
    ("or if", "or if x is less than 5 then"),
    ("repeat", "repeat 5 times"),
    ("do", "do 5 times"),
    ("for each", "for each item in mylist"),
    ("for every", "for every item in mylist"),
    ("define", "define greet with name"),
    ("function", "function greet with name"),
    ("return", "return x"),
    ("give back", "give back x"),
    ("call", "call greet with \"Alice\""),
    ("run", "run greet with \"Alice\""),
    ("create list", "create list mylist"),
    ("make list", "make list mylist"),
    ("remove", "remove 5 from mylist"),
    ("take", "take 5 from mylist"),
    ("ask", "ask \"What is your name?\" and store in name"),
    (
        "create website",
        "create a website called \"My Site\" and store in app",
    ),
    (
        "when someone visits",
        "when someone visits \"/\" on app show \"Hello\"",
    ),
    (
        "when someone posts",
        "when someone posts \"/submit\" on app show \"Done\"",
    ),
    (
        "start web server",
        "start web server for app on \"127.0.0.1\" port 5000",
    ),
    (
        "fetch from",
        "fetch from \"https://example.com\" and store in text",
    ),
    (
        "fetch json from",
        "fetch json from \"https://api.example.com/data\" and store in data",
    ),
    ("stop", "stop repeat"),
    ("break", "break loop"),
    ("skip", "skip repeat"),
    ("next", "next loop"),
    ("end if", "end if"),
    ("finish if", "finish if"),
    ("end repeat", "end repeat"),
    ("finish repeat", "finish repeat"),
    ("end define", "end define"),
    ("end function", "end function"),
    ("finish function", "finish function"),
    ("end for", "end for"),
    ("finish for", "finish for"),
];

/// The hint sentence for an unrecognized line.
pub fn suggest_command(line_text: &str) -> String {
    let command = canonical(line_text);
    let first_two = command
        .split(' ')
        .take(2)
        .collect::<Vec<_>>()
        .join(" ");

    closest_example(&command)
        .or_else(|| closest_example(&first_two))
        .map(|example| format!("Did you mean '{}'?", example))
        .unwrap_or_else(|| FALLBACK_HINT.to_string())
}

fn closest_example(candidate: &str) -> Option<&'static str> {
    let mut best: Option<(f64, &'static str)> = None;
    for (key, example) in COMMAND_EXAMPLES {
        let score = similarity(candidate, key);
        if score < SIMILARITY_CUTOFF {
            continue;
        }
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, example));
        }
    }
    best.map(|(_, example)| example)
}

/// Similarity in `0.0..=1.0` based on recursively matched common blocks.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, length) = longest_common_block(a, b);
    if length == 0 {
        return 0;
    }
    length
        + matched_chars(&a[..start_a], &b[..start_b])
        + matched_chars(&a[start_a + length..], &b[start_b + length..])
}

fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut current = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                current[j + 1] = previous[j] + 1;
                if current[j + 1] > best.2 {
                    best = (i + 1 - current[j + 1], j + 1 - current[j + 1], current[j + 1]);
                }
            }
        }
        previous = current;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("say", "say"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert!((similarity("sya", "say") - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_typo_gets_example() {
        assert_eq!(suggest_command("sya"), "Did you mean 'say \"Hello World\"'?");
        assert_eq!(suggest_command("increse"), "Did you mean 'increase x by 5'?");
    }

    #[test]
    fn test_first_two_words_are_tried() {
        assert_eq!(
            suggest_command("creat list with lots of extra words here"),
            "Did you mean 'create list mylist'?"
        );
    }

    #[test]
    fn test_unrelated_text_gets_fallback() {
        assert_eq!(suggest_command("zzzzzzzzzzzzzzzz qqqqqqqqqq"), FALLBACK_HINT);
    }
}
