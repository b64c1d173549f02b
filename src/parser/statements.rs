//! Statement recognition
//!
//! Each statement line is matched against [`STATEMENT_RULES`] in order and
//! the first phrase that matches builds the node. Order matters because
//! phrasings overlap: `when someone visits ...` must win over the generic
//! `when ... then`, and the assignment forms must win over `add ... to`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::LineRecord;
use crate::parser::parse::{ParseError, Parser, StopSet};
use crate::parser::patterns::{split_arguments, Captures, Phrase};
use crate::parser::suggestions::suggest_command;
use std::sync::OnceLock;

type Builder = fn(&mut Parser, &Captures<'_>, usize) -> Result<Statement, ParseError>;

/// Title used by `create a website ...` when no title is given.
const DEFAULT_WEBSITE_TITLE: &str = "\"E++ Website\"";

const STATEMENT_RULES: &[(&str, Builder)] = &[
    ("set <name> to {value}", build_assign),
    ("let <name> be {value}", build_assign),
    ("put {value} into <name>", build_assign),
    ("say|print|show {value}", build_output),
    ("ask {prompt} and store|save in|as <name>", build_input),
    (
        "create|make|build [a] ( website | web site | web app ) [called {title?}] \
         and store|save [it] in|as <name>",
        build_create_website,
    ),
    (
        "when someone visits {path} on <app> show|send|return {response}",
        build_visit_route,
    ),
    (
        "when someone posts [to] {path} on <app> show|send|return {response}",
        build_post_route,
    ),
    (
        "start [the] web|website server for <app> [on {host?} port {port}]",
        build_start_server,
    ),
    (
        "fetch json from {url} and store|save in|as <name>",
        build_fetch_json,
    ),
    ("fetch from {url} and store|save in|as <name>", build_fetch_text),
    ("create|make list <name>", build_list_create),
    ("add {value} to <name>", build_add),
    ("increase <name> by {value}", build_add),
    ("subtract {value} from <name>", build_subtract),
    ("decrease <name> by {value}", build_subtract),
    ("multiply <name> by {value}", build_multiply),
    ("divide <name> by {value}", build_divide),
    ("remove|take {value} from <name>", build_remove),
    ("if|when {condition} then", build_conditional),
    ("repeat while {condition}", build_repeat_while),
    ("while {condition} do", build_repeat_while),
    ("repeat {count} times", build_repeat_count),
    ("do {count} times", build_repeat_count),
    ("for each|every <item> in {iterable}", build_for_each),
    ("define|function <name> [with {params}]", build_function_define),
    ("stop [repeat|for|loop]", build_break),
    ("break [loop]", build_break),
    ("skip [repeat|for|loop]", build_continue),
    ("next [loop]", build_continue),
    ("( return | give back ) [{value}]", build_return),
    ("call|run <name> [with {args}]", build_call),
];

struct Rule {
    phrase: Phrase,
    build: Builder,
}

fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        STATEMENT_RULES
            .iter()
            .map(|(pattern, build)| Rule {
                phrase: Phrase::compile(pattern),
                build: *build,
            })
            .collect()
    })
}

impl Parser {
    /// Parse one statement line; block statements consume their bodies.
    pub(crate) fn parse_statement(&mut self, record: &LineRecord) -> Result<Statement, ParseError> {
        let text = record.text.trim();
        for rule in rules() {
            if let Some(caps) = rule.phrase.matches(text) {
                return (rule.build)(self, &caps, record.line);
            }
        }

        Err(
            ParseError::new(record.line, format!("I don't understand '{}'.", text))
                .with_suggestion(suggest_command(text)),
        )
    }
}

// ===== Simple statements =====

fn build_assign(_: &mut Parser, caps: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    Ok(Statement::Assign {
        name: caps.text("name"),
        expr: caps.text("value"),
        line,
    })
}

fn build_output(_: &mut Parser, caps: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    Ok(Statement::Output {
        expr: caps.text("value"),
        line,
    })
}

fn build_input(_: &mut Parser, caps: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    Ok(Statement::Input {
        prompt: caps.text("prompt"),
        name: caps.text("name"),
        line,
    })
}

fn build_list_create(
    _: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    Ok(Statement::ListCreate {
        name: caps.text("name"),
        line,
    })
}

fn mutate(op: MutateOp, caps: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    Ok(Statement::ArithmeticMutate {
        op,
        name: caps.text("name"),
        value: caps.text("value"),
        line,
    })
}

fn build_add(_: &mut Parser, caps: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    mutate(MutateOp::Add, caps, line)
}

fn build_subtract(
    _: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    mutate(MutateOp::Subtract, caps, line)
}

fn build_multiply(
    _: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    mutate(MutateOp::Multiply, caps, line)
}

fn build_divide(_: &mut Parser, caps: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    mutate(MutateOp::Divide, caps, line)
}

fn build_remove(_: &mut Parser, caps: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    Ok(Statement::ListRemove {
        value: caps.text("value"),
        name: caps.text("name"),
        line,
    })
}

fn build_break(_: &mut Parser, _: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    Ok(Statement::Break { line })
}

fn build_continue(_: &mut Parser, _: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    Ok(Statement::Continue { line })
}

fn build_return(_: &mut Parser, caps: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    Ok(Statement::Return {
        expr: caps.get("value").map(|v| v.trim().to_string()),
        line,
    })
}

fn build_call(_: &mut Parser, caps: &Captures<'_>, line: usize) -> Result<Statement, ParseError> {
    Ok(Statement::FunctionCall {
        name: caps.text("name"),
        args: split_arguments(caps.get("args").unwrap_or_default()),
        line,
    })
}

// ===== Web phrasings =====
//
// These desugar into assignments and calls against the web builtins.

fn build_create_website(
    _: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    let title = caps
        .get("title")
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| DEFAULT_WEBSITE_TITLE.to_string());
    Ok(Statement::Assign {
        name: caps.text("name"),
        expr: format!("call create_web_app with {}", title),
        line,
    })
}

fn route_call(
    builtin: &str,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    Ok(Statement::FunctionCall {
        name: builtin.to_string(),
        args: vec![caps.text("app"), caps.text("path"), caps.text("response")],
        line,
    })
}

fn build_visit_route(
    _: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    route_call("when_someone_visits", caps, line)
}

fn build_post_route(
    _: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    route_call("when_someone_posts", caps, line)
}

fn build_start_server(
    _: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    let mut args = vec![caps.text("app")];
    if let (Some(host), Some(port)) = (caps.get("host"), caps.get("port")) {
        args.push(host.trim().to_string());
        args.push(port.trim().to_string());
    }
    Ok(Statement::FunctionCall {
        name: "start_web_server".to_string(),
        args,
        line,
    })
}

fn build_fetch_json(
    _: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    Ok(Statement::Assign {
        name: caps.text("name"),
        expr: format!("call fetch_json_from_api with {}", caps.text("url")),
        line,
    })
}

fn build_fetch_text(
    _: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    Ok(Statement::Assign {
        name: caps.text("name"),
        expr: format!("call fetch_from_api with {}", caps.text("url")),
        line,
    })
}

// ===== Block statements =====

fn build_conditional(
    parser: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    parser.parse_conditional(&caps.text("condition"), line)
}

fn build_repeat_while(
    parser: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    let condition = parser.parse_condition(&caps.text("condition"), line);
    let (body, _) = parser.parse_block(StopSet::REPEAT)?;
    Ok(Statement::RepeatWhile {
        condition,
        body,
        line,
    })
}

fn build_repeat_count(
    parser: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    let (body, _) = parser.parse_block(StopSet::REPEAT)?;
    Ok(Statement::RepeatCount {
        count: caps.text("count"),
        body,
        line,
    })
}

fn build_for_each(
    parser: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    let (body, _) = parser.parse_block(StopSet::FOR)?;
    Ok(Statement::ForEach {
        item: caps.text("item"),
        iterable: caps.text("iterable"),
        body,
        line,
    })
}

fn build_function_define(
    parser: &mut Parser,
    caps: &Captures<'_>,
    line: usize,
) -> Result<Statement, ParseError> {
    let params = parser.split_parameters(caps.get("params").unwrap_or_default(), line)?;
    let (body, _) = parser.parse_block(StopSet::DEFINE)?;
    Ok(Statement::FunctionDefine {
        name: caps.text("name"),
        params,
        body,
        line,
    })
}
