//! Expression parsing implementation
//!
//! Statement nodes carry their expressions as text. This module turns that
//! text into an [`Expr`] tree using precedence climbing, one function per
//! level.
//!
//! # Supported Expressions
//!
//! - Literals: integers, floats, `'...'`/`"..."` strings, `true`, `false`,
//!   `nothing` (`none` also accepted, any case)
//! - Lists `[a, b]` and maps `{"k": v}`
//! - Arithmetic: `+ - * / // % **`
//! - Comparison: `< <= > >= == != in`, `not in`
//! - Boolean: `and`, `or`, `not` (short-circuiting)
//! - Postfix: calls `f(a, b)` and indexing `x[i]`
//!
//! # Precedence
//!
//! Lowest to highest: `or`, `and`, `not`, comparisons, `+ -`,
//! `* / // %`, unary `- +`, `**` (right associative), postfix.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    In,
    NotIn,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::LessEq => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEq => ">=",
            BinOp::In => "in",
            BinOp::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Name(String),
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
}

/// The expression text could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExprSyntaxError {
    pub message: String,
}

impl ExprSyntaxError {
    fn new(message: impl Into<String>) -> Self {
        ExprSyntaxError {
            message: message.into(),
        }
    }
}

// ===== Lexer =====

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Text(String),
    Ident(String),
    Symbol(&'static str),
}

const SYMBOLS: &[&str] = &[
    "**", "//", "==", "!=", "<=", ">=", "+", "-", "*", "/", "%", "<", ">", "(", ")", "[", "]",
    "{", "}", ",", ":",
];

fn tokenize(text: &str) -> Result<Vec<Token>, ExprSyntaxError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()))
        {
            let start = i;
            let mut is_float = false;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '_') {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' {
                is_float = true;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    is_float = true;
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let literal: String = chars[start..i].iter().filter(|c| **c != '_').collect();
            let token = if is_float {
                literal
                    .parse::<f64>()
                    .map(Token::Float)
                    .map_err(|_| ExprSyntaxError::new(format!("bad number '{}'", literal)))?
            } else {
                literal
                    .parse::<i64>()
                    .map(Token::Int)
                    .map_err(|_| ExprSyntaxError::new(format!("number '{}' is too large", literal)))?
            };
            tokens.push(token);
            continue;
        }

        if c == '"' || c == '\'' {
            let quote = c;
            let mut value = String::new();
            i += 1;
            loop {
                let Some(&ch) = chars.get(i) else {
                    return Err(ExprSyntaxError::new("unterminated text"));
                };
                i += 1;
                if ch == quote {
                    break;
                }
                if ch == '\\' {
                    let Some(&escaped) = chars.get(i) else {
                        return Err(ExprSyntaxError::new("unterminated text"));
                    };
                    i += 1;
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '0' => value.push('\0'),
                        '\\' | '"' | '\'' => value.push(escaped),
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                } else {
                    value.push(ch);
                }
            }
            tokens.push(Token::Text(value));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        let rest: String = chars[i..chars.len().min(i + 2)].iter().collect();
        match SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            Some(symbol) => {
                tokens.push(Token::Symbol(*symbol));
                i += symbol.chars().count();
            }
            None => {
                return Err(ExprSyntaxError::new(format!("unexpected character '{}'", c)));
            }
        }
    }

    Ok(tokens)
}

// ===== Parser =====

/// Parse a complete expression.
pub fn parse_expression(text: &str) -> Result<Expr, ExprSyntaxError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(ExprSyntaxError::new("the expression is empty"));
    }
    let mut parser = ExprParser {
        tokens,
        position: 0,
    };
    let expr = parser.parse_or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ExprSyntaxError::new(format!(
            "unexpected {}",
            describe(token)
        ))),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Int(n) => format!("number {}", n),
        Token::Float(n) => format!("number {}", n),
        Token::Text(t) => format!("text \"{}\"", t),
        Token::Ident(name) => format!("word '{}'", name),
        Token::Symbol(s) => format!("'{}'", s),
    }
}

struct ExprParser {
    tokens: Vec<Token>,
    position: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    fn check_symbol(&self, symbol: &str) -> bool {
        matches!(self.peek(), Some(Token::Symbol(s)) if *s == symbol)
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(word)) if word.eq_ignore_ascii_case(keyword))
    }

    fn match_symbol(&mut self, symbol: &str) -> bool {
        if self.check_symbol(symbol) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, keyword: &str) -> bool {
        if self.check_keyword(keyword) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<(), ExprSyntaxError> {
        if self.match_symbol(symbol) {
            return Ok(());
        }
        let found = self
            .peek()
            .map(describe)
            .unwrap_or_else(|| "the end".to_string());
        Err(ExprSyntaxError::new(format!(
            "expected '{}' but found {}",
            symbol, found
        )))
    }

    /// Parse logical OR
    fn parse_or(&mut self) -> Result<Expr, ExprSyntaxError> {
        let mut left = self.parse_and()?;
        while self.match_keyword("or") {
            let right = self.parse_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Parse logical AND
    fn parse_and(&mut self) -> Result<Expr, ExprSyntaxError> {
        let mut left = self.parse_not()?;
        while self.match_keyword("and") {
            let right = self.parse_not()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ExprSyntaxError> {
        if self.match_keyword("not") {
            let operand = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprSyntaxError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.match_symbol("==") {
                BinOp::Eq
            } else if self.match_symbol("!=") {
                BinOp::NotEq
            } else if self.match_symbol("<=") {
                BinOp::LessEq
            } else if self.match_symbol(">=") {
                BinOp::GreaterEq
            } else if self.match_symbol("<") {
                BinOp::Less
            } else if self.match_symbol(">") {
                BinOp::Greater
            } else if self.match_keyword("in") {
                BinOp::In
            } else if self.check_keyword("not")
                && matches!(self.peek_ahead(1), Some(Token::Ident(w)) if w.eq_ignore_ascii_case("in"))
            {
                self.position += 2;
                BinOp::NotIn
            } else {
                break;
            };
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprSyntaxError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.match_symbol("+") {
                BinOp::Add
            } else if self.match_symbol("-") {
                BinOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprSyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.match_symbol("*") {
                BinOp::Mul
            } else if self.match_symbol("//") {
                BinOp::FloorDiv
            } else if self.match_symbol("/") {
                BinOp::Div
            } else if self.match_symbol("%") {
                BinOp::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprSyntaxError> {
        let op = if self.match_symbol("-") {
            UnaryOp::Neg
        } else if self.match_symbol("+") {
            UnaryOp::Plus
        } else {
            return self.parse_power();
        };
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// `**` binds tighter than a unary minus on its left: `-2 ** 2` is -4
    fn parse_power(&mut self) -> Result<Expr, ExprSyntaxError> {
        let base = self.parse_postfix()?;
        if self.match_symbol("**") {
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprSyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.match_symbol("(") {
                let args = self.parse_list_items(")")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.match_symbol("[") {
                let index = self.parse_or()?;
                self.expect_symbol("]")?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Comma separated expressions up to `close`; a trailing comma is allowed.
    fn parse_list_items(&mut self, close: &str) -> Result<Vec<Expr>, ExprSyntaxError> {
        let mut items = Vec::new();
        while !self.check_symbol(close) {
            items.push(self.parse_or()?);
            if !self.match_symbol(",") {
                break;
            }
        }
        self.expect_symbol(close)?;
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprSyntaxError> {
        let Some(token) = self.peek().cloned() else {
            return Err(ExprSyntaxError::new("the expression ended too early"));
        };
        self.position += 1;

        match token {
            Token::Int(n) => Ok(Expr::Literal(Literal::Int(n))),
            Token::Float(n) => Ok(Expr::Literal(Literal::Float(n))),
            Token::Text(text) => Ok(Expr::Literal(Literal::Text(text))),
            Token::Ident(name) => Ok(match name.to_ascii_lowercase().as_str() {
                "true" => Expr::Literal(Literal::Bool(true)),
                "false" => Expr::Literal(Literal::Bool(false)),
                "nothing" | "none" => Expr::Literal(Literal::Nothing),
                "and" | "or" | "not" | "in" => {
                    return Err(ExprSyntaxError::new(format!("unexpected word '{}'", name)));
                }
                _ => Expr::Name(name),
            }),
            Token::Symbol("(") => {
                let inner = self.parse_or()?;
                self.expect_symbol(")")?;
                Ok(inner)
            }
            Token::Symbol("[") => Ok(Expr::List(self.parse_list_items("]")?)),
            Token::Symbol("{") => {
                let mut entries = Vec::new();
                while !self.check_symbol("}") {
                    let key = self.parse_or()?;
                    self.expect_symbol(":")?;
                    let value = self.parse_or()?;
                    entries.push((key, value));
                    if !self.match_symbol(",") {
                        break;
                    }
                }
                self.expect_symbol("}")?;
                Ok(Expr::Map(entries))
            }
            other => Err(ExprSyntaxError::new(format!("unexpected {}", describe(&other)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Expr {
        Expr::Literal(Literal::Int(n))
    }

    fn name(n: &str) -> Expr {
        Expr::Name(n.to_string())
    }

    fn bin(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(
            parse_expression("1 + 2 * 3").unwrap(),
            bin(BinOp::Add, int(1), bin(BinOp::Mul, int(2), int(3)))
        );
        assert_eq!(
            parse_expression("2 ** 3 ** 2").unwrap(),
            bin(BinOp::Pow, int(2), bin(BinOp::Pow, int(3), int(2)))
        );
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        assert_eq!(
            parse_expression("-2 ** 2").unwrap(),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(bin(BinOp::Pow, int(2), int(2))),
            }
        );
    }

    #[test]
    fn test_boolean_connectives() {
        let expr = parse_expression("r < 1 or r > 6 and not done").unwrap();
        let Expr::Logical { op, right, .. } = expr else {
            panic!("expected logical");
        };
        assert_eq!(op, LogicalOp::Or);
        assert!(matches!(*right, Expr::Logical { op: LogicalOp::And, .. }));
    }

    #[test]
    fn test_membership_operators() {
        assert_eq!(
            parse_expression("x not in items").unwrap(),
            bin(BinOp::NotIn, name("x"), name("items"))
        );
        assert_eq!(
            parse_expression("\"a\" in word").unwrap(),
            bin(
                BinOp::In,
                Expr::Literal(Literal::Text("a".into())),
                name("word")
            )
        );
    }

    #[test]
    fn test_postfix_call_and_index() {
        assert_eq!(
            parse_expression("payload[\"status\"]").unwrap(),
            Expr::Index {
                target: Box::new(name("payload")),
                index: Box::new(Expr::Literal(Literal::Text("status".into()))),
            }
        );
        assert_eq!(
            parse_expression("len(items) - 1").unwrap(),
            bin(
                BinOp::Sub,
                Expr::Call {
                    callee: Box::new(name("len")),
                    args: vec![name("items")],
                },
                int(1)
            )
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            parse_expression("TRUE").unwrap(),
            Expr::Literal(Literal::Bool(true))
        );
        assert_eq!(
            parse_expression("Nothing").unwrap(),
            Expr::Literal(Literal::Nothing)
        );
        assert_eq!(
            parse_expression("2.5").unwrap(),
            Expr::Literal(Literal::Float(2.5))
        );
        assert_eq!(
            parse_expression("'it\\'s'").unwrap(),
            Expr::Literal(Literal::Text("it's".into()))
        );
        assert_eq!(
            parse_expression("[1, 2,]").unwrap(),
            Expr::List(vec![int(1), int(2)])
        );
        assert_eq!(
            parse_expression("{\"ok\": true}").unwrap(),
            Expr::Map(vec![(
                Expr::Literal(Literal::Text("ok".into())),
                Expr::Literal(Literal::Bool(true))
            )])
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("1 +").is_err());
        assert!(parse_expression("(1").is_err());
        assert!(parse_expression("\"open").is_err());
        assert!(parse_expression("x = 1").is_err());
        assert!(parse_expression("say hi").is_err());
    }
}
