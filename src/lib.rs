//! # Introduction
//!
//! E++ is a plain-English scripting language: `set x to 5`, `say x`,
//! `repeat 3 times ... end repeat`. This crate parses and executes it, either
//! a whole script at once or line by line in a REPL.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Line records → Statement tree → Interpreter → Console
//! ```
//!
//! 1. [`parser`]: classifies lines and matches them against the statement
//!    phrasings, building a [`parser::ast::Program`]. Expressions stay as
//!    text until they run.
//! 2. [`interpreter`]: walks the tree, evaluating expression text with its
//!    own expression grammar and builtin registry.
//! 3. [`memory`]: the [`memory::value::Value`] domain and the scope stack.
//! 4. [`console`]: where `say` writes and `ask` reads; [`console::MockTerminal`]
//!    records both for tests.
//! 5. [`web`] and [`ui`]: the route dispatcher, HTTP fetch and pixel window
//!    behind the web and display builtins.
//! 6. [`runner`] and [`repl`]: the host loop used by the `epp` binary.
//!
//! ## Example
//!
//! ```
//! use epp::{console::MockTerminal, runner, Interpreter, Settings};
//!
//! let terminal = MockTerminal::new();
//! let mut interpreter = Interpreter::with_console(Settings::default(), Box::new(terminal.clone()));
//! let status = runner::execute_source("set x to 6 * 7\nsay x", &mut interpreter, false);
//! assert_eq!(status, 0);
//! assert_eq!(terminal.output(), vec!["42"]);
//! ```

pub mod console;
pub mod error;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod ui;
pub mod web;

pub use error::EppError;
pub use interpreter::engine::Interpreter;
pub use interpreter::errors::RuntimeError;
pub use interpreter::settings::Settings;
pub use memory::value::Value;
pub use parser::parse_source;
pub use repl::{Repl, ReplSession};

/// Language version reported by `epp --version`
pub const VERSION: &str = "0.2.0";
