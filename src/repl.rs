//! Interactive E++ shell
//!
//! [`ReplSession`] holds the line-handling logic and writes everything to
//! the interpreter's console, so it can be driven without a terminal.
//! [`Repl`] wraps it in a `rustyline` editor.
//!
//! Lines are buffered while the parse error says the input is merely
//! incomplete (an open block), then the whole buffer runs as one
//! submission. Bindings persist across submissions, including failed ones.

use crate::error::EppError;
use crate::interpreter::engine::Interpreter;
use crate::memory::value::Value;
use crate::parser::parse_source;
use crate::runner::execute_source;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::fs;
use std::path::Path;

pub const PROMPT: &str = "epp> ";
pub const CONTINUATION_PROMPT: &str = "... ";

const BANNER: &[&str] = &[
    "E++ REPL",
    "Type E++ lines. Use 'exit' or 'quit' to leave. Type ':help' for REPL commands.",
];

const HELP: &[&str] = &[
    "REPL commands:",
    "  :help            Show this help",
    "  :vars            Show global variables",
    "  :reset           Clear all variables and functions",
    "  :load <file>     Run a .epp file in current REPL state",
];

/// What the host should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplAction {
    Continue,
    Exit,
}

pub struct ReplSession {
    interpreter: Interpreter,
    buffer: Vec<String>,
}

impl ReplSession {
    pub fn new(interpreter: Interpreter) -> Self {
        ReplSession {
            interpreter,
            buffer: Vec::new(),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// `epp> `, or `... ` while a block is still open
    pub fn prompt(&self) -> &'static str {
        if self.buffer.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        }
    }

    pub fn print_banner(&mut self) {
        for line in BANNER {
            self.say(line);
        }
    }

    /// Drop any half-entered block
    pub fn cancel(&mut self) {
        self.buffer.clear();
    }

    pub fn submit(&mut self, line: &str) -> ReplAction {
        let trimmed = line.trim();
        if self.buffer.is_empty() {
            if matches!(trimmed.to_lowercase().as_str(), "exit" | "quit") {
                return ReplAction::Exit;
            }
            if trimmed.is_empty() {
                return ReplAction::Continue;
            }
            if trimmed.starts_with(':') {
                self.run_command(trimmed);
                return ReplAction::Continue;
            }
        }

        self.buffer.push(line.to_string());
        let source = self.buffer.join("\n");
        let program = match parse_source(&source) {
            Ok(program) => program,
            Err(err) if err.is_incomplete() => return ReplAction::Continue,
            Err(err) => {
                self.buffer.clear();
                self.say(&err.to_string());
                return ReplAction::Continue;
            }
        };

        self.buffer.clear();
        if let Err(err) = self.interpreter.execute(&program) {
            self.say(&err.to_string());
        }
        ReplAction::Continue
    }

    fn run_command(&mut self, command: &str) {
        match command {
            ":help" => {
                for line in HELP {
                    self.say(line);
                }
            }
            ":vars" => self.show_vars(),
            ":reset" => {
                self.interpreter.reset();
                self.say("Environment reset.");
            }
            _ => match command.strip_prefix(":load ") {
                Some(path) => self.load(path.trim().trim_matches('"')),
                None => self.say("Unknown REPL command. Type ':help' to see available commands."),
            },
        }
    }

    fn show_vars(&mut self) {
        let bindings = self.interpreter.global_bindings();
        if bindings.is_empty() {
            self.say("(no variables yet)");
            return;
        }
        for (name, value) in bindings {
            let shown = match &value {
                Value::Function(function) => format!("<function({})>", function.params.join(", ")),
                other => other.repr(),
            };
            self.say(&format!("{} = {}", name, shown));
        }
    }

    fn load(&mut self, file: &str) {
        if file.is_empty() {
            self.say("Please provide a file path. Example: :load examples/hello.epp");
            return;
        }
        let path = Path::new(file);
        let source = match path.is_file().then(|| fs::read_to_string(path)) {
            Some(Ok(source)) => source,
            _ => {
                self.say(&format!("Oops! I can't find '{}'.", file));
                return;
            }
        };
        execute_source(&source, &mut self.interpreter, false);
    }

    fn say(&mut self, text: &str) {
        self.interpreter.console_mut().write_line(text);
    }
}

/// Line-editor front end for a [`ReplSession`]
pub struct Repl {
    session: ReplSession,
}

impl Repl {
    pub fn new(interpreter: Interpreter) -> Self {
        Repl {
            session: ReplSession::new(interpreter),
        }
    }

    pub fn run(&mut self) -> Result<(), EppError> {
        let mut editor = DefaultEditor::new().map_err(readline_error)?;
        self.session.print_banner();
        loop {
            match editor.readline(self.session.prompt()) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        editor.add_history_entry(line.as_str()).ok();
                    }
                    if self.session.submit(&line) == ReplAction::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => self.session.cancel(),
                Err(ReadlineError::Eof) => {
                    self.session.say("");
                    break;
                }
                Err(err) => return Err(readline_error(err)),
            }
        }
        Ok(())
    }
}

fn readline_error(err: ReadlineError) -> EppError {
    EppError::from(std::io::Error::new(std::io::ErrorKind::Other, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MockTerminal;
    use crate::interpreter::settings::{DisplayMode, Settings};

    fn session() -> (ReplSession, MockTerminal) {
        let terminal = MockTerminal::new();
        let settings = Settings::default().with_display(DisplayMode::Headless);
        let interpreter = Interpreter::with_console(settings, Box::new(terminal.clone()));
        (ReplSession::new(interpreter), terminal)
    }

    #[test]
    fn test_blocks_are_buffered_until_closed() {
        let (mut repl, terminal) = session();
        assert_eq!(repl.submit("repeat 2 times"), ReplAction::Continue);
        assert_eq!(repl.prompt(), CONTINUATION_PROMPT);
        repl.submit("say \"hi\"");
        assert!(terminal.output().is_empty());
        repl.submit("end repeat");
        assert_eq!(repl.prompt(), PROMPT);
        assert_eq!(terminal.output(), vec!["hi", "hi"]);
    }

    #[test]
    fn test_bindings_survive_errors() {
        let (mut repl, terminal) = session();
        repl.submit("set x to 5");
        repl.submit("say missing");
        repl.submit("say x");
        assert_eq!(
            terminal.output(),
            vec!["Oops! On line 1, I can't find 'missing'. Try setting it first.", "5"]
        );
    }

    #[test]
    fn test_exit_words() {
        let (mut repl, _) = session();
        assert_eq!(repl.submit("  QUIT "), ReplAction::Exit);
        assert_eq!(repl.submit("exit"), ReplAction::Exit);
    }

    #[test]
    fn test_vars_and_reset() {
        let (mut repl, terminal) = session();
        repl.submit(":vars");
        repl.submit("set name to \"Ada\"");
        repl.submit("define add with a, b");
        repl.submit("return a + b");
        repl.submit("end define");
        repl.submit(":vars");
        repl.submit(":reset");
        repl.submit(":vars");
        assert_eq!(
            terminal.output(),
            vec![
                "(no variables yet)",
                "add = <function(a, b)>",
                "name = \"Ada\"",
                "Environment reset.",
                "(no variables yet)",
            ]
        );
    }

    #[test]
    fn test_meta_commands() {
        let (mut repl, terminal) = session();
        repl.submit(":help");
        repl.submit(":bogus");
        repl.submit(":load /definitely/not/here.epp");
        let output = terminal.output();
        assert_eq!(output[0], "REPL commands:");
        assert_eq!(output[output.len() - 2], "Unknown REPL command. Type ':help' to see available commands.");
        assert_eq!(output[output.len() - 1], "Oops! I can't find '/definitely/not/here.epp'.");
    }

    #[test]
    fn test_load_runs_in_current_session() {
        let (mut repl, terminal) = session();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.epp");
        fs::write(&path, "set greeting to \"hello\"").unwrap();

        repl.submit(&format!(":load {}", path.display()));
        repl.submit("say greeting");
        assert_eq!(terminal.output(), vec!["hello"]);
    }
}
