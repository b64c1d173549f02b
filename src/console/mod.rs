//! Output and input sink for E++ programs
//!
//! `say` writes through [`Console::write_line`] and `ask` reads through
//! [`Console::read_line`]. [`StdConsole`] talks to the process streams;
//! [`MockTerminal`] records everything for tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

pub trait Console {
    fn write_line(&mut self, text: &str);

    /// Show `prompt` and read one answer without its line ending
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Standard output and standard input
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_line(&mut self, text: &str) {
        println!("{}", text);
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        while answer.ends_with('\n') || answer.ends_with('\r') {
            answer.pop();
        }
        Ok(answer)
    }
}

#[derive(Debug, Default)]
struct MockState {
    lines: Vec<String>,
    inputs: VecDeque<String>,
}

/// Mock terminal for capturing program output
///
/// Clones share one buffer, so a test can keep a handle while the
/// interpreter owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTerminal {
    state: Rc<RefCell<MockState>>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue answers for later `ask` statements
    pub fn with_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terminal = Self::new();
        terminal
            .state
            .borrow_mut()
            .inputs
            .extend(inputs.into_iter().map(Into::into));
        terminal
    }

    /// Get all lines written so far, prompts included
    pub fn output(&self) -> Vec<String> {
        self.state.borrow().lines.clone()
    }

    pub fn clear(&self) {
        self.state.borrow_mut().lines.clear();
    }
}

impl Console for MockTerminal {
    fn write_line(&mut self, text: &str) {
        self.state.borrow_mut().lines.push(text.to_string());
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut state = self.state.borrow_mut();
        state.lines.push(prompt.to_string());
        Ok(state.inputs.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_terminal_shares_output_between_clones() {
        let terminal = MockTerminal::new();
        let mut handle = terminal.clone();
        handle.write_line("hello");
        assert_eq!(terminal.output(), vec!["hello"]);
    }

    #[test]
    fn test_mock_terminal_serves_queued_inputs() {
        let mut terminal = MockTerminal::with_inputs(["Ada"]);
        assert_eq!(terminal.read_line("Name? ").unwrap(), "Ada");
        assert_eq!(terminal.read_line("Again? ").unwrap(), "");
        assert_eq!(terminal.output(), vec!["Name? ", "Again? "]);
    }
}
