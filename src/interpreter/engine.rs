// Execution engine for the E++ interpreter

use crate::console::{Console, StdConsole};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::settings::Settings;
use crate::memory::{stack::ScopeStack, value::Value};
use crate::parser::ast::Program;
use crate::parser::expressions::Expr;
use crate::ui::PixelWindow;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// How a statement or block finished
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlFlow {
    Normal,
    Return { value: Value, line: usize },
    Break { line: usize },
    Continue { line: usize },
}

/// The main interpreter that executes E++ programs
///
/// One interpreter is one session: globals persist across calls to
/// [`Interpreter::execute`] until [`Interpreter::reset`].
pub struct Interpreter {
    /// Global frame plus one frame per active user-function call
    pub(crate) scopes: ScopeStack,

    /// Loop iterations in the current execution, across all loops
    pub(crate) loop_iterations: usize,

    pub(crate) settings: Settings,

    /// Where `say` writes and `ask` reads
    pub(crate) console: Box<dyn Console>,

    /// Pixel display behind the window builtins
    pub(crate) window: PixelWindow,

    /// Shared HTTP agent for the fetch builtins
    pub(crate) agent: ureq::Agent,

    /// Parsed expressions keyed by normalized text
    pub(crate) expr_cache: FxHashMap<String, Rc<Expr>>,

    /// Active user-function calls
    pub(crate) call_depth: usize,
}

impl Interpreter {
    /// Create an interpreter that talks to stdin/stdout
    pub fn new(settings: Settings) -> Self {
        Self::with_console(settings, Box::new(StdConsole))
    }

    pub fn with_console(settings: Settings, console: Box<dyn Console>) -> Self {
        Interpreter {
            scopes: ScopeStack::new(),
            loop_iterations: 0,
            window: PixelWindow::new(settings.display),
            settings,
            console,
            agent: ureq::Agent::new(),
            expr_cache: FxHashMap::default(),
            call_depth: 0,
        }
    }

    /// Run a program in this session. The loop budget restarts; bindings
    /// made before remain visible.
    pub fn execute(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.loop_iterations = 0;
        match self.execute_block(&program.statements)? {
            ControlFlow::Normal => Ok(()),
            ControlFlow::Return { line, .. } => Err(RuntimeError::OutsideContext {
                keyword: "return",
                context: "function",
                line,
            }),
            ControlFlow::Break { line } => Err(RuntimeError::OutsideContext {
                keyword: "stop",
                context: "loop",
                line,
            }),
            ControlFlow::Continue { line } => Err(RuntimeError::OutsideContext {
                keyword: "skip",
                context: "loop",
                line,
            }),
        }
    }

    /// Forget every binding and close the window
    pub fn reset(&mut self) {
        self.scopes.clear();
        self.loop_iterations = 0;
        self.call_depth = 0;
        self.expr_cache.clear();
        self.window.close();
    }

    /// Global bindings sorted by name
    pub fn global_bindings(&self) -> Vec<(String, Value)> {
        let mut bindings: Vec<(String, Value)> = self
            .scopes
            .globals()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        bindings
    }

    /// Innermost binding of `name`
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.lookup(name)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn console_mut(&mut self) -> &mut dyn Console {
        self.console.as_mut()
    }

    pub fn window_mut(&mut self) -> &mut PixelWindow {
        &mut self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MockTerminal;
    use crate::interpreter::settings::DisplayMode;
    use crate::parser::parse_source;

    fn run(source: &str) -> (Interpreter, MockTerminal, Result<(), RuntimeError>) {
        let terminal = MockTerminal::new();
        let settings = Settings::default().with_display(DisplayMode::Headless);
        let mut interp = Interpreter::with_console(settings, Box::new(terminal.clone()));
        let program = parse_source(source).unwrap();
        let result = interp.execute(&program);
        (interp, terminal, result)
    }

    #[test]
    fn test_stray_control_flow_is_reported() {
        let (_, _, result) = run("stop");
        assert_eq!(
            result.unwrap_err().to_string(),
            "Oops! On line 1, I found 'stop' outside of a loop."
        );

        let (_, _, result) = run("say 1\nskip");
        assert_eq!(
            result.unwrap_err(),
            RuntimeError::OutsideContext {
                keyword: "skip",
                context: "loop",
                line: 2
            }
        );

        let (_, _, result) = run("return 5");
        assert!(matches!(
            result,
            Err(RuntimeError::OutsideContext { keyword: "return", .. })
        ));
    }

    #[test]
    fn test_bindings_survive_between_executions() {
        let (mut interp, terminal, result) = run("set x to 41");
        result.unwrap();
        let program = parse_source("add 1 to x\nsay x").unwrap();
        interp.execute(&program).unwrap();
        assert_eq!(terminal.output(), vec!["42"]);

        interp.reset();
        assert!(interp.lookup("x").is_none());
        assert!(interp.global_bindings().is_empty());
    }

    #[test]
    fn test_global_bindings_are_sorted() {
        let (interp, _, result) = run("set b to 2\nset a to 1");
        result.unwrap();
        let names: Vec<String> = interp.global_bindings().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
