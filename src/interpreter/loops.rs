//! Loop statement execution (`repeat N times`, `repeat while`, `for each`).
//!
//! Adds `impl Interpreter` methods for the three loop forms. `stop` and
//! `skip` are reported via `LoopBodyResult` so the loop driver can react
//! without inspecting the body's [`ControlFlow`] directly.
//!
//! A `return` inside a loop body becomes `LoopBodyResult::Exit`, which ends
//! the loop and hands the control-flow value to the enclosing function.
//! `stop` and `skip` inside a called function act on the caller's loop.
//!
//! Every iteration of every loop draws from one budget per execution
//! ([`Settings::max_loop_iterations`](crate::interpreter::settings::Settings)).
//! Loop bodies share the enclosing scope; they do not push a frame.

use crate::interpreter::builtins::items_of;
use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{Condition, Statement};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `skip`, so the loop iterates again.
    Continue,
    /// `stop` was encountered and the loop should exit cleanly.
    Break,
    /// `return` was triggered; the loop unwinds and passes it on.
    Exit(ControlFlow),
}

impl Interpreter {
    pub(crate) fn execute_loop_body(&mut self, body: &[Statement]) -> Result<LoopBodyResult, RuntimeError> {
        let flow = match self.execute_block(body) {
            Ok(flow) => flow,
            Err(err) => return jump_from_call(&err).ok_or(err),
        };
        Ok(match flow {
            ControlFlow::Normal | ControlFlow::Continue { .. } => LoopBodyResult::Continue,
            ControlFlow::Break { .. } => LoopBodyResult::Break,
            flow @ ControlFlow::Return { .. } => LoopBodyResult::Exit(flow),
        })
    }

    /// Count one iteration against the budget
    pub(crate) fn tick_loop_counter(&mut self, line: usize) -> Result<(), RuntimeError> {
        self.loop_iterations += 1;
        if self.loop_iterations > self.settings.max_loop_iterations {
            return Err(RuntimeError::RunawayLoop { line });
        }
        Ok(())
    }

    pub(crate) fn execute_repeat_count(
        &mut self,
        count_text: &str,
        body: &[Statement],
        line: usize,
    ) -> Result<ControlFlow, RuntimeError> {
        let count = match self.evaluate_text(count_text, line)? {
            Value::Int(n) => n,
            Value::Float(x) => x.trunc() as i64,
            Value::Bool(b) => i64::from(b),
            _ => {
                return Err(RuntimeError::TypeError {
                    message: "The 'repeat ... times' value must be a number.".to_string(),
                    line,
                })
            }
        };
        if count < 0 {
            return Err(RuntimeError::ValueError {
                message: "The repeat count must be zero or greater.".to_string(),
                line,
            });
        }

        for _ in 0..count {
            self.tick_loop_counter(line)?;
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Exit(flow) => return Ok(flow),
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// The condition is checked before every iteration, the budget after it
    /// holds.
    pub(crate) fn execute_repeat_while(
        &mut self,
        condition: &Condition,
        body: &[Statement],
        line: usize,
    ) -> Result<ControlFlow, RuntimeError> {
        while self.evaluate_condition(condition)? {
            self.tick_loop_counter(line)?;
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Exit(flow) => return Ok(flow),
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// Iterates a snapshot: list elements, text characters or map keys.
    /// Changes the body makes to the list are not seen by this loop.
    pub(crate) fn execute_for_each(
        &mut self,
        item: &str,
        iterable_text: &str,
        body: &[Statement],
        line: usize,
    ) -> Result<ControlFlow, RuntimeError> {
        let iterable = self.evaluate_text(iterable_text, line)?;
        let items = items_of(&iterable).map_err(|_| RuntimeError::TypeError {
            message: "I can only loop over iterable values.".to_string(),
            line,
        })?;

        for value in items {
            self.tick_loop_counter(line)?;
            self.scopes.set_local(item, value);
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Exit(flow) => return Ok(flow),
            }
        }
        Ok(ControlFlow::Normal)
    }
}

/// A `stop` or `skip` that ran inside a function called from the loop body
/// leaves the function as an out-of-loop error. The nearest loop claims it.
fn jump_from_call(err: &RuntimeError) -> Option<LoopBodyResult> {
    match err {
        RuntimeError::OutsideContext {
            keyword: "stop",
            context: "loop",
            ..
        } => Some(LoopBodyResult::Break),
        RuntimeError::OutsideContext {
            keyword: "skip",
            context: "loop",
            ..
        } => Some(LoopBodyResult::Continue),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::console::MockTerminal;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::settings::{DisplayMode, Settings};
    use crate::parser::parse_source;

    fn run_with(settings: Settings, source: &str) -> (Vec<String>, Result<(), RuntimeError>) {
        let terminal = MockTerminal::new();
        let settings = settings.with_display(DisplayMode::Headless);
        let mut interp = Interpreter::with_console(settings, Box::new(terminal.clone()));
        let program = parse_source(source).unwrap();
        let result = interp.execute(&program);
        (terminal.output(), result)
    }

    fn run(source: &str) -> (Vec<String>, Result<(), RuntimeError>) {
        run_with(Settings::default(), source)
    }

    #[test]
    fn test_repeat_count() {
        let (output, result) = run("repeat 3 times\n    say \"hi\"\nend repeat");
        result.unwrap();
        assert_eq!(output, vec!["hi", "hi", "hi"]);

        let (output, result) = run("repeat 2.9 times\n    say 1\nend repeat\nrepeat 0 times\n    say 2\nend repeat");
        result.unwrap();
        assert_eq!(output, vec!["1", "1"]);
    }

    #[test]
    fn test_repeat_count_validation() {
        let (_, result) = run("repeat \"3\" times\n    say 1\nend repeat");
        assert_eq!(
            result.unwrap_err().to_string(),
            "Oops! On line 1, The 'repeat ... times' value must be a number."
        );

        let (_, result) = run("repeat -1 times\n    say 1\nend repeat");
        assert_eq!(
            result.unwrap_err().to_string(),
            "Oops! On line 1, The repeat count must be zero or greater."
        );
    }

    #[test]
    fn test_stop_and_skip() {
        let source = "\
for each n in range(1, 10)
    if n equals 2 then
        skip
    end if
    if n equals 4 then
        stop
    end if
    say n
end for";
        let (output, result) = run(source);
        result.unwrap();
        assert_eq!(output, vec!["1", "3"]);
    }

    #[test]
    fn test_for_each_over_text_and_snapshot() {
        let (output, result) = run("for each c in \"ab\"\n    say c\nend for");
        result.unwrap();
        assert_eq!(output, vec!["a", "b"]);

        let source = "\
create list items
add 1 to items
for each i in items
    add i to items
end for
say items";
        let (output, result) = run(source);
        result.unwrap();
        assert_eq!(output, vec!["[1, 1]"]);

        let (_, result) = run("for each x in 5\n    say x\nend for");
        assert_eq!(
            result.unwrap_err().to_string(),
            "Oops! On line 1, I can only loop over iterable values."
        );
    }

    #[test]
    fn test_runaway_loops_are_stopped() {
        let settings = Settings::default().with_max_loop_iterations(5);
        let (output, result) = run_with(settings, "set x to 0\nrepeat while x < 1\n    say \"again\"\nend repeat");
        assert_eq!(result.unwrap_err(), RuntimeError::RunawayLoop { line: 2 });
        assert_eq!(output.len(), 5);
    }

    #[test]
    fn test_budget_is_shared_across_loops() {
        let settings = Settings::default().with_max_loop_iterations(4);
        let source = "repeat 3 times\n    say 1\nend repeat\nrepeat 3 times\n    say 2\nend repeat";
        let (output, result) = run_with(settings, source);
        assert_eq!(result.unwrap_err(), RuntimeError::RunawayLoop { line: 4 });
        assert_eq!(output, vec!["1", "1", "1", "2"]);
    }
}
