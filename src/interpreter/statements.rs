//! Statement execution implementation
//!
//! This module handles the execution of all E++ statement types:
//!
//! - Assignment, output (`say`) and input (`ask`)
//! - List creation and removal, in-place arithmetic updates
//! - Conditionals and function definitions
//! - `return`, `stop` and `skip`, reported as [`ControlFlow`] values
//!
//! Loops live in [`crate::interpreter::loops`] and calls in
//! [`crate::interpreter::calls`].
//!
//! # Scoping
//!
//! Plain assignment always binds in the innermost frame. In-place updates
//! (`add 1 to x`, `remove ... from items`) write back into the frame where
//! the name was found, so a function can update a global it did not shadow.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::binary::binary_op;
use crate::interpreter::ops::OpError;
use crate::memory::value::{Function, Value};
use crate::parser::ast::{MutateOp, Statement};
use crate::parser::expressions::BinOp;
use std::rc::Rc;

impl Interpreter {
    /// Run statements in order until one leaves the block early
    pub(crate) fn execute_block(&mut self, statements: &[Statement]) -> Result<ControlFlow, RuntimeError> {
        for statement in statements {
            let flow = self.execute_statement(statement)?;
            if flow != ControlFlow::Normal {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal)
    }

    pub(crate) fn execute_statement(&mut self, statement: &Statement) -> Result<ControlFlow, RuntimeError> {
        match statement {
            Statement::Assign { name, expr, line } => {
                let value = self.evaluate_text(expr, *line)?;
                self.scopes.set_local(name, value);
            }

            Statement::Output { expr, line } => {
                let value = self.evaluate_text(expr, *line)?;
                self.console.write_line(&value.to_string());
            }

            Statement::Input { prompt, name, line } => {
                let prompt = self.evaluate_text(prompt, *line)?;
                let answer = self
                    .console
                    .read_line(&prompt.to_string())
                    .map_err(|e| RuntimeError::InputFailed {
                        message: e.to_string(),
                        line: *line,
                    })?;
                self.scopes.set_local(name, Value::Text(answer));
            }

            Statement::ListCreate { name, .. } => {
                self.scopes.set_local(name, Value::list(Vec::new()));
            }

            Statement::ListRemove { value, name, line } => {
                self.execute_list_remove(value, name, *line)?;
            }

            Statement::ArithmeticMutate {
                op,
                name,
                value,
                line,
            } => {
                self.execute_mutation(*op, name, value, *line)?;
            }

            Statement::Conditional {
                condition,
                body,
                branches,
                else_body,
                ..
            } => {
                if self.evaluate_condition(condition)? {
                    return self.execute_block(body);
                }
                for branch in branches {
                    if self.evaluate_condition(&branch.condition)? {
                        return self.execute_block(&branch.body);
                    }
                }
                if let Some(else_body) = else_body {
                    return self.execute_block(else_body);
                }
            }

            Statement::RepeatCount { count, body, line } => {
                return self.execute_repeat_count(count, body, *line);
            }

            Statement::RepeatWhile {
                condition,
                body,
                line,
            } => {
                return self.execute_repeat_while(condition, body, *line);
            }

            Statement::ForEach {
                item,
                iterable,
                body,
                line,
            } => {
                return self.execute_for_each(item, iterable, body, *line);
            }

            Statement::FunctionDefine {
                name,
                params,
                body,
                line,
            } => {
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    line: *line,
                };
                self.scopes.set_local(name, Value::Function(Rc::new(function)));
            }

            Statement::FunctionCall { name, args, line } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate_text(arg, *line)?);
                }
                self.call_function(name, values, *line)?;
            }

            Statement::Return { expr, line } => {
                let value = match expr {
                    Some(expr) => self.evaluate_text(expr, *line)?,
                    None => Value::Nothing,
                };
                return Ok(ControlFlow::Return { value, line: *line });
            }

            Statement::Break { line } => return Ok(ControlFlow::Break { line: *line }),

            Statement::Continue { line } => return Ok(ControlFlow::Continue { line: *line }),
        }
        Ok(ControlFlow::Normal)
    }

    /// `add`/`subtract`/`multiply`/`divide`. The value is evaluated before
    /// the target is looked up.
    fn execute_mutation(
        &mut self,
        op: MutateOp,
        name: &str,
        value_text: &str,
        line: usize,
    ) -> Result<(), RuntimeError> {
        let value = self.evaluate_text(value_text, line)?;
        let (frame, current) = self.find_target(name, line)?;

        if let (MutateOp::Add, Value::List(items)) = (op, &current) {
            items.borrow_mut().push(value);
            return Ok(());
        }

        let bin_op = match op {
            MutateOp::Add => BinOp::Add,
            MutateOp::Subtract => BinOp::Sub,
            MutateOp::Multiply => BinOp::Mul,
            MutateOp::Divide => BinOp::Div,
        };
        let updated = binary_op(bin_op, &current, &value).map_err(|err| match err {
            OpError::DivisionByZero => RuntimeError::DivisionByZero { line },
            OpError::Invalid(message) => RuntimeError::MutationFailed {
                verb: op.describe(),
                name: name.to_string(),
                message,
                line,
            },
        })?;
        self.scopes.set_in(frame, name, updated);
        Ok(())
    }

    fn execute_list_remove(&mut self, value_text: &str, name: &str, line: usize) -> Result<(), RuntimeError> {
        let (_, target) = self.find_target(name, line)?;
        let Value::List(items) = target else {
            return Err(RuntimeError::NotAList {
                name: name.to_string(),
                line,
            });
        };

        let item = self.evaluate_text(value_text, line)?;
        let position = items.borrow().iter().position(|element| *element == item);
        match position {
            Some(position) => {
                items.borrow_mut().remove(position);
                Ok(())
            }
            None => Err(RuntimeError::ValueError {
                message: format!(
                    "I couldn't remove {} because it is not in '{}'.",
                    item.repr(),
                    name
                ),
                line,
            }),
        }
    }

    /// Frame index and current value of an existing binding
    fn find_target(&self, name: &str, line: usize) -> Result<(usize, Value), RuntimeError> {
        let missing = || RuntimeError::UndefinedVariable {
            name: name.to_string(),
            line,
        };
        let frame = self.scopes.find_frame_index(name).ok_or_else(missing)?;
        let value = self.scopes.get_in(frame, name).cloned().ok_or_else(missing)?;
        Ok((frame, value))
    }
}
