use crate::interpreter::builtins::Builtin;
use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::expressions::EvalError;
use crate::memory::value::{Function, Value};

/// Nested user-function calls allowed before `RecursionTooDeep`
pub const MAX_CALL_DEPTH: usize = 200;

impl Interpreter {
    /// Call by name, as `call NAME with ...` does. User bindings win over
    /// builtins.
    pub(crate) fn call_function(&mut self, name: &str, args: Vec<Value>, line: usize) -> Result<Value, RuntimeError> {
        let target = match self.scopes.lookup(name) {
            Some(value) => value.clone(),
            None => match Builtin::lookup(name) {
                Some(builtin) => Value::Builtin(builtin),
                None => {
                    return Err(RuntimeError::UndefinedFunction {
                        name: name.to_string(),
                        line,
                    })
                }
            },
        };

        match target {
            Value::Function(function) => self.call_user_function(&function, args, line),
            Value::Builtin(builtin) => self
                .call_builtin(builtin, name, args, line)
                .map_err(|err| builtin_failure(name, err, line)),
            _ => Err(RuntimeError::NotCallable {
                name: name.to_string(),
                line,
            }),
        }
    }

    /// Call any callable value. Used for route handlers.
    pub(crate) fn call_value(&mut self, callee: &Value, args: Vec<Value>, line: usize) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => self.call_user_function(function, args, line),
            Value::Builtin(builtin) => {
                let name = builtin.name();
                self.call_builtin(*builtin, name, args, line)
                    .map_err(|err| builtin_failure(name, err, line))
            }
            other => Err(RuntimeError::NotCallable {
                name: other.to_string(),
                line,
            }),
        }
    }

    /// Run a user function in a fresh frame. The frame is popped on every
    /// exit path, errors included.
    ///
    /// `stop` and `skip` leave the function as `OutsideContext`; a loop
    /// further up the call chain turns them back into a jump.
    pub(crate) fn call_user_function(
        &mut self,
        function: &Function,
        args: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        if args.len() != function.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: function.name.clone(),
                expected: function.params.len().to_string(),
                got: args.len(),
                line,
            });
        }
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::RecursionTooDeep {
                name: function.name.clone(),
                line,
            });
        }

        self.scopes.push_frame();
        for (param, arg) in function.params.iter().zip(args) {
            self.scopes.set_local(param, arg);
        }
        self.call_depth += 1;
        let outcome = self.execute_block(&function.body);
        self.call_depth -= 1;
        self.scopes.pop_frame();

        match outcome? {
            ControlFlow::Normal => Ok(Value::Nothing),
            ControlFlow::Return { value, .. } => Ok(value),
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
}

fn builtin_failure(name: &str, err: EvalError, line: usize) -> RuntimeError {
    match err {
        EvalError::Runtime(err) => err,
        EvalError::Failed(message) => RuntimeError::BuiltinFailed {
            name: name.to_string(),
            message,
            line,
        },
        EvalError::DivisionByZero => RuntimeError::BuiltinFailed {
            name: name.to_string(),
            message: "division by zero".to_string(),
            line,
        },
        EvalError::UnknownName(missing) => RuntimeError::UndefinedName { name: missing, line },
    }
}
