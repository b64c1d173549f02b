//! E++ interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: the [`Interpreter`](engine::Interpreter) session and its lifecycle
//! - [`statements`], [`loops`], [`calls`]: statement execution
//! - [`expressions`]: expression text evaluation and conditions
//! - [`builtins`], [`capabilities`]: the builtin function registry
//! - [`ops`]: operator semantics on values
//! - [`errors`]: runtime error types
//! - [`settings`]: interpreter configuration
//!
//! # Execution Model
//!
//! The interpreter walks the statement tree directly. `return`, `stop` and
//! `skip` travel back up as control-flow values; each is caught by the
//! nearest function or loop, and one that escapes to the top level is a
//! runtime error.

pub mod builtins;
pub mod calls;
pub mod capabilities;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod loops;
pub mod ops;
pub mod settings;
pub mod statements;
