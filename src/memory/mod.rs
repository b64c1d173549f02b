//! Memory model for the E++ interpreter
//!
//! This module provides the core runtime abstractions:
//! - [`value`]: Runtime value representation (numbers, text, lists, functions)
//! - [`stack`]: Scope stack with the persistent global frame
//!
//! Lists are reference values: `set b to a` makes both names see the same
//! list, and `add 1 to b` is visible through `a`.

pub mod stack;
pub mod value;

pub use stack::ScopeStack;
pub use value::{Function, Value};
