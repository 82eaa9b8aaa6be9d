//! Runtime module
//!
//! This module handles interpretation and execution of Think programs.

pub mod interpreter;
pub mod value;

pub use interpreter::{ExecuteOptions, ExecutionResult, Interpreter, BUILTIN_NAMES};
pub use value::{DictValue, Value};
