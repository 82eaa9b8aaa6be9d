//! # Think Programming Language
//!
//! An educational programming language built around enforced problem
//! decomposition: programs declare an `objective`, organize work into
//! `task` blocks containing `step` and `subtask` sub-blocks, and
//! execute selected tasks via `run` statements.
//!
//! ## Architecture
//!
//! The language implementation is organized into several modules:
//! - `lexer`: Tokenization of source code
//! - `parser`: Parsing tokens into an Abstract Syntax Tree (AST)
//! - `validator`: Structural validation before execution
//! - `runtime`: Tree-walking interpreter/execution engine
//! - `trace`: Explain-mode trace events and rendering styles
//! - `error`: Error handling and diagnostics

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod trace;
pub mod validator;

// Re-export commonly used types
pub use error::{Diagnostic, RuntimeErrorKind, SourceLocation, ThinkError, ThinkResult, ValidationError};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{Parser, Program};
pub use runtime::{ExecuteOptions, ExecutionResult};
pub use trace::{TraceEvent, TraceSink, TraceStyle};

/// Version of the Think language
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse Think source code into a program AST
///
/// # Arguments
///
/// * `source` - The source code to parse
///
/// # Returns
///
/// Returns the parsed `Program`, or a `ThinkError` from the lexer or
/// parser. Lex and parse errors abort immediately; there is no
/// recovery or partial AST.
pub fn parse(source: &str) -> ThinkResult<Program> {
    let tokens = Lexer::new(source, None).tokenize()?;
    Parser::new(tokens).parse()
}

/// Validate a parsed program, returning every structural defect found
pub fn validate(program: &Program) -> Vec<ValidationError> {
    validator::validate(program)
}

/// Execute a validated program
///
/// The caller must validate first; `execute` is never called on a
/// program with outstanding validation errors.
pub fn execute(program: &Program, options: &ExecuteOptions) -> ThinkResult<ExecutionResult> {
    runtime::interpreter::execute(program, options)
}

/// Parse, validate and execute a Think program from source code
///
/// This is the main entry point for running Think programs. A
/// validation failure surfaces as a single `ThinkError::Validation`
/// carrying the complete defect list.
///
/// # Arguments
///
/// * `source` - The source code to run
/// * `options` - Execution settings (explain mode, trace style)
pub fn run(source: &str, options: &ExecuteOptions) -> ThinkResult<ExecutionResult> {
    // Phase 1: Lexing + Parsing
    let program = parse(source)?;

    // Phase 2: Validation (all defects collected)
    let errors = validate(&program);
    if !errors.is_empty() {
        return Err(ThinkError::validation(errors));
    }

    // Phase 3: Execution
    execute(&program, options)
}
