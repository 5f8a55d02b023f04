//! # vectra
//!
//! vectra is a minimal, embeddable interpreter for a dynamic, vectorized
//! array-oriented language compatible with a widely-used statistical
//! dialect. It lexes and parses source text into an AST, then evaluates it
//! with attribute-bearing NA-tracking vectors, lazily evaluated function
//! arguments, lexically scoped closures and R-style subset semantics.
//!
//! The library exposes three entry points: [`Context::new`] builds an
//! evaluation context with the builtin library installed,
//! [`Context::eval_source`] evaluates source text and returns the last
//! value together with the captured printed output, and [`debug_tokens`]
//! exposes the token stream for diagnostic tooling.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` enum and related types that represent
/// the syntactic structure of source code as a tree. The AST is built by
/// the parser and traversed by the evaluator.
///
/// # Responsibilities
/// - Defines expression node types for all language constructs.
/// - Attaches source positions to AST nodes for error reporting.
/// - Provides the deparsed rendering used by `quote()` values.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing,
/// parsing, or evaluating code. It standardizes error reporting and carries
/// detailed information about failures, including error kinds, messages and
/// source lines.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches line numbers and detailed messages for context.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations, error handling, and all supporting infrastructure to
/// provide a complete runtime. It exposes the public API for interpreting
/// and executing expressions or programs.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and values.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;

pub use crate::{
    error::{Error, ParseError, RuntimeError},
    interpreter::{
        evaluator::core::{Context, EvalError, EvalOutcome},
        lexer::{debug_tokens, Pos, SpannedToken, Token},
        value::{core::Value, json::to_json},
    },
};

/// Evaluates source text in a fresh context.
///
/// This is a convenience for one-shot evaluation; embedders that want
/// state to persist across calls should create a [`Context`] and call
/// [`Context::eval_source`] on it directly.
///
/// # Errors
/// Returns an [`EvalError`] when the source fails to parse or evaluation
/// raises an error; the output produced before the failure rides along.
///
/// # Examples
/// ```
/// use vectra::eval_source;
///
/// let out = eval_source("paste(\"a\", \"b\", sep=\"-\")").unwrap();
/// assert_eq!(out.value.to_string(), "\"a-b\"");
///
/// // Errors abort the program but keep the output printed so far.
/// let err = eval_source("cat(\"x\")\nstop(\"boom\")").unwrap_err();
/// assert_eq!(err.output, "x");
/// ```
pub fn eval_source(src: &str) -> Result<EvalOutcome, EvalError> {
    Context::new().eval_source(src)
}
