//! Arithmetic expression evaluation.
//!
//! The [`Evaluator`] takes an expression string (numbers, `+ - * /`,
//! parentheses, variables, and the `sin`/`cos`/`sqrt` functions) and folds
//! it to one `f64` in a single shunting-yard pass. Variables are resolved on
//! first use through a pluggable [`VariableSource`] and remembered for the
//! lifetime of the evaluator.

pub mod error;
pub mod eval;
pub mod lex;

pub use error::EvalError;
pub use eval::{Evaluator, VariableSource};
pub use lex::Lexer;
