use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Everything that can go wrong between receiving an expression string and
/// producing its value. Lexical and syntactic variants carry the source text
/// and a span so the report can point at the offending fragment; arithmetic
/// variants are plain messages.
#[derive(Error, Debug, Diagnostic)]
pub enum EvalError {
    #[error("expression is empty")]
    #[diagnostic(help("supply at least one number, variable, or function call"))]
    EmptyExpression,

    #[error("unbalanced parentheses in expression")]
    #[diagnostic(help("every `(` needs a matching `)`"))]
    UnbalancedParentheses {
        #[source_code]
        src: NamedSource<String>,

        #[label("the balance breaks here")]
        at: SourceSpan,
    },

    #[error("unexpected character '{token}' in expression")]
    #[diagnostic(help("only digits, letters, `.`, `+ - * /`, and parentheses are allowed"))]
    InvalidCharacter {
        #[source_code]
        src: NamedSource<String>,

        #[label("this character")]
        at: SourceSpan,

        token: char,
    },

    #[error("'{literal}' is not a valid number")]
    InvalidNumber {
        #[source_code]
        src: NamedSource<String>,

        #[label("this numeric literal")]
        at: SourceSpan,

        literal: String,
    },

    #[error("function '{name}' must be called with parentheses")]
    #[diagnostic(help("write `{name}(...)` with the argument in parentheses"))]
    FunctionSyntax {
        #[source_code]
        src: NamedSource<String>,

        #[label("expected `(` after this name")]
        at: SourceSpan,

        name: String,
    },

    #[error("'{input}' is not a usable value for variable '{name}'")]
    #[diagnostic(help("the value of a variable must parse as a number, e.g. `3` or `0.5`"))]
    InvalidVariableInput { name: String, input: String },

    #[error("not enough operands left to apply a pending operation")]
    InsufficientOperands,

    #[error("division by zero")]
    DivisionByZero,

    #[error("square root of negative number {argument} is undefined")]
    NegativeSqrt { argument: f64 },

    #[error("expression does not reduce to a single value")]
    #[diagnostic(help("check for missing operators between values"))]
    MalformedExpression,
}

impl EvalError {
    /// Builds the source attachment for a span-carrying variant.
    pub(crate) fn source_of(expression: &str) -> NamedSource<String> {
        NamedSource::new("expression", expression.to_string())
    }
}
