use std::collections::HashMap;

use crate::{
    error::EvalError,
    lex::{Lexer, TokenKind},
};

/// Collaborator that supplies a value for a variable name the evaluator has
/// not seen before. How the value is obtained (console prompt, fixture,
/// lookup table) is the caller's business; the evaluator only requires that
/// unusable data surface as [`EvalError::InvalidVariableInput`].
///
/// Any `FnMut(&str) -> Result<f64, EvalError>` is a source, so a test can
/// pass a closure and a binary can pass a prompting function.
pub trait VariableSource {
    fn resolve(&mut self, name: &str) -> Result<f64, EvalError>;
}

impl<F> VariableSource for F
where
    F: FnMut(&str) -> Result<f64, EvalError>,
{
    fn resolve(&mut self, name: &str) -> Result<f64, EvalError> {
        self(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Plus,
    Minus,
    Star,
    Slash,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Op::Plus | Op::Minus => 1,
            Op::Star | Op::Slash => 2,
        }
    }

    fn apply(self, a: f64, b: f64) -> Result<f64, EvalError> {
        match self {
            Op::Plus => Ok(a + b),
            Op::Minus => Ok(a - b),
            Op::Star => Ok(a * b),
            Op::Slash => {
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(a / b)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Func {
    Sin,
    Cos,
    Sqrt,
}

impl Func {
    /// The fixed recognized-function set. An identifier is matched against
    /// this set before it is ever treated as a variable.
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "sqrt" => Some(Func::Sqrt),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> Result<f64, EvalError> {
        match self {
            Func::Sin => Ok(x.sin()),
            Func::Cos => Ok(x.cos()),
            Func::Sqrt => {
                if x < 0.0 {
                    return Err(EvalError::NegativeSqrt { argument: x });
                }
                Ok(x.sqrt())
            }
        }
    }
}

/// Operator-stack entry: a binary operator waiting for its precedence turn,
/// or a marker that only a closing parenthesis may remove.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Op(Op),
    Func(Func),
    LeftParen,
}

/// Evaluates arithmetic expressions over `f64`, remembering every variable
/// it has resolved. Values for unknown names come from the [`VariableSource`]
/// supplied at construction; each name is resolved at most once for the
/// lifetime of the evaluator.
pub struct Evaluator<S> {
    variables: HashMap<String, f64>,
    source: S,
}

impl<S: VariableSource> Evaluator<S> {
    pub fn new(source: S) -> Self {
        Evaluator {
            variables: HashMap::new(),
            source,
        }
    }

    /// Evaluates `expression` to a single value.
    ///
    /// The expression is checked structurally, tokenized in full, and then
    /// folded in one left-to-right pass over the token sequence with an
    /// operand stack and an operator stack. `*` and `/` bind tighter than
    /// `+` and `-`; operators of equal precedence fold left to right.
    pub fn evaluate(&mut self, expression: &str) -> Result<f64, EvalError> {
        if expression.trim().is_empty() {
            return Err(EvalError::EmptyExpression);
        }
        check_balance(expression)?;

        // The whole expression must tokenize before the variable source is
        // consulted.
        let tokens = Lexer::new(expression).collect::<Result<Vec<_>, _>>()?;

        let mut operands: Vec<f64> = Vec::new();
        let mut pending: Vec<Pending> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Number => {
                    let n = token
                        .literal
                        .parse()
                        .map_err(|_| EvalError::InvalidNumber {
                            src: EvalError::source_of(expression),
                            at: token.span(),
                            literal: token.literal.to_string(),
                        })?;
                    operands.push(n);
                }
                TokenKind::Ident => match Func::from_name(token.literal) {
                    Some(func) => {
                        let followed_by_paren = tokens
                            .get(i + 1)
                            .is_some_and(|next| next.kind == TokenKind::LeftParen);
                        if !followed_by_paren {
                            return Err(EvalError::FunctionSyntax {
                                src: EvalError::source_of(expression),
                                at: token.span(),
                                name: token.literal.to_string(),
                            });
                        }
                        pending.push(Pending::Func(func));
                    }
                    None => {
                        let value = self.variable(token.literal)?;
                        operands.push(value);
                    }
                },
                TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash => {
                    let incoming = match token.kind {
                        TokenKind::Plus => Op::Plus,
                        TokenKind::Minus => Op::Minus,
                        TokenKind::Star => Op::Star,
                        TokenKind::Slash => Op::Slash,
                        _ => unreachable!(),
                    };
                    // Paren and function markers are not `Pending::Op`, so
                    // this loop can never pop one.
                    while let Some(&Pending::Op(top)) = pending.last() {
                        if top.precedence() < incoming.precedence() {
                            break;
                        }
                        pending.pop();
                        apply_binary(&mut operands, top)?;
                    }
                    pending.push(Pending::Op(incoming));
                }
                TokenKind::LeftParen => pending.push(Pending::LeftParen),
                TokenKind::RightParen => {
                    loop {
                        match pending.pop() {
                            Some(Pending::Op(op)) => apply_binary(&mut operands, op)?,
                            Some(Pending::LeftParen) => break,
                            // A function marker always sits directly under
                            // its own `(`, so it cannot surface before one.
                            Some(Pending::Func(_)) | None => {
                                return Err(EvalError::UnbalancedParentheses {
                                    src: EvalError::source_of(expression),
                                    at: token.span(),
                                });
                            }
                        }
                    }
                    if let Some(&Pending::Func(func)) = pending.last() {
                        pending.pop();
                        let Some(argument) = operands.pop() else {
                            return Err(EvalError::InsufficientOperands);
                        };
                        operands.push(func.apply(argument)?);
                    }
                }
            }
        }

        while let Some(entry) = pending.pop() {
            match entry {
                Pending::Op(op) => apply_binary(&mut operands, op)?,
                // The pre-check rules leftover markers out; a marker that
                // survives anyway is reported, never applied as an operator.
                Pending::LeftParen | Pending::Func(_) => {
                    return Err(EvalError::UnbalancedParentheses {
                        src: EvalError::source_of(expression),
                        at: (expression.len().saturating_sub(1)..expression.len()).into(),
                    });
                }
            }
        }

        match operands.as_slice() {
            [result] => Ok(*result),
            _ => Err(EvalError::MalformedExpression),
        }
    }

    /// Returns the stored value for `name`, consulting the collaborator the
    /// first time a name is seen.
    fn variable(&mut self, name: &str) -> Result<f64, EvalError> {
        if let Some(&value) = self.variables.get(name) {
            return Ok(value);
        }
        let value = self.source.resolve(name)?;
        self.variables.insert(name.to_string(), value);
        Ok(value)
    }
}

/// Applies one pending binary operation. The right operand was pushed last,
/// so it pops first.
fn apply_binary(operands: &mut Vec<f64>, op: Op) -> Result<(), EvalError> {
    let Some(b) = operands.pop() else {
        return Err(EvalError::InsufficientOperands);
    };
    let Some(a) = operands.pop() else {
        return Err(EvalError::InsufficientOperands);
    };
    operands.push(op.apply(a, b)?);
    Ok(())
}

/// Count-based parenthesis scan over the raw characters, before any
/// tokenization. It does not verify that function names are paired with
/// parentheses; that surfaces later as a function-syntax error.
fn check_balance(expression: &str) -> Result<(), EvalError> {
    let mut balance = 0i32;
    let mut last_open = 0;
    for (i, c) in expression.char_indices() {
        match c {
            '(' => {
                balance += 1;
                last_open = i;
            }
            ')' => {
                balance -= 1;
                if balance < 0 {
                    return Err(EvalError::UnbalancedParentheses {
                        src: EvalError::source_of(expression),
                        at: (i..i + 1).into(),
                    });
                }
            }
            _ => {}
        }
    }
    if balance != 0 {
        return Err(EvalError::UnbalancedParentheses {
            src: EvalError::source_of(expression),
            at: (last_open..last_open + 1).into(),
        });
    }
    Ok(())
}
