//! Arithmetic expression evaluation.
//!
//! A line goes through three stages, each with its own error type:
//! [`lex::tokenize`], [`parse::parse`] and [`eval::evaluate`].
//! [`eval_line`] chains them. Nothing is kept between calls.
use std::fmt::Display;

pub mod ast;
pub mod eval;
pub mod func;
pub mod input;
pub mod lex;
pub mod parse;
pub mod registry;

use input::{HasSpan, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Lex(lex::Error),
    Syntax(parse::Error),
    Eval(eval::Error),
}

impl HasSpan for Error {
    fn span(&self) -> Span {
        match self {
            Error::Lex(err) => err.span(),
            Error::Syntax(err) => err.span(),
            Error::Eval(err) => err.span(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Lex(err) => write!(f, "Lexical error: {err}"),
            Error::Syntax(err) => write!(f, "Syntax error: {err}"),
            Error::Eval(err) => write!(f, "Evaluation error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(err) => Some(err),
            Error::Syntax(err) => Some(err),
            Error::Eval(err) => Some(err),
        }
    }
}

impl From<lex::Error> for Error {
    fn from(e: lex::Error) -> Self {
        Error::Lex(e)
    }
}

impl From<parse::Error> for Error {
    fn from(e: parse::Error) -> Self {
        Error::Syntax(e)
    }
}

impl From<eval::Error> for Error {
    fn from(e: eval::Error) -> Self {
        Error::Eval(e)
    }
}

/// Parse the given line into an expression tree.
pub fn parse_line<S: AsRef<str>>(line: S) -> Result<ast::Expr, Error> {
    let tokens = lex::tokenize(line.as_ref())?;
    Ok(parse::parse(&tokens)?)
}

/// Evaluate the given line to a number.
pub fn eval_line<S: AsRef<str>>(line: S) -> Result<f64, Error> {
    let expr = parse_line(line)?;
    Ok(eval::evaluate(&expr)?)
}
