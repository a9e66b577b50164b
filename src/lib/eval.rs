use std::fmt::Display;

use crate::ast::{BinOp, Expr, ExprKind, UnOp};
use crate::func::{self, Args};
use crate::input::{HasSpan, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    UnknownFunc(Span, String),
    ArgCount {
        span: Span,
        name: String,
        expected: func::ArgCount,
        actual: usize,
    },
}

impl HasSpan for Error {
    fn span(&self) -> Span {
        match self {
            Error::UnknownFunc(span, _) => *span,
            Error::ArgCount { span, .. } => *span,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownFunc(_, name) => {
                write!(f, "Function `{name}` is unknown")
            }
            Error::ArgCount {
                name,
                expected,
                actual,
                ..
            } => {
                write!(
                    f,
                    "Function `{name}` expects {expected}, but received {actual}"
                )
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// Evaluate `expr` bottom-up.
///
/// IEEE special values are results, not errors: `1 / 0` is `inf`
/// and `0 / 0` is `NaN`.
pub fn evaluate(expr: &Expr) -> Result<f64> {
    match &expr.kind {
        ExprKind::Num(n) => Ok(*n),
        ExprKind::UnOp(op, rhs) => {
            let val = evaluate(rhs)?;
            match op {
                UnOp::Neg => Ok(-val),
            }
        }
        ExprKind::BinOp(op, lhs, rhs) => {
            let lhs = evaluate(lhs)?;
            let rhs = evaluate(rhs)?;
            Ok(match op {
                BinOp::Add => lhs + rhs,
                BinOp::Sub => lhs - rhs,
                BinOp::Mul => lhs * rhs,
                BinOp::Div => lhs / rhs,
                BinOp::Pow => lhs.powf(rhs),
                BinOp::Mod => lhs % rhs,
            })
        }
        ExprKind::Call {
            name_span,
            name,
            args,
        } => eval_call(expr.span, *name_span, name, args),
    }
}

fn eval_call(span: Span, name_span: Span, name: &str, args: &[Expr]) -> Result<f64> {
    let func = match func::lookup(name) {
        Some(f) => f,
        None => return Err(Error::UnknownFunc(name_span, name.to_string())),
    };
    let vals = args.iter().map(evaluate).collect::<Result<Vec<_>>>()?;
    let args = match Args::new(func.arg_count, &vals) {
        Some(args) => args,
        None => {
            return Err(Error::ArgCount {
                span,
                name: func.name.to_string(),
                expected: func.arg_count,
                actual: vals.len(),
            })
        }
    };
    Ok((func.eval)(args))
}

#[cfg(test)]
mod tests {
    use super::{evaluate, Error};
    use crate::ast::{BinOp, Expr, ExprKind, UnOp};
    use crate::func::ArgCount;
    use approx::assert_relative_eq;

    fn num(val: f64) -> Box<Expr> {
        Box::new(Expr {
            kind: ExprKind::Num(val),
            span: (0, 0),
        })
    }

    fn bin(op: BinOp, lhs: f64, rhs: f64) -> Expr {
        Expr {
            kind: ExprKind::BinOp(op, num(lhs), num(rhs)),
            span: (0, 0),
        }
    }

    fn call(name: &str, args: &[f64]) -> Expr {
        Expr {
            kind: ExprKind::Call {
                name_span: (0, name.len() as _),
                name: name.to_string(),
                args: args.iter().map(|v| *num(*v)).collect(),
            },
            span: (0, 10),
        }
    }

    #[test]
    fn test_binary_ops() {
        assert_eq!(evaluate(&bin(BinOp::Add, 1.0, 2.0)), Ok(3.0));
        assert_eq!(evaluate(&bin(BinOp::Sub, 1.0, 2.0)), Ok(-1.0));
        assert_eq!(evaluate(&bin(BinOp::Mul, 3.0, 2.0)), Ok(6.0));
        assert_eq!(evaluate(&bin(BinOp::Div, 3.0, 2.0)), Ok(1.5));
        assert_eq!(evaluate(&bin(BinOp::Pow, 2.0, 10.0)), Ok(1024.0));
        assert_eq!(evaluate(&bin(BinOp::Mod, 10.0, 3.0)), Ok(1.0));
        assert_eq!(evaluate(&bin(BinOp::Mod, -10.0, 3.0)), Ok(-1.0));
        assert_eq!(evaluate(&bin(BinOp::Mod, 10.0, -3.0)), Ok(1.0));
    }

    #[test]
    fn test_ieee_results_are_not_errors() {
        assert_eq!(evaluate(&bin(BinOp::Div, 1.0, 0.0)), Ok(f64::INFINITY));
        assert_eq!(evaluate(&bin(BinOp::Div, -1.0, 0.0)), Ok(f64::NEG_INFINITY));
        assert!(evaluate(&bin(BinOp::Div, 0.0, 0.0)).unwrap().is_nan());
        assert!(evaluate(&bin(BinOp::Mod, 1.0, 0.0)).unwrap().is_nan());
    }

    #[test]
    fn test_negate() {
        let expr = Expr {
            kind: ExprKind::UnOp(UnOp::Neg, num(4.0)),
            span: (0, 0),
        };
        assert_eq!(evaluate(&expr), Ok(-4.0));
    }

    #[test]
    fn test_calls() {
        assert_eq!(evaluate(&call("abs", &[-5.0])), Ok(5.0));
        assert_eq!(evaluate(&call("round", &[4.5])), Ok(5.0));
        assert_eq!(evaluate(&call("ceil", &[4.2])), Ok(5.0));
        assert_eq!(evaluate(&call("floor", &[4.9])), Ok(4.0));
        assert_eq!(evaluate(&call("pow", &[2.0, 3.0])), Ok(8.0));
        assert_eq!(evaluate(&call("root", &[2.0, 16.0])), Ok(4.0));
        assert_relative_eq!(
            evaluate(&call("root", &[3.0, 64.0])).unwrap(),
            4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn fail_arg_count() {
        assert_eq!(
            evaluate(&call("root", &[2.0])),
            Err(Error::ArgCount {
                span: (0, 10),
                name: "root".to_string(),
                expected: ArgCount::Two,
                actual: 1,
            })
        );
        assert!(matches!(
            evaluate(&call("abs", &[1.0, 2.0])),
            Err(Error::ArgCount { actual: 2, .. })
        ));
    }

    #[test]
    fn fail_unknown_func() {
        assert_eq!(
            evaluate(&call("sin", &[1.0])),
            Err(Error::UnknownFunc((0, 3), "sin".to_string()))
        );
    }
}
