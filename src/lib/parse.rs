//! Parser module
//!
//! Recursive descent over the grammar in `doc/Grammar.ebnf`.
//! Each binary level loops over the operators of one `Precedence`,
//! delegating its operands to the next tighter level, down to primaries.
use std::fmt::Display;

use crate::ast::{Expr, ExprKind, UnOp};
use crate::input::{join, HasSpan, Span};
use crate::lex::Token;
use crate::registry::{self, Precedence, CLOSE_PAR, COMMA, OPEN_PAR};

/// Syntax errors. `pos` is the index of the offending token.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    UnexpectedToken {
        pos: usize,
        token: Token,
        expected: &'static str,
    },
    UnexpectedEndOfInput {
        pos: usize,
        span: Span,
    },
    UnterminatedGroup {
        pos: usize,
        open: Span,
        span: Span,
    },
    ExpectedCallBracket {
        pos: usize,
        name: Token,
    },
    TooDeep {
        pos: usize,
        span: Span,
    },
}

impl Error {
    pub fn pos(&self) -> usize {
        match self {
            Error::UnexpectedToken { pos, .. }
            | Error::UnexpectedEndOfInput { pos, .. }
            | Error::UnterminatedGroup { pos, .. }
            | Error::ExpectedCallBracket { pos, .. }
            | Error::TooDeep { pos, .. } => *pos,
        }
    }
}

impl HasSpan for Error {
    fn span(&self) -> Span {
        match self {
            Error::UnexpectedToken { token, .. } => token.span,
            Error::UnexpectedEndOfInput { span, .. } => *span,
            Error::UnterminatedGroup { span, .. } => *span,
            Error::ExpectedCallBracket { name, .. } => (name.span.1, name.span.1 + 1),
            Error::TooDeep { span, .. } => *span,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnexpectedToken {
                pos,
                token,
                expected,
            } => {
                write!(
                    f,
                    "Unexpected token '{}' at token {} (expected {})",
                    token, pos, expected
                )
            }
            Error::UnexpectedEndOfInput { pos, .. } => {
                write!(f, "Unexpected end of input at token {}", pos)
            }
            Error::UnterminatedGroup { pos, open, .. } => {
                write!(
                    f,
                    "Missing ')' at token {} to close '(' at {}",
                    pos,
                    open.0 + 1
                )
            }
            Error::ExpectedCallBracket { name, .. } => {
                write!(f, "Expected '(' after function name '{}'", name)
            }
            Error::TooDeep { pos, .. } => {
                write!(
                    f,
                    "Expression nested deeper than {} levels at token {}",
                    MAX_DEPTH, pos
                )
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// Nesting limit for groups, calls, unary `-` and `^` chains.
pub const MAX_DEPTH: usize = 64;

/// Parse a whole token sequence into one expression.
/// Tokens left over after the expression are an error.
pub fn parse(tokens: &[Token]) -> Result<Expr> {
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    parser.expect_end()?;
    Ok(expr)
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Index of the next token to be consumed.
    pub fn cursor(&self) -> usize {
        self.pos
    }
}

impl<'a> Parser<'a> {
    fn first_token(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next_token(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn bump_token(&mut self) {
        self.pos = (self.pos + 1).min(self.tokens.len());
    }

    fn next_is(&self, lexeme: &str) -> bool {
        matches!(self.first_token(), Some(tok) if tok.lexeme == lexeme)
    }

    fn eoi_span(&self) -> Span {
        match self.tokens.last() {
            Some(tok) => (tok.span.1, tok.span.1 + 1),
            None => (0, 1),
        }
    }

    fn expect_close(&mut self, open: Span) -> Result<Span> {
        let pos = self.pos;
        match self.first_token() {
            Some(tok) if tok.lexeme == CLOSE_PAR => {
                self.bump_token();
                Ok(tok.span)
            }
            Some(tok) => Err(Error::UnterminatedGroup {
                pos,
                open,
                span: tok.span,
            }),
            None => Err(Error::UnterminatedGroup {
                pos,
                open,
                span: self.eoi_span(),
            }),
        }
    }

    /// Run `f` one nesting level deeper, failing past `MAX_DEPTH`.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            let span = match self.first_token() {
                Some(tok) => tok.span,
                None => self.eoi_span(),
            };
            return Err(Error::TooDeep {
                pos: self.pos,
                span,
            });
        }
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    fn expect_end(&self) -> Result<()> {
        match self.first_token() {
            Some(tok) => Err(Error::UnexpectedToken {
                pos: self.pos,
                token: tok.clone(),
                expected: "operator or end of input",
            }),
            None => Ok(()),
        }
    }
}

impl<'a> Parser<'a> {
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_binary(Precedence::Additive)
    }

    fn parse_binary(&mut self, level: Precedence) -> Result<Expr> {
        let mut lhs = self.parse_operand(level)?;
        loop {
            let op = match self.first_token().and_then(|tok| registry::bin_op(&tok.lexeme)) {
                Some(op) if registry::precedence(op) == level => op,
                _ => return Ok(lhs),
            };
            self.bump_token();
            let rhs = if level.is_right_assoc() {
                self.nested(|p| p.parse_binary(level))?
            } else {
                self.parse_operand(level)?
            };
            lhs = Expr {
                span: join(lhs.span, rhs.span),
                kind: ExprKind::BinOp(op, Box::new(lhs), Box::new(rhs)),
            };
        }
    }

    fn parse_operand(&mut self, level: Precedence) -> Result<Expr> {
        match level.tighter() {
            Some(level) => self.parse_binary(level),
            None => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        self.nested(Self::primary)
    }

    fn primary(&mut self) -> Result<Expr> {
        let pos = self.pos;
        let tok = match self.next_token() {
            Some(tok) => tok,
            None => {
                return Err(Error::UnexpectedEndOfInput {
                    pos,
                    span: self.eoi_span(),
                })
            }
        };
        let lexeme = tok.lexeme.as_str();

        if lexeme == "-" {
            let rhs = self.parse_primary()?;
            return Ok(Expr {
                span: join(tok.span, rhs.span),
                kind: ExprKind::UnOp(UnOp::Neg, Box::new(rhs)),
            });
        }
        if lexeme == OPEN_PAR {
            let expr = self.parse_expr()?;
            let close = self.expect_close(tok.span)?;
            return Ok(Expr {
                kind: expr.kind,
                span: join(tok.span, close),
            });
        }
        if registry::is_function(lexeme) {
            return self.parse_call(tok);
        }
        if let Some(val) = registry::constant(lexeme) {
            return Ok(Expr {
                kind: ExprKind::Num(val),
                span: tok.span,
            });
        }
        if registry::is_number(lexeme) {
            if let Ok(val) = lexeme.parse::<f64>() {
                return Ok(Expr {
                    kind: ExprKind::Num(val),
                    span: tok.span,
                });
            }
        }
        Err(Error::UnexpectedToken {
            pos,
            token: tok.clone(),
            expected: "number, constant, function or '('",
        })
    }

    fn parse_call(&mut self, name: &'a Token) -> Result<Expr> {
        let open = match self.first_token() {
            Some(tok) if tok.lexeme == OPEN_PAR => {
                self.bump_token();
                tok.span
            }
            _ => {
                return Err(Error::ExpectedCallBracket {
                    pos: self.pos,
                    name: name.clone(),
                })
            }
        };

        // arity is checked by the evaluator
        let mut args = vec![self.parse_expr()?];
        while self.next_is(COMMA) {
            self.bump_token();
            args.push(self.parse_expr()?);
        }
        let close = self.expect_close(open)?;

        Ok(Expr {
            kind: ExprKind::Call {
                name_span: name.span,
                name: name.lexeme.clone(),
                args,
            },
            span: join(name.span, close),
        })
    }
}

#[cfg(test)]
use crate::ast::BinOp;

#[cfg(test)]
fn parse_str(text: &str) -> Result<Expr> {
    let tokens = crate::lex::tokenize(text).unwrap();
    parse(&tokens)
}

#[cfg(test)]
fn num(val: f64, span: Span) -> Box<Expr> {
    Box::new(Expr {
        kind: ExprKind::Num(val),
        span,
    })
}

#[test]
fn test_parse_add() {
    assert_eq!(
        parse_str("1 + 2").unwrap(),
        Expr {
            span: (0, 5),
            kind: ExprKind::BinOp(BinOp::Add, num(1.0, (0, 1)), num(2.0, (4, 5))),
        }
    );
}

#[test]
fn test_parse_unary() {
    assert_eq!(
        parse_str("-3").unwrap(),
        Expr {
            span: (0, 2),
            kind: ExprKind::UnOp(UnOp::Neg, num(3.0, (1, 2))),
        }
    );
}

#[test]
fn test_parse_unary_chain() {
    assert_eq!(
        parse_str("--1").unwrap(),
        Expr {
            span: (0, 3),
            kind: ExprKind::UnOp(
                UnOp::Neg,
                Box::new(Expr {
                    span: (1, 3),
                    kind: ExprKind::UnOp(UnOp::Neg, num(1.0, (2, 3))),
                })
            ),
        }
    );
}

#[test]
fn test_parse_unary_binds_tighter_than_pow() {
    assert_eq!(
        parse_str("-2^2").unwrap(),
        Expr {
            span: (0, 4),
            kind: ExprKind::BinOp(
                BinOp::Pow,
                Box::new(Expr {
                    span: (0, 2),
                    kind: ExprKind::UnOp(UnOp::Neg, num(2.0, (1, 2))),
                }),
                num(2.0, (3, 4)),
            ),
        }
    );
}

#[test]
fn test_parse_add_mul() {
    assert_eq!(
        parse_str("1 + 2 * 3").unwrap(),
        Expr {
            span: (0, 9),
            kind: ExprKind::BinOp(
                BinOp::Add,
                num(1.0, (0, 1)),
                Box::new(Expr {
                    span: (4, 9),
                    kind: ExprKind::BinOp(BinOp::Mul, num(2.0, (4, 5)), num(3.0, (8, 9))),
                }),
            ),
        }
    );
}

#[test]
fn test_parse_mul_add_parentheses() {
    assert_eq!(
        parse_str("(1 + 2) * 3").unwrap(),
        Expr {
            span: (0, 11),
            kind: ExprKind::BinOp(
                BinOp::Mul,
                Box::new(Expr {
                    span: (0, 7),
                    kind: ExprKind::BinOp(BinOp::Add, num(1.0, (1, 2)), num(2.0, (5, 6))),
                }),
                num(3.0, (10, 11)),
            ),
        }
    );
}

#[test]
fn test_parse_minus_minus() {
    assert_eq!(
        parse_str("1 - 2 - 3").unwrap(),
        Expr {
            span: (0, 9),
            kind: ExprKind::BinOp(
                BinOp::Sub,
                Box::new(Expr {
                    span: (0, 5),
                    kind: ExprKind::BinOp(BinOp::Sub, num(1.0, (0, 1)), num(2.0, (4, 5))),
                }),
                num(3.0, (8, 9)),
            ),
        }
    );
}

#[test]
fn test_parse_mod_is_multiplicative() {
    assert_eq!(
        parse_str("7 mod 4 * 2").unwrap(),
        Expr {
            span: (0, 11),
            kind: ExprKind::BinOp(
                BinOp::Mul,
                Box::new(Expr {
                    span: (0, 7),
                    kind: ExprKind::BinOp(BinOp::Mod, num(7.0, (0, 1)), num(4.0, (6, 7))),
                }),
                num(2.0, (10, 11)),
            ),
        }
    );
}

#[test]
fn test_parse_pow_pow() {
    assert_eq!(
        parse_str("2 ^ 3 ^ 2").unwrap(),
        Expr {
            span: (0, 9),
            kind: ExprKind::BinOp(
                BinOp::Pow,
                num(2.0, (0, 1)),
                Box::new(Expr {
                    span: (4, 9),
                    kind: ExprKind::BinOp(BinOp::Pow, num(3.0, (4, 5)), num(2.0, (8, 9))),
                }),
            ),
        }
    );
}

#[test]
fn test_parse_call() {
    assert_eq!(
        parse_str("root(2, PI)").unwrap(),
        Expr {
            span: (0, 11),
            kind: ExprKind::Call {
                name_span: (0, 4),
                name: "root".to_string(),
                args: vec![
                    Expr {
                        span: (5, 6),
                        kind: ExprKind::Num(2.0),
                    },
                    Expr {
                        span: (8, 10),
                        kind: ExprKind::Num(std::f64::consts::PI),
                    },
                ],
            },
        }
    );
}

#[test]
fn test_parse_call_accepts_any_arg_count() {
    match parse_str("abs(1, 2, 3)").unwrap().kind {
        ExprKind::Call { name, args, .. } => {
            assert_eq!(name, "abs");
            assert_eq!(args.len(), 3);
        }
        kind => panic!("expected a call, got {:?}", kind),
    }
}

#[test]
fn test_parse_mod_call() {
    assert!(matches!(
        parse_str("mod(10, 3)").unwrap().kind,
        ExprKind::Call { ref name, .. } if name == "mod"
    ));
}

#[test]
fn test_cursor_stops_before_trailing_token() {
    let tokens = crate::lex::tokenize("1 + 2 )").unwrap();
    let mut parser = Parser::new(&tokens);
    parser.parse_expr().unwrap();
    assert_eq!(parser.cursor(), 3);
    assert!(parser.expect_end().is_err());
}

#[test]
fn fail_end_of_input() {
    assert_eq!(
        parse_str("1 +"),
        Err(Error::UnexpectedEndOfInput {
            pos: 2,
            span: (3, 4),
        })
    );
    assert_eq!(
        parse(&[]),
        Err(Error::UnexpectedEndOfInput {
            pos: 0,
            span: (0, 1),
        })
    );
}

#[test]
fn fail_unterminated_group() {
    assert_eq!(
        parse_str("(1 + 2"),
        Err(Error::UnterminatedGroup {
            pos: 4,
            open: (0, 1),
            span: (6, 7),
        })
    );
    let err = parse_str("root(2 root(2, 16))").unwrap_err();
    assert!(matches!(err, Error::UnterminatedGroup { pos: 3, open: (4, 5), .. }));
}

#[test]
fn fail_trailing_tokens() {
    for (input, pos) in [("1 2", 1), ("1 + 2)", 3), ("PI()", 1), ("TAU(2)", 1)] {
        let err = parse_str(input).unwrap_err();
        assert!(
            matches!(err, Error::UnexpectedToken { expected: "operator or end of input", .. }),
            "{input}: {err:?}"
        );
        assert_eq!(err.pos(), pos, "{input}");
    }
}

#[test]
fn fail_unexpected_token() {
    for input in ["* 3", ",1 + 2", "1 + + 2", "pow()", "round(,4)", "pow(2, )", "foo(1)", "x"] {
        assert!(
            matches!(parse_str(input), Err(Error::UnexpectedToken { .. })),
            "{input}"
        );
    }
}

#[test]
fn test_parse_nesting_within_limit() {
    let input = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert!(parse_str(&input).is_ok());
    assert!(parse_str(&"-".repeat(50)).is_err());
    assert!(parse_str(&format!("{}1", "-".repeat(50))).is_ok());
}

#[test]
fn fail_too_deep() {
    let inputs = [
        format!("{}1{}", "(".repeat(1000), ")".repeat(1000)),
        format!("{}1", "-".repeat(1000)),
        format!("2{}", "^2".repeat(1000)),
        format!("{}1{}", "abs(".repeat(1000), ")".repeat(1000)),
    ];
    for input in &inputs {
        let err = parse_str(input).unwrap_err();
        assert!(matches!(err, Error::TooDeep { .. }), "{err:?}");
    }
    // the failing token is the one that opens the level past the limit
    let err = parse_str(&format!("{}1", "-".repeat(100))).unwrap_err();
    assert_eq!(
        err,
        Error::TooDeep {
            pos: MAX_DEPTH,
            span: (MAX_DEPTH as u32, MAX_DEPTH as u32 + 1),
        }
    );
}

#[test]
fn fail_constant_prefix_is_unknown_word() {
    for input in ["PIE", "pie", "TAU2 + 1"] {
        let err = parse_str(input).unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }), "{input}: {err:?}");
        assert_eq!(err.pos(), 0, "{input}");
    }
}

#[test]
fn fail_call_without_bracket() {
    let err = parse_str("abs 5").unwrap_err();
    assert_eq!(err.pos(), 1);
    assert!(matches!(err, Error::ExpectedCallBracket { ref name, .. } if name.lexeme == "abs"));
}
