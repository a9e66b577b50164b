//! Static tables shared by the tokenizer and the parser.
//!
//! Tokens are plain lexemes; their role is decided by membership in the
//! tables below rather than by a tag attached when they are emitted.

use std::sync::OnceLock;

use regex::Regex;

use crate::ast::BinOp;
use crate::func;

pub const DIGITS: &[&str] = &["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "."];
pub const OPERATORS: &[&str] = &["+", "-", "*", "/", "^", "mod"];
pub const OPEN_PAR: &str = "(";
pub const CLOSE_PAR: &str = ")";
pub const COMMA: &str = ",";
pub const CONSTANTS: &[(&str, f64)] = &[("PI", std::f64::consts::PI), ("TAU", std::f64::consts::TAU)];

/// Binding strength of infix operators, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Additive = 1,
    Multiplicative = 2,
    Exponent = 3,
}

impl Precedence {
    /// The next level binding tighter, if any.
    /// Past `Exponent` come primaries.
    pub fn tighter(self) -> Option<Precedence> {
        match self {
            Precedence::Additive => Some(Precedence::Multiplicative),
            Precedence::Multiplicative => Some(Precedence::Exponent),
            Precedence::Exponent => None,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        self == Precedence::Exponent
    }
}

/// Infix operator spelled by `lexeme`.
pub fn bin_op(lexeme: &str) -> Option<BinOp> {
    match lexeme {
        "+" => Some(BinOp::Add),
        "-" => Some(BinOp::Sub),
        "*" => Some(BinOp::Mul),
        "/" => Some(BinOp::Div),
        "^" => Some(BinOp::Pow),
        "mod" => Some(BinOp::Mod),
        _ => None,
    }
}

pub fn precedence(op: BinOp) -> Precedence {
    match op {
        BinOp::Add | BinOp::Sub => Precedence::Additive,
        BinOp::Mul | BinOp::Div | BinOp::Mod => Precedence::Multiplicative,
        BinOp::Pow => Precedence::Exponent,
    }
}

/// Value of a named constant. Lookup ignores case.
pub fn constant(name: &str) -> Option<f64> {
    let name = name.to_uppercase();
    CONSTANTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
}

pub fn is_digit(lexeme: &str) -> bool {
    DIGITS.iter().any(|d| *d == lexeme)
}

pub fn is_symbol(lexeme: &str) -> bool {
    symbols().iter().any(|s| *s == lexeme)
}

pub fn is_function(lexeme: &str) -> bool {
    func::lookup(lexeme).is_some()
}

/// Whether `lexeme` is a well formed decimal number.
pub fn is_number(lexeme: &str) -> bool {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER
        .get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid number pattern"))
        .is_match(lexeme)
}

/// Every lexeme the language knows, longest first.
/// Ties keep table order, so the result is deterministic.
pub fn symbols() -> &'static [&'static str] {
    static SYMBOLS: OnceLock<Vec<&'static str>> = OnceLock::new();
    SYMBOLS.get_or_init(|| {
        let mut syms: Vec<&'static str> = DIGITS
            .iter()
            .chain(OPERATORS)
            .chain(&[OPEN_PAR, CLOSE_PAR, COMMA])
            .copied()
            .chain(func::all_funcs().iter().map(|f| f.name))
            .chain(CONSTANTS.iter().map(|(n, _)| *n))
            .collect();
        // "mod" is both operator and function
        let mut seen = std::collections::HashSet::new();
        syms.retain(|s| seen.insert(*s));
        syms.sort_by_key(|s| std::cmp::Reverse(s.len()));
        syms
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_longest_first() {
        let syms = symbols();
        assert!(syms.windows(2).all(|w| w[0].len() >= w[1].len()));
        assert_eq!(syms.iter().filter(|s| **s == "mod").count(), 1);
        for s in ["root", "pow", "PI", "TAU", "(", ")", ",", "^", "."] {
            assert!(syms.contains(&s), "{s} missing");
        }
    }

    #[test]
    fn test_precedence_order() {
        assert!(precedence(BinOp::Add) < precedence(BinOp::Mul));
        assert!(precedence(BinOp::Mod) < precedence(BinOp::Pow));
        assert_eq!(precedence(BinOp::Sub) as u8, 1);
        assert_eq!(precedence(BinOp::Div) as u8, 2);
        assert_eq!(precedence(BinOp::Pow) as u8, 3);
        assert_eq!(Precedence::Exponent.tighter(), None);
    }

    #[test]
    fn test_constant_ignores_case() {
        assert_eq!(constant("PI"), Some(std::f64::consts::PI));
        assert_eq!(constant("pi"), Some(std::f64::consts::PI));
        assert_eq!(constant("Tau"), Some(std::f64::consts::TAU));
        assert_eq!(constant("e"), None);
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("12"));
        assert!(is_number("1.25"));
        assert!(is_number("-3"));
        assert!(!is_number("1."));
        assert!(!is_number(".5"));
        assert!(!is_number("1.2.3"));
    }
}
