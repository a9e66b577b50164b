use std::sync::OnceLock;

use regex::Regex;

use crate::input::{HasSpan, Pos, Span};
use crate::registry;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidNumber(Span, String),
    InvalidChar(Pos, char),
}

impl HasSpan for Error {
    fn span(&self) -> Span {
        match self {
            Error::InvalidNumber(span, _) => *span,
            Error::InvalidChar(pos, c) => (*pos, *pos + c.len_utf8() as Pos),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidNumber(_, s) => write!(f, "Invalid number: '{}'", s),
            Error::InvalidChar(_, c) => write!(f, "Invalid character: '{}'", c),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A lexeme and where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    fn new(lexeme: &str, span: Span) -> Token {
        Token {
            lexeme: lexeme.to_string(),
            span,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lexeme)
    }
}

/// Alternation of every known symbol, longest first, then fallbacks
/// for unknown words, whitespace and any other character.
/// Constant names only match as whole words, so that `PIE` and `pie`
/// are both one unknown word.
fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        let syms: Vec<String> = registry::symbols()
            .iter()
            .map(|s| match registry::constant(s) {
                Some(_) => format!(r"{}\b", regex::escape(s)),
                None => regex::escape(s),
            })
            .collect();
        let pattern = format!(r"{}|[A-Za-z_][A-Za-z0-9_]*|\s+|.", syms.join("|"));
        Regex::new(&pattern).expect("valid token pattern")
    })
}

/// Digits and decimal points waiting to be emitted as one number token.
#[derive(Debug, Default)]
struct NumAccum {
    span: Span,
    text: String,
}

impl NumAccum {
    fn push(&mut self, lexeme: &str, span: Span) {
        if self.text.is_empty() {
            self.span = span;
        } else {
            self.span.1 = span.1;
        }
        self.text.push_str(lexeme);
    }

    fn flush(&mut self, tokens: &mut Vec<Token>) -> Result<()> {
        if self.text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.text);
        if !registry::is_number(&text) {
            return Err(Error::InvalidNumber(self.span, text));
        }
        tokens.push(Token {
            lexeme: text,
            span: self.span,
        });
        Ok(())
    }
}

/// Split `text` into lexemes.
///
/// Whitespace separates tokens and is dropped, so the lexemes joined
/// back together give `text` without its whitespace.
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut num = NumAccum::default();

    for m in token_regex().find_iter(text) {
        let lexeme = m.as_str();
        let span = (m.start() as Pos, m.end() as Pos);

        if registry::is_digit(lexeme) {
            num.push(lexeme, span);
            continue;
        }
        num.flush(&mut tokens)?;

        if lexeme.chars().all(char::is_whitespace) {
            continue;
        }
        if !is_word(lexeme) && !registry::is_symbol(lexeme) {
            let c = lexeme.chars().next().unwrap_or_default();
            return Err(Error::InvalidChar(span.0, c));
        }
        tokens.push(Token::new(lexeme, span));
    }
    num.flush(&mut tokens)?;

    Ok(tokens)
}

fn is_word(lexeme: &str) -> bool {
    let mut chars = lexeme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
fn lexemes(text: &str) -> Vec<String> {
    tokenize(text)
        .unwrap()
        .into_iter()
        .map(|t| t.lexeme)
        .collect()
}

#[test]
fn test_tokenize() {
    let tokens = tokenize("1 + 2.5").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token {
                lexeme: "1".to_string(),
                span: (0, 1),
            },
            Token {
                lexeme: "+".to_string(),
                span: (2, 3),
            },
            Token {
                lexeme: "2.5".to_string(),
                span: (4, 7),
            },
        ]
    );
}

#[test]
fn test_tokenize_functions() {
    assert_eq!(
        lexemes("5 + 10 + root(2, 16)"),
        ["5", "+", "10", "+", "root", "(", "2", ",", "16", ")"]
    );
    assert_eq!(
        lexemes("root(2, root(3, 64)) + root(2, root(5, 1024))"),
        [
            "root", "(", "2", ",", "root", "(", "3", ",", "64", ")", ")", "+", "root", "(", "2",
            ",", "root", "(", "5", ",", "1024", ")", ")"
        ]
    );
    assert_eq!(lexemes("10mod3"), ["10", "mod", "3"]);
    assert_eq!(lexemes("PI*TAU"), ["PI", "*", "TAU"]);
}

#[test]
fn test_tokenize_spaces_split_numbers() {
    assert_eq!(lexemes("5 5 5"), ["5", "5", "5"]);
    assert_eq!(lexemes("555"), ["555"]);
}

#[test]
fn test_tokenize_unknown_words() {
    assert_eq!(lexemes("pi * x1"), ["pi", "*", "x1"]);
    // known symbols win over the word fallback
    assert_eq!(lexemes("rooty"), ["root", "y"]);
}

#[test]
fn test_tokenize_constants_are_whole_words() {
    assert_eq!(lexemes("PIE + pie"), ["PIE", "+", "pie"]);
    assert_eq!(lexemes("TAU2"), ["TAU2"]);
    assert_eq!(lexemes("2PI"), ["2", "PI"]);
    assert_eq!(lexemes("(PI)*TAU"), ["(", "PI", ")", "*", "TAU"]);
}

#[test]
fn test_tokenize_invalid_number() {
    assert_eq!(
        tokenize("1 + 1.2.3"),
        Err(Error::InvalidNumber((4, 9), "1.2.3".to_string()))
    );
    assert_eq!(
        tokenize("5."),
        Err(Error::InvalidNumber((0, 2), "5.".to_string()))
    );
    assert!(tokenize(".5").is_err());
}

#[test]
fn test_tokenize_invalid_char() {
    assert_eq!(tokenize("1 $ 2"), Err(Error::InvalidChar(2, '$')));
    assert_eq!(tokenize("2 % 3").unwrap_err().span(), (2, 3));
}

#[test]
fn test_tokenize_round_trip() {
    let inputs = [
        "1 + 2 * 3 ^ 2",
        "(1 + 2 * 3) ^ 2",
        "root(2, root(3, 64))",
        "- - -(- 1 - - - 2)",
        "abs(-PI) + abs(-TAU)",
        "10 mod 3",
        "round(root(2, 16) + 0.4)",
    ];
    for input in inputs {
        let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(lexemes(input).concat(), stripped, "{input}");
        assert_eq!(lexemes(&stripped).concat(), stripped, "{input}");
    }
}
