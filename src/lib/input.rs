/// Byte position into an input line.
pub type Pos = u32;

/// Byte span into an input line
/// (first pos, one past last pos)
pub type Span = (Pos, Pos);

pub trait HasSpan {
    fn span(&self) -> Span;
}

/// Span covering both `a` and `b`.
pub fn join(a: Span, b: Span) -> Span {
    (a.0.min(b.0), a.1.max(b.1))
}

/// Render a caret line pointing at `span` of `line`, to print under it.
/// Columns are counted in chars; the span may run past the end of the line.
pub fn caret(line: &str, span: Span) -> String {
    let start = span.0 as usize;
    let end = (span.1 as usize).max(start);
    let pad = match line.get(..start) {
        Some(s) => s.chars().count(),
        None => start,
    };
    let width = match line.get(start..end) {
        Some(s) => s.chars().count(),
        None => end - start,
    };
    format!("{}{}", " ".repeat(pad), "^".repeat(width.max(1)))
}

#[cfg(test)]
mod tests {
    use super::{caret, join};

    #[test]
    fn test_join() {
        assert_eq!(join((0, 1), (4, 5)), (0, 5));
        assert_eq!(join((4, 5), (0, 1)), (0, 5));
        assert_eq!(join((2, 9), (3, 4)), (2, 9));
    }

    #[test]
    fn test_caret() {
        assert_eq!(caret("1 + 2", (0, 1)), "^");
        assert_eq!(caret("1 + abs", (4, 7)), "    ^^^");
        // empty spans still get a visible marker
        assert_eq!(caret("1 + 2", (3, 3)), "   ^");
        // end of input points one past the line
        assert_eq!(caret("1 +", (3, 4)), "   ^");
    }

    #[test]
    fn test_caret_counts_chars() {
        // 'é' takes two bytes, ')' is at byte 5
        assert_eq!(caret("é + )", (5, 6)), "    ^");
        assert_eq!(caret("1\u{a0}+ é", (5, 7)), "    ^");
    }
}
