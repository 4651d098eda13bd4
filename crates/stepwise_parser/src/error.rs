//! Parse error type with source-context rendering.

use std::ops::Range;
use thiserror::Error;

/// A parse failure at a byte span of the input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Range<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// Format the error with the offending source line and a caret marker.
    pub fn display_with_source(&self, source: &str) -> String {
        let at = source_line(source, &self.span);
        let mut output = format!("error at {}:{}: {}\n", at.line, at.col, self.message);
        if let Some(text) = at.text {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", at.line, text));
            output.push_str(&format!(
                "  | {}{}\n",
                " ".repeat(at.col - 1),
                "^".repeat(at.width)
            ));
        }
        output
    }
}

/// Where a span starts, for caret rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub line: usize,
    /// 1-based, in characters
    pub col: usize,
    /// The whole line holding the span start, if the offset is in range.
    pub text: Option<&'a str>,
    /// Caret count: the span's characters, clamped to the rest of the line.
    pub width: usize,
}

pub fn source_line<'a>(source: &'a str, span: &Range<usize>) -> SourceLine<'a> {
    let (line, col) = line_col(source, span.start);
    let text = source.lines().nth(line - 1);
    let remaining = text
        .map_or(0, |t| t.chars().count().saturating_sub(col - 1))
        .max(1);
    let width = source
        .get(span.clone())
        .map_or(1, |s| s.chars().count())
        .clamp(1, remaining);
    SourceLine {
        line,
        col,
        text,
        width,
    }
}

/// 1-based line and column (in characters) of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut line_start = 0;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    let col = source
        .get(line_start..offset)
        .map(|s| s.chars().count())
        .unwrap_or(0)
        + 1;
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_from_one() {
        let src = "ab\ncd\nef";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 4), (2, 2));
        assert_eq!(line_col(src, src.len()), (3, 3));
    }

    #[test]
    fn caret_points_at_span() {
        let src = "let x = ;\n";
        let err = ParseError::new("expected expression", 8..9);
        let rendered = err.display_with_source(src);
        assert!(rendered.starts_with("error at 1:9: expected expression"));
        assert!(rendered.contains("  1 | let x = ;"));
        assert!(rendered.contains("  |         ^\n"));
    }

    #[test]
    fn caret_width_counts_characters() {
        let src = "let s = \"\u{e9}\u{e9}\" + ;\n";
        let err = ParseError::new("expected expression", 8..14);
        let rendered = err.display_with_source(src);
        assert!(rendered.starts_with("error at 1:9: "), "{}", rendered);
        assert!(rendered.ends_with("  |         ^^^^\n"), "{}", rendered);

        let at = source_line(src, &(13..15));
        assert_eq!((at.line, at.col, at.width), (1, 12, 2));
    }

    #[test]
    fn span_past_the_end_still_renders() {
        let at = source_line("abc", &(3..3));
        assert_eq!((at.line, at.col, at.width), (1, 4, 1));
        assert_eq!(at.text, Some("abc"));
        assert_eq!(source_line("", &(0..0)).text, None);
    }
}
