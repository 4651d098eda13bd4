//! Tokenizer for TypeScript source code
//!
//! Produces a flat token stream with whitespace and comments included;
//! [`filter_whitespace_and_comments`] drops them and records on each
//! remaining token whether a line break preceded it, which the parser needs
//! for automatic semicolon insertion and for `return`/`yield` arguments.

use crate::MAX_NESTING_DEPTH;
use std::ops::Range;

/// Represents a token in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token kind
    pub kind: TokenKind,
    /// The source span (byte range)
    pub span: Range<usize>,
    /// The actual text of the token
    pub text: String,
    /// A line terminator appeared between the previous token and this one
    pub newline_before: bool,
}

/// One `${...}` substitution inside a template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExpr {
    /// Source text between `${` and the matching `}`
    pub source: String,
    /// Byte offset of that text in the original source
    pub offset: usize,
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Reserved words
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Export,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    Let,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    Yield,
    Await,

    // Identifiers, including contextual keywords (`async`, `of`, `as`, ...)
    Ident(String),

    // Literals
    String(String),
    Number(f64),
    /// Template literal: raw quasis and substitution sources
    Template {
        quasis: Vec<String>,
        exprs: Vec<TemplateExpr>,
    },

    // Operators
    Plus,             // +
    Minus,            // -
    Star,             // *
    Slash,            // /
    Percent,          // %
    PlusPlus,         // ++
    MinusMinus,       // --
    PlusEq,           // +=
    MinusEq,          // -=
    StarEq,           // *=
    SlashEq,          // /=
    PercentEq,        // %=
    Eq,               // =
    EqEq,             // ==
    NotEq,            // !=
    EqEqEq,           // ===
    NotEqEq,          // !==
    Lt,               // <
    Gt,               // >
    LtEq,             // <=
    GtEq,             // >=
    LtLt,             // <<
    GtGt,             // >>
    GtGtGt,           // >>>
    LtLtEq,           // <<=
    GtGtEq,           // >>=
    GtGtGtEq,         // >>>=
    And,              // &
    Or,               // |
    Xor,              // ^
    AndEq,            // &=
    OrEq,             // |=
    XorEq,            // ^=
    AndAnd,           // &&
    OrOr,             // ||
    AndAndEq,         // &&=
    OrOrEq,           // ||=
    Not,              // !
    Tilde,            // ~
    Question,         // ?
    Colon,            // :
    QuestionDot,      // ?.
    DoubleQuestion,   // ??
    DoubleQuestionEq, // ??=
    StarStar,         // **
    StarStarEq,       // **=

    // Punctuation
    Semicolon,    // ;
    Comma,        // ,
    Dot,          // .
    DotDotDot,    // ...
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }
    Arrow,        // =>
    At,           // @

    // Comments and whitespace (usually filtered out)
    LineComment(String),
    BlockComment(String),
    Whitespace,

    // Other
    Unknown,
    /// String or template literal missing its closing delimiter
    Unterminated,
    Eof,
}

impl TokenKind {
    /// Reserved word for an identifier-like lexeme, if any.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        Some(match text {
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "catch" => TokenKind::Catch,
            "class" => TokenKind::Class,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "debugger" => TokenKind::Debugger,
            "default" => TokenKind::Default,
            "delete" => TokenKind::Delete,
            "do" => TokenKind::Do,
            "else" => TokenKind::Else,
            "export" => TokenKind::Export,
            "extends" => TokenKind::Extends,
            "false" => TokenKind::False,
            "finally" => TokenKind::Finally,
            "for" => TokenKind::For,
            "function" => TokenKind::Function,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "in" => TokenKind::In,
            "instanceof" => TokenKind::Instanceof,
            "let" => TokenKind::Let,
            "new" => TokenKind::New,
            "null" => TokenKind::Null,
            "return" => TokenKind::Return,
            "super" => TokenKind::Super,
            "switch" => TokenKind::Switch,
            "this" => TokenKind::This,
            "throw" => TokenKind::Throw,
            "true" => TokenKind::True,
            "try" => TokenKind::Try,
            "typeof" => TokenKind::Typeof,
            "var" => TokenKind::Var,
            "void" => TokenKind::Void,
            "while" => TokenKind::While,
            "yield" => TokenKind::Yield,
            "await" => TokenKind::Await,
            _ => return None,
        })
    }

    /// True for tokens that carry a name, reserved or not. Property names
    /// after `.` and object keys accept any of these.
    pub fn is_identifier_name(&self) -> bool {
        matches!(self, TokenKind::Ident(_)) || self.is_reserved_word()
    }

    pub fn is_reserved_word(&self) -> bool {
        matches!(
            self,
            TokenKind::Break
                | TokenKind::Case
                | TokenKind::Catch
                | TokenKind::Class
                | TokenKind::Const
                | TokenKind::Continue
                | TokenKind::Debugger
                | TokenKind::Default
                | TokenKind::Delete
                | TokenKind::Do
                | TokenKind::Else
                | TokenKind::Export
                | TokenKind::Extends
                | TokenKind::False
                | TokenKind::Finally
                | TokenKind::For
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::Import
                | TokenKind::In
                | TokenKind::Instanceof
                | TokenKind::Let
                | TokenKind::New
                | TokenKind::Null
                | TokenKind::Return
                | TokenKind::Super
                | TokenKind::Switch
                | TokenKind::This
                | TokenKind::Throw
                | TokenKind::True
                | TokenKind::Try
                | TokenKind::Typeof
                | TokenKind::Var
                | TokenKind::Void
                | TokenKind::While
                | TokenKind::Yield
                | TokenKind::Await
        )
    }
}

/// Punctuators, longest first so the first prefix match wins.
const PUNCTUATORS: &[(&str, TokenKind)] = &[
    (">>>=", TokenKind::GtGtGtEq),
    ("...", TokenKind::DotDotDot),
    ("===", TokenKind::EqEqEq),
    ("!==", TokenKind::NotEqEq),
    ("**=", TokenKind::StarStarEq),
    ("<<=", TokenKind::LtLtEq),
    (">>=", TokenKind::GtGtEq),
    (">>>", TokenKind::GtGtGt),
    ("&&=", TokenKind::AndAndEq),
    ("||=", TokenKind::OrOrEq),
    ("??=", TokenKind::DoubleQuestionEq),
    ("=>", TokenKind::Arrow),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("<<", TokenKind::LtLt),
    (">>", TokenKind::GtGt),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AndEq),
    ("|=", TokenKind::OrEq),
    ("^=", TokenKind::XorEq),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("??", TokenKind::DoubleQuestion),
    ("?.", TokenKind::QuestionDot),
    ("**", TokenKind::StarStar),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("=", TokenKind::Eq),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("&", TokenKind::And),
    ("|", TokenKind::Or),
    ("^", TokenKind::Xor),
    ("!", TokenKind::Not),
    ("~", TokenKind::Tilde),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    ("[", TokenKind::LeftBracket),
    ("]", TokenKind::RightBracket),
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
    ("@", TokenKind::At),
];

/// Unicode whitespace plus the byte order mark, which JavaScript also skips.
fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Tokenize a source string into a vector of tokens
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(ch) = source[pos..].chars().next() {
        let rest = &source[pos..];
        let (kind, end) = match ch {
            // Whitespace
            c if is_whitespace(c) => {
                let len = rest.find(|c: char| !is_whitespace(c)).unwrap_or(rest.len());
                (TokenKind::Whitespace, pos + len)
            }

            // Line comment
            '/' if rest.starts_with("//") => {
                let len = rest.find('\n').unwrap_or(rest.len());
                (TokenKind::LineComment(rest[2..len].to_string()), pos + len)
            }

            // Block comment
            '/' if rest.starts_with("/*") => match rest[2..].find("*/") {
                Some(close) => (
                    TokenKind::BlockComment(rest[2..2 + close].to_string()),
                    pos + close + 4,
                ),
                None => (TokenKind::Unterminated, source.len()),
            },

            // String literals
            '"' | '\'' => scan_string(source, pos, ch),

            // Template literals
            '`' => scan_template(source, pos, 0),

            // Numbers, including `.5`
            '0'..='9' => scan_number(source, pos),
            '.' if rest[1..].starts_with(|c: char| c.is_ascii_digit()) => scan_number(source, pos),

            // Identifiers and keywords
            c if is_ident_start(c) => {
                let len = rest
                    .find(|c: char| !is_ident_continue(c))
                    .unwrap_or(rest.len());
                let word = &rest[..len];
                let kind =
                    TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Ident(word.to_string()));
                (kind, pos + len)
            }

            // Operators and punctuation
            _ => {
                let matched = PUNCTUATORS
                    .iter()
                    .find(|(text, _)| rest.starts_with(text))
                    // `a?.5:b` is a conditional, not optional chaining
                    .filter(|(text, _)| {
                        *text != "?."
                            || !rest[2..].starts_with(|c: char| c.is_ascii_digit())
                    });
                match matched {
                    Some((text, kind)) => (kind.clone(), pos + text.len()),
                    None if rest.starts_with("?.") => (TokenKind::Question, pos + 1),
                    None => (TokenKind::Unknown, pos + ch.len_utf8()),
                }
            }
        };

        tokens.push(Token {
            kind,
            span: pos..end,
            text: source[pos..end].to_string(),
            newline_before: false,
        });
        pos = end;
    }

    // Add EOF token
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: source.len()..source.len(),
        text: String::new(),
        newline_before: false,
    });

    tokens
}

/// Scan a quoted string starting at `start`; returns the decoded value.
fn scan_string(source: &str, start: usize, quote: char) -> (TokenKind, usize) {
    let mut value = String::new();
    let mut chars = source[start + 1..].char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let at = start + 1 + offset;
        match c {
            c if c == quote => return (TokenKind::String(value), at + 1),
            '\n' => break,
            '\\' => {
                let Some((_, esc)) = chars.next() else { break };
                match esc {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'b' => value.push('\u{8}'),
                    'f' => value.push('\u{c}'),
                    'v' => value.push('\u{b}'),
                    '0' => value.push('\0'),
                    // line continuation
                    '\n' => {}
                    '\r' => {
                        if matches!(chars.peek(), Some((_, '\n'))) {
                            chars.next();
                        }
                    }
                    'x' => {
                        let hex: String = (0..2).filter_map(|_| chars.next().map(|(_, c)| c)).collect();
                        if let Some(c) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            value.push(c);
                        }
                    }
                    'u' => {
                        let hex: String = if matches!(chars.peek(), Some((_, '{'))) {
                            chars.next();
                            let mut hex = String::new();
                            for (_, c) in chars.by_ref() {
                                if c == '}' {
                                    break;
                                }
                                hex.push(c);
                            }
                            hex
                        } else {
                            (0..4).filter_map(|_| chars.next().map(|(_, c)| c)).collect()
                        };
                        if let Some(c) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            value.push(c);
                        }
                    }
                    other => value.push(other),
                }
            }
            c => value.push(c),
        }
    }

    let end = source[start..]
        .find('\n')
        .map(|n| start + n)
        .unwrap_or(source.len());
    (TokenKind::Unterminated, end.max(start + 1))
}

/// Scan a template literal starting at the opening backtick.
///
/// Substitutions are tracked with a brace depth counter that skips nested
/// strings and templates, so `${ {a: "}"}.a }` is captured whole. Templates
/// nested past [`MAX_NESTING_DEPTH`] are reported unterminated.
fn scan_template(source: &str, start: usize, depth: usize) -> (TokenKind, usize) {
    if depth > MAX_NESTING_DEPTH {
        return (TokenKind::Unterminated, source.len());
    }
    let bytes = source.as_bytes();
    let mut quasis = Vec::new();
    let mut exprs = Vec::new();
    let mut quasi_start = start + 1;
    let mut i = start + 1;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                quasis.push(source[quasi_start..i].to_string());
                return (TokenKind::Template { quasis, exprs }, i + 1);
            }
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                quasis.push(source[quasi_start..i].to_string());
                let expr_start = i + 2;
                let Some(expr_end) = matching_brace(source, expr_start, depth) else {
                    return (TokenKind::Unterminated, source.len());
                };
                exprs.push(TemplateExpr {
                    source: source[expr_start..expr_end].to_string(),
                    offset: expr_start,
                });
                i = expr_end + 1;
                quasi_start = i;
            }
            _ => i += 1,
        }
    }

    (TokenKind::Unterminated, source.len())
}

/// Byte index of the `}` closing a substitution that starts at `from`.
fn matching_brace(source: &str, from: usize, depth: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            q @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'`' => {
                let (kind, end) = scan_template(source, i, depth + 1);
                if kind == TokenKind::Unterminated {
                    return None;
                }
                i = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Scan a numeric literal: decimal with fraction/exponent, `0x`/`0o`/`0b`
/// radix forms, and `_` separators.
fn scan_number(source: &str, start: usize) -> (TokenKind, usize) {
    let rest = &source[start..];
    let lower = rest.get(..2).map(|p| p.to_ascii_lowercase());
    let radix = match lower.as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };

    if let Some(radix) = radix {
        let len = 2 + rest[2..]
            .find(|c: char| !(c.is_digit(radix) || c == '_'))
            .unwrap_or(rest.len() - 2);
        if !separated_digits(&rest[2..len]) {
            return (TokenKind::Unknown, start + len);
        }
        let digits: String = rest[2..len].chars().filter(|c| *c != '_').collect();
        let value = u64::from_str_radix(&digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
        return (TokenKind::Number(value), start + len);
    }

    let bytes = rest.as_bytes();
    let mut i = 0;
    let mut well_formed = true;
    let mut digits = |i: &mut usize| {
        let from = *i;
        while *i < bytes.len() && (bytes[*i].is_ascii_digit() || bytes[*i] == b'_') {
            *i += 1;
        }
        if *i > from && !separated_digits(&rest[from..*i]) {
            well_formed = false;
        }
    };
    digits(&mut i);
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        digits(&mut i);
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = j;
            digits(&mut i);
        }
    }
    // BigInt suffix is accepted and ignored.
    let text_end = i;
    if i < bytes.len() && bytes[i] == b'n' {
        i += 1;
    }
    if !well_formed {
        return (TokenKind::Unknown, start + i);
    }

    let cleaned: String = rest[..text_end].chars().filter(|c| *c != '_').collect();
    let value = cleaned.parse::<f64>().unwrap_or(f64::NAN);
    (TokenKind::Number(value), start + i)
}

/// A non-empty digit run whose `_` separators each sit between two digits.
fn separated_digits(run: &str) -> bool {
    !run.is_empty() && !run.starts_with('_') && !run.ends_with('_') && !run.contains("__")
}

/// Filter out whitespace and comments from a token stream, marking tokens
/// that follow a line break.
pub fn filter_whitespace_and_comments(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut saw_newline = false;
    for mut token in tokens {
        match token.kind {
            TokenKind::Whitespace | TokenKind::LineComment(_) | TokenKind::BlockComment(_) => {
                if token.text.contains('\n') {
                    saw_newline = true;
                }
            }
            _ => {
                token.newline_before = saw_newline;
                saw_newline = false;
                out.push(token);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        filter_whitespace_and_comments(tokenize(source))
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keywords_and_contextual_words() {
        assert_eq!(
            kinds("function* yield async of"),
            vec![
                TokenKind::Function,
                TokenKind::Star,
                TokenKind::Yield,
                TokenKind::Ident("async".into()),
                TokenKind::Ident("of".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn longest_punctuator_wins() {
        assert_eq!(
            kinds("a >>>= b ?? c?.d"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::GtGtGtEq,
                TokenKind::Ident("b".into()),
                TokenKind::DoubleQuestion,
                TokenKind::Ident("c".into()),
                TokenKind::QuestionDot,
                TokenKind::Ident("d".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn optional_chain_before_digit_is_conditional() {
        assert_eq!(kinds("a?.5:1")[1], TokenKind::Question);
    }

    #[test]
    fn numeric_forms() {
        assert_eq!(kinds("0xff")[0], TokenKind::Number(255.0));
        assert_eq!(kinds("0b101")[0], TokenKind::Number(5.0));
        assert_eq!(kinds("0o17")[0], TokenKind::Number(15.0));
        assert_eq!(kinds("1_000")[0], TokenKind::Number(1000.0));
        assert_eq!(kinds("1.5e3")[0], TokenKind::Number(1500.0));
        assert_eq!(kinds(".25")[0], TokenKind::Number(0.25));
    }

    #[test]
    fn malformed_numbers_are_unknown_tokens() {
        for src in ["0x", "0b", "0x_1", "1_", "1__0", "1._5", "1e1_"] {
            let tokens = filter_whitespace_and_comments(tokenize(src));
            assert_eq!(tokens[0].kind, TokenKind::Unknown, "{}", src);
            assert_eq!(tokens[0].text, src);
        }
        assert_eq!(kinds("0x1_f")[0], TokenKind::Number(31.0));
        assert_eq!(kinds("1.")[0], TokenKind::Number(1.0));
    }

    #[test]
    fn byte_order_mark_is_whitespace() {
        let tokens = filter_whitespace_and_comments(tokenize("\u{FEFF}let x"));
        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[0].span, 3..6);
    }

    #[test]
    fn string_escapes_are_decoded() {
        assert_eq!(
            kinds(r#""a\n\"b\" A\x42""#)[0],
            TokenKind::String("a\n\"b\" AB".into())
        );
        assert_eq!(kinds("'it\\'s'")[0], TokenKind::String("it's".into()));
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(kinds("\"abc")[0], TokenKind::Unterminated);
    }

    #[test]
    fn template_with_nested_braces() {
        let tokens = filter_whitespace_and_comments(tokenize("`a${ {x: \"}\"}.x }b${c}`"));
        match &tokens[0].kind {
            TokenKind::Template { quasis, exprs } => {
                assert_eq!(quasis, &vec!["a".to_string(), "b".to_string(), String::new()]);
                assert_eq!(exprs.len(), 2);
                assert_eq!(exprs[0].source, " {x: \"}\"}.x ");
                assert_eq!(exprs[1].source, "c");
                assert_eq!(exprs[1].offset, 20);
            }
            other => panic!("expected template, got {:?}", other),
        }
    }

    #[test]
    fn newline_flag_is_set_after_line_breaks() {
        let tokens = filter_whitespace_and_comments(tokenize("a // c\nb /* x */ c"));
        assert!(!tokens[0].newline_before);
        assert!(tokens[1].newline_before);
        assert!(!tokens[2].newline_before);
    }

    #[test]
    fn spans_cover_source_text() {
        let src = "let x = 'hi';";
        for token in tokenize(src) {
            assert_eq!(&src[token.span.clone()], token.text);
        }
    }

    proptest::proptest! {
        /// Tokens tile the input exactly, whatever it contains.
        #[test]
        fn tokens_tile_arbitrary_input(src in "[ -~\n\t\u{e9}\u{2028}\u{1f600}]{0,64}") {
            let tokens = tokenize(&src);
            let mut pos = 0;
            for token in &tokens {
                proptest::prop_assert_eq!(token.span.start, pos);
                proptest::prop_assert_eq!(&src[token.span.clone()], token.text.as_str());
                pos = token.span.end;
            }
            proptest::prop_assert_eq!(pos, src.len());
            proptest::prop_assert_eq!(&tokens[tokens.len() - 1].kind, &TokenKind::Eof);
        }
    }
}
