//! Diagnostic reporting
//!
//! rustc-style messages on stderr: a colored header, the `file:line:col`
//! location, and the offending source line with a caret marker under the
//! span.
//!
//! ```text
//! error[unsupported structure]: unsupported generator structure: ...
//!   --> src/flow.ts:3:5
//!    |
//!  3 |   g(yield 1);
//!    |     ^^^^^^^
//! ```

use colored::Colorize;
use std::path::Path;
use stepwise::LowerError;
use stepwise_parser::source_line;

/// Render a lowering error against its source.
pub fn render_lower_error(file: &Path, source: &str, err: &LowerError) -> String {
    let at = source_line(source, &err.span());
    let mut out = format!(
        "{}: {}\n",
        format!("error[{}]", err.kind()).red().bold(),
        err.to_string().bold()
    );
    out.push_str(&format!(
        "{} {}:{}:{}\n",
        "  -->".blue().bold(),
        file.display(),
        at.line,
        at.col
    ));

    let Some(text) = at.text else {
        return out;
    };
    let gutter = " ".repeat(at.line.to_string().len());
    let bar = "|".blue().bold();
    out.push_str(&format!(" {} {}\n", gutter, bar));
    out.push_str(&format!(" {} {} {}\n", at.line.to_string().blue().bold(), bar, text));
    out.push_str(&format!(
        " {} {} {}{}\n",
        gutter,
        bar,
        " ".repeat(at.col - 1),
        "^".repeat(at.width).red().bold()
    ));
    out
}

pub fn report_lower_error(file: &Path, source: &str, err: &LowerError) {
    eprint!("{}", render_lower_error(file, source, err));
}

/// Plain `error: message` line for failures without a source span.
pub fn report_error(message: &str) {
    eprintln!("{}: {}", "error".red().bold(), message);
}

pub fn report_warning(message: &str) {
    eprintln!("{}: {}", "warning".yellow().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise::LowerOptions;

    fn render(source: &str) -> String {
        colored::control::set_override(false);
        let err = stepwise::lower_source(source, &LowerOptions::default()).unwrap_err();
        render_lower_error(Path::new("flow.ts"), source, &err)
    }

    #[test]
    fn points_at_the_offending_span() {
        let source = "function* f() {\n  g(yield 1);\n}\n";
        assert_eq!(
            render(source),
            "error[unsupported structure]: unsupported generator structure: `yield` must be a statement of its own at the top level of the generator body\n  --> flow.ts:2:5\n   |\n 2 |   g(yield 1);\n   |     ^^^^^^^\n"
        );
    }

    #[test]
    fn caret_is_clamped_to_the_line() {
        let source = "function* f(): Generator<number> {\n  if (c) {\n    return 1;\n  }\n}\n";
        let out = render(source);
        assert!(out.contains("  --> flow.ts:3:5\n"), "{}", out);
        assert!(out.ends_with(" 3 |     return 1;\n   |     ^^^^^^^^^\n"), "{}", out);
    }

    #[test]
    fn carets_follow_characters_not_bytes() {
        let source = "function* f() {\n  g(\"\u{e9}\", yield 1);\n}\n";
        let out = render(source);
        assert!(out.contains("  --> flow.ts:2:10\n"), "{}", out);
        assert!(out.ends_with("   |          ^^^^^^^\n"), "{}", out);
    }

    #[test]
    fn parse_errors_render_too() {
        let out = render("function* (");
        assert!(out.starts_with("error[parse error]: "), "{}", out);
        assert!(out.contains("  --> flow.ts:1:"), "{}", out);
    }
}
