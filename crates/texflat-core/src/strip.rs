//! Removal of blank lines inside math regions.
//!
//! Inlining can leave blank lines inside `\[ .. \]`, `$$ .. $$` or an
//! `align` body, where TeX treats them as a paragraph break and fails. This
//! pass drops every whitespace-only line while a math region is open and
//! keeps all other lines untouched.

use crate::math_mode::MathScanner;

/// Drops whitespace-only lines that lie inside a math region.
///
/// Math state is tracked line by line with the same [`MathScanner`] the
/// resolver uses. A final line terminator is preserved.
///
/// ```
/// use texflat_core::strip::strip_blank_math_lines;
///
/// let doc = "\\begin{align}\nA\n\n\nB\n\\end{align}\n\nafter";
/// assert_eq!(
///     strip_blank_math_lines(doc),
///     "\\begin{align}\nA\nB\n\\end{align}\n\nafter"
/// );
/// ```
pub fn strip_blank_math_lines(document: &str) -> String {
    let (body, terminated) = match document.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (document, false),
    };

    let mut scanner = MathScanner::new();
    let mut kept: Vec<&str> = Vec::new();
    let mut removed = 0usize;
    for line in body.split('\n') {
        let in_math = scanner.consume_line(line);
        if in_math && line.trim().is_empty() {
            removed += 1;
            continue;
        }
        kept.push(line);
    }
    if removed > 0 {
        log::debug!("Removed {} blank line(s) inside math", removed);
    }

    let mut out = kept.join("\n");
    if terminated {
        out.push('\n');
    }
    out
}
