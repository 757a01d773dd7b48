//! Provenance comments around inlined files.
//!
//! Every inlined file is surrounded by `%` comments naming its source. In
//! text mode this is harmless. In math mode two things can go wrong:
//!
//! 1. a blank line ends the math region (`! Missing $ inserted`), and
//! 2. a comment placed on the same line as a delimiter can swallow it.
//!
//! [`wrap`] picks a [`WrapStrategy`] that avoids both. Math-mode strategies
//! only ever put comments on their own lines, never add blank padding, and
//! keep delimiter lines at the edges of the content verbatim.

/// Tokens that may open or close a math region at the edge of inlined content.
pub const BOUNDARY_DELIMITERS: &[&str] = &["$$", "\\[", "\\]", "$", "\\(", "\\)"];

/// Content shorter than this (after trimming) is never split.
const SHORT_CONTENT_LIMIT: usize = 10;

/// How provenance comments are placed around inlined content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapStrategy {
    /// Text mode: `% --- Begin included file ---` banners.
    Banner,
    /// Math mode, very short content: `% Inline:` before and `% End:` after.
    Inline,
    /// Math mode, content starts or ends with a delimiter: comments go after
    /// the first line and before the last line.
    Interior,
    /// Math mode, no boundary delimiters: `% Begin:` before and `% End:` after.
    Adjacent,
}

impl WrapStrategy {
    /// Chooses the placement policy for `content`.
    pub fn choose(content: &str, in_math_mode: bool) -> Self {
        if !in_math_mode {
            return WrapStrategy::Banner;
        }
        let stripped = content.trim();
        if stripped.chars().count() < SHORT_CONTENT_LIMIT {
            WrapStrategy::Inline
        } else if has_boundary_delimiter(stripped) {
            WrapStrategy::Interior
        } else {
            WrapStrategy::Adjacent
        }
    }
}

/// Whether `text` starts or ends with one of the [`BOUNDARY_DELIMITERS`].
pub fn has_boundary_delimiter(text: &str) -> bool {
    BOUNDARY_DELIMITERS
        .iter()
        .any(|d| text.starts_with(d) || text.ends_with(d))
}

/// Surrounds `content` with begin/end comments naming `name`.
///
/// # Examples
///
/// ```
/// use texflat_core::provenance::wrap;
///
/// let wrapped = wrap("x^2", "formula.tex", true);
/// assert_eq!(wrapped, "% Inline: formula.tex\nx^2\n% End: formula.tex\n");
/// ```
pub fn wrap(content: &str, name: &str, in_math_mode: bool) -> String {
    match WrapStrategy::choose(content, in_math_mode) {
        WrapStrategy::Banner => {
            let mut out = format!("% --- Begin included file: {} ---\n", name);
            out.push_str(content);
            if !content.is_empty() && !content.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&format!("% --- End included file: {} ---\n", name));
            out
        }
        WrapStrategy::Inline => format!("% Inline: {name}\n{content}\n% End: {name}\n"),
        WrapStrategy::Adjacent => format!("% Begin: {name}\n{content}\n% End: {name}\n"),
        WrapStrategy::Interior => {
            let lines: Vec<&str> = content.split('\n').collect();
            match lines.as_slice() {
                [first, middle @ .., last] => {
                    let mut out = Vec::with_capacity(lines.len() + 2);
                    let begin = format!("% Begin: {name}");
                    let end = format!("% End: {name}");
                    out.push(*first);
                    out.push(&begin);
                    out.extend_from_slice(middle);
                    out.push(&end);
                    out.push(*last);
                    out.join("\n")
                }
                _ => format!("% Begin: {name}\n{content}\n% End: {name}\n"),
            }
        }
    }
}
