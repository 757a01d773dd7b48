//! Math-region tracking for LaTeX source text.
//!
//! ## Overview
//!
//! LaTeX has several overlapping ways of entering math mode:
//!
//! - `$ ... $` (inline, the same token opens and closes)
//! - `$$ ... $$` (display, lexically overlaps with `$`)
//! - `\( ... \)` and `\[ ... \]`
//! - `\begin{NAME} ... \end{NAME}` for every NAME in [`MATH_ENVIRONMENTS`]
//!
//! [`MathScanner`] is a single left-to-right state machine over these
//! delimiters. It answers two kinds of questions with the same transition
//! rules:
//!
//! - "is this byte offset inside math?" via [`is_in_math_mode`], which scans
//!   the text from the start up to the offset, and
//! - "is math still open after this line?" via [`MathScanner::consume_line`],
//!   which keeps its state between calls.
//!
//! Both queries run the same code, so the blank-line pass and the inclusion
//! pass can never disagree about where math regions are.
//!
//! ## Tolerance
//!
//! The scanner is best-effort. Unbalanced closers (`\]` outside display math,
//! `\end{matrix}` with an empty stack) are ignored and a close whose name does
//! not match the top of the stack still pops it.
//!
//! ## Examples
//!
//! ```
//! use texflat_core::math_mode::{is_in_math_mode, MathScanner};
//!
//! let text = r"Let $x = 1$ and \[ y \] hold.";
//! assert!(is_in_math_mode(text, 6));
//! assert!(!is_in_math_mode(text, 12));
//! assert!(is_in_math_mode(text, 19));
//!
//! let mut scanner = MathScanner::new();
//! assert!(scanner.consume_line(r"\begin{align}"));
//! assert!(scanner.consume_line("a &= b"));
//! assert!(!scanner.consume_line(r"\end{align}"));
//! ```

/// Environments that put their body in math mode.
///
/// The set is closed: environments defined by other packages are treated as
/// text.
pub const MATH_ENVIRONMENTS: &[&str] = &[
    "equation",
    "equation*",
    "align",
    "align*",
    "gather",
    "gather*",
    "multline",
    "multline*",
    "flalign",
    "flalign*",
    "eqnarray",
    "eqnarray*",
    "split",
    "aligned",
    "gathered",
    "cases",
    "matrix",
    "pmatrix",
    "bmatrix",
    "Bmatrix",
    "vmatrix",
    "Vmatrix",
    "smallmatrix",
    "subequations",
    "math",
    "displaymath",
    "array",
];

/// Returns `true` if `name` is one of the [`MATH_ENVIRONMENTS`].
pub fn is_math_environment(name: &str) -> bool {
    MATH_ENVIRONMENTS.contains(&name)
}

/// The working state of a [`MathScanner`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MathRegionState {
    /// Raw inline flag: toggled by `$`, set by `\(`, `\[`, `$$` and math
    /// environments.
    in_math: bool,
    /// Inside `\[ ... \]`.
    in_display_math: bool,
    /// Inside `$$ ... $$`.
    in_double_dollar: bool,
    /// Open math environments, innermost last.
    env_stack: Vec<String>,
}

impl MathRegionState {
    /// Whether any math indicator is active.
    pub fn is_active(&self) -> bool {
        self.in_math || self.in_display_math || self.in_double_dollar || !self.env_stack.is_empty()
    }

    pub fn in_display_math(&self) -> bool {
        self.in_display_math
    }

    pub fn in_double_dollar(&self) -> bool {
        self.in_double_dollar
    }

    /// Names of the math environments currently open, outermost first.
    pub fn env_stack(&self) -> &[String] {
        &self.env_stack
    }

    /// Clears the inline flag unless an enclosing region keeps math open.
    fn leave_region(&mut self) {
        if self.env_stack.is_empty() && !self.in_display_math && !self.in_double_dollar {
            self.in_math = false;
        }
    }
}

/// Incremental scanner over LaTeX math delimiters.
///
/// Feed it text with [`feed`](Self::feed) or line by line with
/// [`consume_line`](Self::consume_line). Chunk boundaries must not split a
/// delimiter token; line breaks never do, because no token (environment names
/// included) spans a line break.
#[derive(Debug, Clone, Default)]
pub struct MathScanner {
    state: MathRegionState,
}

impl MathScanner {
    /// Creates a scanner positioned outside of any math region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn state(&self) -> &MathRegionState {
        &self.state
    }

    /// Whether the scanner is currently inside any math region.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Advances the scanner over `text`.
    pub fn feed(&mut self, text: &str) {
        self.feed_bytes(text.as_bytes());
    }

    /// Advances the scanner over one line (without its terminator) and
    /// reports whether math is active at the end of it.
    pub fn consume_line(&mut self, line: &str) -> bool {
        self.feed(line);
        self.is_active()
    }

    fn feed_bytes(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            i += match bytes[i] {
                b'\\' => self.backslash(&bytes[i..]),
                b'$' => self.dollar(&bytes[i..]),
                _ => 1,
            };
        }
    }

    /// Handles a token starting with `\`; returns the number of bytes consumed.
    fn backslash(&mut self, rest: &[u8]) -> usize {
        let state = &mut self.state;
        match rest.get(1) {
            None => 1,
            Some(b'[') => {
                state.in_display_math = true;
                state.in_math = true;
                2
            }
            Some(b']') => {
                if state.in_display_math {
                    state.in_display_math = false;
                    state.leave_region();
                }
                2
            }
            Some(b'(') => {
                state.in_math = true;
                2
            }
            Some(b')') => {
                if state.in_math && !state.in_display_math && !state.in_double_dollar {
                    state.in_math = false;
                }
                2
            }
            Some(_) => {
                if let Some((name, len)) = environment_token(rest, b"\\begin{") {
                    if is_math_environment(name) {
                        state.env_stack.push(name.to_string());
                        state.in_math = true;
                    }
                    return len;
                }
                if let Some((name, len)) = environment_token(rest, b"\\end{") {
                    if !state.env_stack.is_empty() && is_math_environment(name) {
                        state.env_stack.pop();
                        state.leave_region();
                    }
                    return len;
                }
                // Generic escape: `\$`, `\\`, `\%`, ... never act as delimiters.
                2
            }
        }
    }

    /// Handles `$` or `$$`; returns the number of bytes consumed.
    fn dollar(&mut self, rest: &[u8]) -> usize {
        let state = &mut self.state;
        if rest.get(1) == Some(&b'$') {
            if state.in_double_dollar {
                state.in_double_dollar = false;
                state.leave_region();
            } else {
                state.in_double_dollar = true;
                state.in_math = true;
            }
            2
        } else {
            state.in_math = !state.in_math;
            1
        }
    }
}

/// Matches `prefix NAME }` at the start of `rest`, returning the name and
/// the full token length. NAME is non-empty and contains no `}` or line break.
fn environment_token<'a>(rest: &'a [u8], prefix: &[u8]) -> Option<(&'a str, usize)> {
    let after = rest.strip_prefix(prefix)?;
    let close = after.iter().position(|&b| b == b'}' || b == b'\n')?;
    if close == 0 || after[close] != b'}' {
        return None;
    }
    let name = std::str::from_utf8(&after[..close]).ok()?;
    Some((name, prefix.len() + close + 1))
}

/// Reports whether byte `offset` of `text` lies inside a math region.
///
/// Scans `text[..offset]` from scratch; the function has no hidden state, so
/// querying several offsets of the same text agrees with a single pass.
/// Offsets past the end are clamped.
pub fn is_in_math_mode(text: &str, offset: usize) -> bool {
    let end = offset.min(text.len());
    let mut scanner = MathScanner::new();
    scanner.feed_bytes(&text.as_bytes()[..end]);
    scanner.is_active()
}
