//! Tokenizer for `\input` and `\include` directives.
//!
//! [`scan_directives`] splits a document into literal spans and directive
//! occurrences. The segments are non-overlapping, in source order, and their
//! concatenation is the input text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(input|include)\s*(\[.*?\])?\s*\{([^}]+)\}").expect("directive pattern is valid")
});

/// Which transclusion command was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Input,
    Include,
}

/// One `\input{..}` or `\include[..]{..}` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    pub kind: DirectiveKind,
    /// Byte range of the whole directive in the scanned text.
    pub span: Range<usize>,
    /// The bracketed options of `\include[..]`, brackets included.
    pub options: Option<&'a str>,
    /// The braced argument with surrounding whitespace removed.
    pub argument: &'a str,
    /// The directive exactly as written.
    pub raw: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Directive(Directive<'a>),
}

/// Splits `text` into literal and directive segments.
pub fn scan_directives(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in DIRECTIVE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (Some(command), Some(argument)) = (caps.get(1), caps.get(3)) else {
            continue;
        };

        if whole.start() > cursor {
            segments.push(Segment::Literal(&text[cursor..whole.start()]));
        }
        let kind = if command.as_str() == "input" {
            DirectiveKind::Input
        } else {
            DirectiveKind::Include
        };
        segments.push(Segment::Directive(Directive {
            kind,
            span: whole.range(),
            options: caps.get(2).map(|m| m.as_str()),
            argument: argument.as_str().trim(),
            raw: whole.as_str(),
        }));
        cursor = whole.end();
    }

    if cursor < text.len() {
        segments.push(Segment::Literal(&text[cursor..]));
    }
    segments
}
