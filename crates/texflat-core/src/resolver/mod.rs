//! Recursive expansion of `\input` and `\include` directives.
//!
//! ## Overview
//!
//! [`Resolver::resolve`] folds over the segments produced by
//! [`scan_directives`]: literal spans are copied through, and each directive
//! is replaced by the (recursively expanded) content of the file it names,
//! wrapped in provenance comments by [`provenance::wrap`](crate::provenance::wrap).
//!
//! All mutable bookkeeping lives in an [`ExpansionContext`] that the caller
//! owns and passes down by `&mut`:
//!
//! - the set of files already inlined (cycle detection),
//! - the current nesting depth (bounded by
//!   [`InlinerConfig::max_depth`](crate::config::InlinerConfig::max_depth)),
//! - the directory of the root document (fallback for path resolution),
//! - an [`ExpansionReport`] of everything that was inlined or went wrong.
//!
//! ## Math mode
//!
//! Whether a directive sits inside math is decided by
//! [`is_in_math_mode`] on the *unexpanded* text of the file containing it, at
//! the directive's start offset. Math-mode inclusions are trimmed before
//! recursion so they cannot add boundary blank lines.
//!
//! ## Failure isolation
//!
//! No directive can fail the whole run. Missing files, cycles, depth overflow
//! and read errors are logged, recorded as [`Incident`]s, and leave a marker
//! (or the directive as written) in the output.

use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::InlinerConfig;
use crate::directives::{Directive, Segment, scan_directives};
use crate::fs::SourceFs;
use crate::math_mode::is_in_math_mode;
use crate::provenance::{self, WrapStrategy};

/// Category of a recovered directive-level problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncidentKind {
    /// No candidate path exists; the directive is kept verbatim.
    Unresolved,
    /// The target was already inlined; a marker comment replaces the directive.
    Circular,
    /// The depth ceiling was reached; the directive is kept verbatim.
    DepthExceeded,
    /// The target exists but could not be read.
    ReadFailure,
}

/// A recovered problem with one directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incident {
    pub kind: IncidentKind,
    /// The directive as written in the source.
    pub directive: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub message: String,
}

/// A file that was successfully inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlinedFile {
    pub path: PathBuf,
    pub in_math_mode: bool,
    /// Nesting level; files included by the root document are at depth 1.
    pub depth: usize,
}

/// Summary of one expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    pub inlined: Vec<InlinedFile>,
    pub incidents: Vec<Incident>,
    /// Number of distinct files visited, the root document included.
    pub files_processed: usize,
}

impl ExpansionReport {
    /// Incidents of the given kind.
    pub fn incidents_of(&self, kind: IncidentKind) -> impl Iterator<Item = &Incident> {
        self.incidents.iter().filter(move |i| i.kind == kind)
    }
}

/// Mutable state threaded through one expansion.
#[derive(Debug, Clone)]
pub struct ExpansionContext {
    root_dir: PathBuf,
    visited: HashSet<PathBuf>,
    depth: usize,
    report: ExpansionReport,
}

impl ExpansionContext {
    /// Starts an expansion whose root document lives in `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            visited: HashSet::new(),
            depth: 0,
            report: ExpansionReport::default(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Records `identity` as visited. Returns `false` if it already was.
    pub fn mark_visited(&mut self, identity: PathBuf) -> bool {
        self.visited.insert(identity)
    }

    pub fn is_visited(&self, identity: &Path) -> bool {
        self.visited.contains(identity)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn report(&self) -> &ExpansionReport {
        &self.report
    }

    /// Finishes the expansion and returns its report.
    pub fn into_report(self) -> ExpansionReport {
        let mut report = self.report;
        report.files_processed = self.visited.len();
        report
    }

    fn record(&mut self, kind: IncidentKind, directive: &Directive<'_>, path: Option<&Path>, message: String) {
        self.report.incidents.push(Incident {
            kind,
            directive: directive.raw.to_string(),
            path: path.map(Path::to_path_buf),
            message,
        });
    }
}

/// Expands transclusion directives against a [`SourceFs`].
#[derive(Debug)]
pub struct Resolver<'a> {
    fs: &'a dyn SourceFs,
    config: &'a InlinerConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(fs: &'a dyn SourceFs, config: &'a InlinerConfig) -> Self {
        Self { fs, config }
    }

    /// Expands every directive in `content`, resolving relative paths
    /// against `base_dir` first.
    ///
    /// Past the configured depth ceiling the content is returned unchanged.
    pub fn resolve(&self, content: &str, base_dir: &Path, ctx: &mut ExpansionContext) -> String {
        let segments = scan_directives(content);

        if ctx.depth > self.config.max_depth {
            for segment in &segments {
                if let Segment::Directive(directive) = segment {
                    warn!(
                        "Maximum inclusion depth ({}) exceeded; leaving {} unexpanded",
                        self.config.max_depth, directive.raw
                    );
                    ctx.record(
                        IncidentKind::DepthExceeded,
                        directive,
                        None,
                        format!("maximum inclusion depth {} exceeded", self.config.max_depth),
                    );
                }
            }
            return content.to_string();
        }

        ctx.depth += 1;
        let mut out = String::with_capacity(content.len());
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Directive(directive) => {
                    let in_math_mode = is_in_math_mode(content, directive.span.start);
                    let at_line_start = out.is_empty() || out.ends_with('\n');
                    let replacement =
                        self.expand(&directive, in_math_mode, at_line_start, base_dir, ctx);
                    out.push_str(&replacement);
                }
            }
        }
        ctx.depth -= 1;
        out
    }

    /// Produces the replacement text for one directive.
    ///
    /// `at_line_start` tells whether the output so far ends a line; a
    /// text-mode banner is moved to a fresh line when it does not.
    fn expand(
        &self,
        directive: &Directive<'_>,
        in_math_mode: bool,
        at_line_start: bool,
        base_dir: &Path,
        ctx: &mut ExpansionContext,
    ) -> String {
        let argument = self.config.with_extension(directive.argument);
        debug!("{} at depth {} (math mode: {})", directive.raw, ctx.depth, in_math_mode);

        let Some(path) = self.locate(&argument, base_dir, ctx.root_dir()) else {
            warn!("Could not find file {}", argument);
            ctx.record(
                IncidentKind::Unresolved,
                directive,
                None,
                format!("could not find file {}", argument),
            );
            return directive.raw.to_string();
        };

        if !ctx.mark_visited(self.fs.canonicalize(&path)) {
            warn!("Circular include detected for {}", path.display());
            ctx.record(
                IncidentKind::Circular,
                directive,
                Some(&path),
                format!("circular include of {}", path.display()),
            );
            return if in_math_mode {
                format!("% Circular include prevented: {}\n", directive.raw)
            } else {
                format!("\n% Circular include prevented: {}\n", directive.raw)
            };
        }

        info!("Inlining: {} (math mode: {})", path.display(), in_math_mode);
        let source = match self.fs.read_source(&path) {
            Ok(source) => source,
            Err(err) => {
                error!("Error processing {}: {}", path.display(), err);
                ctx.record(IncidentKind::ReadFailure, directive, Some(&path), err.to_string());
                let marker = format!("% Error including {}: {}", path.display(), err);
                return if in_math_mode {
                    format!("{}\n{}", marker, directive.raw)
                } else {
                    format!("\n{}\n{}\n", marker, directive.raw)
                };
            }
        };
        ctx.report.inlined.push(InlinedFile {
            path: path.clone(),
            in_math_mode,
            depth: ctx.depth,
        });

        let source = if in_math_mode { source.trim() } else { source.as_str() };
        let child_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let expanded = self.resolve(source, child_dir, ctx);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(argument);
        debug!(
            "Wrapping {} with {:?}",
            name,
            WrapStrategy::choose(&expanded, in_math_mode)
        );
        let wrapped = provenance::wrap(&expanded, &name, in_math_mode);
        if in_math_mode || at_line_start {
            wrapped
        } else {
            format!("\n{wrapped}")
        }
    }

    /// Finds the first existing candidate for `argument`: relative to
    /// `base_dir`, then to the root directory, then its file name alone in
    /// the root directory.
    fn locate(&self, argument: &str, base_dir: &Path, root_dir: &Path) -> Option<PathBuf> {
        let relative = Path::new(argument);
        let mut candidates = vec![base_dir.join(relative), root_dir.join(relative)];
        if let Some(file_name) = relative.file_name() {
            candidates.push(root_dir.join(file_name));
        }
        candidates.into_iter().find(|p| self.fs.exists(p))
    }
}

#[cfg(test)]
mod tests;
