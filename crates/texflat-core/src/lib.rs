//! # texflat Core
//!
//! Flattens a multi-file LaTeX project into a single self-contained document.
//!
//! ## Overview
//!
//! Starting from a main document, every `\input{..}` and `\include[..]{..}`
//! directive is replaced by the content of the file it names, recursively.
//! Inlining into math is the delicate part: TeX rejects a blank line inside
//! `$..$`, `\[..\]`, `$$..$$` or an `align` body, and a `%` comment placed
//! on a delimiter's line silently removes the delimiter. This crate keeps
//! both from happening.
//!
//! ## Modules
//!
//! - [`math_mode`] - Incremental scanner that tracks math regions
//! - [`directives`] - Tokenizer for transclusion directives
//! - [`provenance`] - Delimiter-safe begin/end comments around inlined files
//! - [`resolver`] - Recursive expansion with cycle detection and a depth ceiling
//! - [`strip`] - Removal of blank lines inside math regions
//! - [`fs`] - File-system abstraction ([`NativeFs`](fs::NativeFs), [`MemoryFs`](fs::MemoryFs))
//! - [`config`] - Run settings
//! - [`inliner`] - The end-to-end pipeline
//!
//! ## Pipeline
//!
//! ```text
//! main.tex ──read──► Resolver ──► strip_blank_math_lines ──write──► main.inline.tex
//!                       │  ▲
//!                       ▼  │ recursion (ExpansionContext: visited, depth)
//!                   included files
//! ```
//!
//! ## Examples
//!
//! ```
//! use std::path::Path;
//! use std::sync::Arc;
//! use texflat_core::config::InlinerConfig;
//! use texflat_core::fs::MemoryFs;
//! use texflat_core::inliner::Inliner;
//!
//! let fs = Arc::new(
//!     MemoryFs::new()
//!         .with_file("paper/main.tex", "$\\input{formula}$\n")
//!         .with_file("paper/formula.tex", "x^2\n"),
//! );
//! let inliner = Inliner::with_fs(fs, InlinerConfig::default());
//! let (flat, report) = inliner.flatten(Path::new("paper/main.tex")).unwrap();
//!
//! assert_eq!(flat, "$% Inline: formula.tex\nx^2\n% End: formula.tex\n$\n");
//! assert_eq!(report.files_processed, 2);
//! ```

pub mod config;
pub mod directives;
pub mod error;
pub mod fs;
pub mod inliner;
pub mod math_mode;
pub mod provenance;
pub mod resolver;
pub mod strip;

pub use config::InlinerConfig;
pub use error::{InlineError, Result};
pub use inliner::{InlineSummary, Inliner};
pub use math_mode::{MathScanner, is_in_math_mode};
pub use resolver::{ExpansionContext, ExpansionReport, Resolver};
