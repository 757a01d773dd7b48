use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::InlinerConfig;
use crate::error::{InlineError, Result};
use crate::fs::{NativeFs, SourceFs};
use crate::resolver::{ExpansionContext, ExpansionReport, Resolver};
use crate::strip::strip_blank_math_lines;

/// Outcome of a successful [`Inliner::inline`] run.
#[derive(Debug, Clone)]
pub struct InlineSummary {
    pub output: PathBuf,
    pub report: ExpansionReport,
}

/// Flattens a LaTeX project rooted at a main document.
///
/// The pipeline is: read the main document, expand its directives with a
/// [`Resolver`], drop blank lines inside math with
/// [`strip_blank_math_lines`], and write the result.
#[derive(Debug, Clone)]
pub struct Inliner {
    fs: Arc<dyn SourceFs>,
    config: InlinerConfig,
}

impl Default for Inliner {
    fn default() -> Self {
        Self::new(InlinerConfig::default())
    }
}

impl Inliner {
    /// Creates an inliner working on the real file system.
    pub fn new(config: InlinerConfig) -> Self {
        Self::with_fs(Arc::new(NativeFs), config)
    }

    /// Creates an inliner over a custom [`SourceFs`].
    pub fn with_fs(fs: Arc<dyn SourceFs>, config: InlinerConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &InlinerConfig {
        &self.config
    }

    /// Expands `main` and returns the flattened text without writing it.
    pub fn flatten(&self, main: &Path) -> Result<(String, ExpansionReport)> {
        self.ensure_main(main)?;
        let content = self.fs.read_source(main).map_err(|source| InlineError::Read {
            path: main.to_path_buf(),
            source,
        })?;

        let root_dir = main.parent().unwrap_or_else(|| Path::new(""));
        let mut ctx = ExpansionContext::new(root_dir);
        ctx.mark_visited(self.fs.canonicalize(main));

        let resolver = Resolver::new(self.fs.as_ref(), &self.config);
        let expanded = resolver.resolve(&content, root_dir, &mut ctx);
        let flattened = strip_blank_math_lines(&expanded);
        Ok((flattened, ctx.into_report()))
    }

    /// Flattens `main` into `output`, or next to `main` with the configured
    /// suffix when `output` is `None`.
    pub fn inline(&self, main: &Path, output: Option<&Path>) -> Result<InlineSummary> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.default_output_path(main));
        self.ensure_main(main)?;

        info!("Inlining LaTeX project: {}", main.display());
        info!("Output file: {}", output.display());

        let (flattened, report) = self.flatten(main)?;
        self.fs
            .write(&output, &flattened)
            .map_err(|source| InlineError::Write {
                path: output.clone(),
                source,
            })?;

        info!("Successfully created inlined LaTeX file: {}", output.display());
        info!("Processed {} files", report.files_processed);
        Ok(InlineSummary { output, report })
    }

    fn ensure_main(&self, main: &Path) -> Result<()> {
        if self.fs.exists(main) {
            Ok(())
        } else {
            Err(InlineError::MissingMainDocument {
                path: main.to_path_buf(),
            })
        }
    }
}
