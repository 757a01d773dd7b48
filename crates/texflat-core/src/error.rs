use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a flattening run.
///
/// Problems with individual `\input`/`\include` directives never surface
/// here; they are recovered in place and recorded as
/// [`Incident`](crate::resolver::Incident)s.
#[derive(Debug, Error)]
pub enum InlineError {
    #[error("main file {} not found", path.display())]
    MissingMainDocument { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, InlineError>;
