//! File-system access used while flattening.
//!
//! The resolver never touches `std::fs` directly. It goes through
//! [`SourceFs`], so tests and fuzz targets can run against [`MemoryFs`]
//! while the CLI uses [`NativeFs`].

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// File operations needed to flatten a project.
pub trait SourceFs: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the raw bytes of `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes `content` to `path`, replacing any previous content.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Returns a stable identity for `path`, used for cycle detection.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        normalize(path)
    }

    /// Reads `path` and decodes it with [`decode_source`].
    fn read_source(&self, path: &Path) -> io::Result<String> {
        self.read(path).map(decode_source)
    }
}

/// Decodes file content as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to the code point of the same value, so the
/// fallback cannot fail.
pub fn decode_source(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let bytes = err.into_bytes();
            log::debug!("Source is not valid UTF-8; decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Lexically removes `.` components and folds `..` where possible.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// [`SourceFs`] backed by the real file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFs;

impl SourceFs for NativeFs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
    }
}

/// In-memory [`SourceFs`] keyed by normalized path.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file and returns `self` for chaining.
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        // Sole owner: a poisoned lock still holds a usable map.
        let files = self.files.get_mut().unwrap_or_else(PoisonError::into_inner);
        files.insert(normalize(path.as_ref()), content.into());
        self
    }

    /// Adds (or replaces) a file through a shared reference.
    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> io::Result<()> {
        let mut files = self
            .files
            .write()
            .map_err(|_| io::Error::other("memory file system lock poisoned"))?;
        files.insert(normalize(path.as_ref()), content.into());
        Ok(())
    }

    /// Returns the content of `path` as UTF-8 text, if present.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        let files = self.files.read().ok()?;
        let bytes = files.get(&normalize(path.as_ref()))?;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}

impl SourceFs for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|files| files.contains_key(&normalize(path)))
            .unwrap_or(false)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let files = self
            .files
            .read()
            .map_err(|_| io::Error::other("memory file system lock poisoned"))?;
        files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut files = self
            .files
            .write()
            .map_err(|_| io::Error::other("memory file system lock poisoned"))?;
        files.insert(normalize(path), content.as_bytes().to_vec());
        Ok(())
    }
}
