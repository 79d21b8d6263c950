use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::encode::sink::Container;
use crate::foundation::error::{ReelError, ReelResult};

const MAX_STEM_CHARS: usize = 120;
const FALLBACK_STEM: &str = "presentation";

/// Turn a presentation title into a safe file stem.
///
/// Every character outside ASCII `[A-Za-z0-9]` becomes `_`. Titles that differ only in
/// punctuation map to the same stem.
pub fn sanitize_file_name(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .take(MAX_STEM_CHARS)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

/// A packaged recording ready to be saved.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    /// `<sanitized title>.<extension>`.
    pub file_name: String,
    /// Container of `bytes`.
    pub container: Container,
    /// Complete file contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("file_name", &self.file_name)
            .field("container", &self.container)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Concatenate recorded fragments, in order, into one artifact.
pub fn package(title: &str, container: Container, chunks: &[Vec<u8>]) -> ReelResult<Artifact> {
    if chunks.is_empty() {
        return Err(ReelError::recording("recording produced no data"));
    }
    let bytes = chunks.concat();
    if bytes.is_empty() {
        return Err(ReelError::recording("recording produced only empty fragments"));
    }
    Ok(Artifact {
        file_name: format!("{}.{}", sanitize_file_name(title), container.extension()),
        container,
        bytes,
    })
}

/// Destination that saves a finished artifact.
pub trait Download {
    /// Save `artifact` and return where it went.
    fn save(&mut self, artifact: &Artifact) -> ReelResult<PathBuf>;
}

/// Saves artifacts into a directory.
///
/// The file appears atomically: bytes go to a temporary file in the same directory, which is then
/// renamed into place.
#[derive(Clone, Debug)]
pub struct DirectoryDownload {
    dir: PathBuf,
}

impl DirectoryDownload {
    /// Save into `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Download for DirectoryDownload {
    #[tracing::instrument(skip_all, fields(file = %artifact.file_name))]
    fn save(&mut self, artifact: &Artifact) -> ReelResult<PathBuf> {
        use anyhow::Context as _;

        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;

        let target = self.dir.join(&artifact.file_name);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).with_context(|| {
            format!("failed to create temporary file in '{}'", self.dir.display())
        })?;
        tmp.write_all(&artifact.bytes)
            .and_then(|_| tmp.flush())
            .with_context(|| format!("failed to write '{}'", artifact.file_name))?;
        tmp.persist(&target)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to save '{}'", target.display()))?;

        tracing::info!(path = %target.display(), bytes = artifact.bytes.len(), "video saved");
        Ok(target)
    }
}

/// Keeps saved artifacts in memory.
#[derive(Debug, Default)]
pub struct InMemoryDownload {
    saved: Vec<Artifact>,
}

impl InMemoryDownload {
    /// Create an empty download target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifacts saved so far.
    pub fn saved(&self) -> &[Artifact] {
        &self.saved
    }
}

impl Download for InMemoryDownload {
    fn save(&mut self, artifact: &Artifact) -> ReelResult<PathBuf> {
        self.saved.push(artifact.clone());
        Ok(PathBuf::from(&artifact.file_name))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/package.rs"]
mod tests;
