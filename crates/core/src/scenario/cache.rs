//! Content-addressed artifact cache in the simulator working directory
//!
//! Artifacts are named by the SHA-256 of the parameters that produced them, so
//! identical requests reuse earlier files. Creation is atomic: content is
//! written to a temporary file in the same directory and renamed into place,
//! so a concurrent reader sees either no file or a complete one. Two writers
//! racing on the same key both produce identical content and the last rename
//! wins.

use crate::error::{Result, RiskError};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Hex SHA-256 of a set of key parts
///
/// Parts are length-prefixed so `["ab", "c"]` and `["a", "bc"]` differ.
#[must_use]
pub fn content_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        let bytes = part.as_ref();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hex::encode(hasher.finalize())
}

/// Working directory holding hash-named artifacts
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    /// Open (and create if needed) a cache directory
    ///
    /// # Errors
    /// Returns `Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| RiskError::io(&dir, e))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact with this key and extension lives at
    #[must_use]
    pub fn path_for(&self, key: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{key}.{extension}"))
    }

    /// Return the artifact for `key`, writing `contents()` first if it does not exist
    ///
    /// # Errors
    /// Returns `Io` if the temporary file cannot be written or renamed.
    pub fn get_or_write<F>(&self, key: &str, extension: &str, contents: F) -> Result<PathBuf>
    where
        F: FnOnce() -> String,
    {
        let target = self.path_for(key, extension);
        if target.exists() {
            debug!(path = %target.display(), "reusing cached artifact");
            return Ok(target);
        }
        self.write_atomic(&target, contents().as_bytes())?;
        Ok(target)
    }

    /// Move a finished file into the cache under `key`
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be copied or renamed.
    pub fn adopt(&self, source: &Path, key: &str, extension: &str) -> Result<PathBuf> {
        let target = self.path_for(key, extension);
        let bytes = fs::read(source).map_err(|e| RiskError::io(source, e))?;
        self.write_atomic(&target, &bytes)?;
        Ok(target)
    }

    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| RiskError::io(&self.dir, e))?;
        tmp.write_all(bytes).map_err(|e| RiskError::io(tmp.path(), e))?;
        tmp.persist(target).map_err(|e| RiskError::io(target, e.error))?;
        debug!(path = %target.display(), "wrote artifact");
        Ok(())
    }
}
