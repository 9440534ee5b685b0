//! Staged tile writes.
//!
//! A tile's artifacts are produced in the staging directory and only renamed
//! into place once all of them exist. Until then the guard owns the scratch
//! files and removes them when dropped, including on error and panic paths.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tile_common::{Result, TilerError};
use tracing::warn;

#[derive(Debug)]
struct StagedFile {
    staged: PathBuf,
    target: PathBuf,
}

/// Scratch files of one tile, committed together or not at all.
#[derive(Debug)]
pub(crate) struct StagedTile {
    key: String,
    files: Vec<StagedFile>,
    committed: bool,
}

impl StagedTile {
    pub(crate) fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            files: Vec::new(),
            committed: false,
        }
    }

    /// Register a scratch file before it is written, so a partial write is
    /// still cleaned up. Returns the scratch path.
    pub(crate) fn stage(&mut self, staged: PathBuf, target: PathBuf) -> PathBuf {
        self.files.push(StagedFile {
            staged: staged.clone(),
            target,
        });
        staged
    }

    /// Move every scratch file to its target.
    ///
    /// If a rename fails, targets already moved are removed again and the
    /// remaining scratch files are dropped with the guard.
    pub(crate) fn commit(mut self) -> Result<()> {
        for (moved, file) in self.files.iter().enumerate() {
            if let Err(e) = fs::rename(&file.staged, &file.target) {
                for done in &self.files[..moved] {
                    remove_quietly(&done.target);
                }
                return Err(TilerError::io(&file.target, e));
            }
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedTile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for file in &self.files {
            remove_quietly(&file.staged);
        }
        if !self.files.is_empty() {
            warn!(key = %self.key, "Discarded staged tile");
        }
    }
}

/// Remove a file, treating an already missing file as success.
pub(crate) fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove file"),
    }
}
