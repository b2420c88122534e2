// Module: Staged output files.
//
// Each output is written to a temporary file beside its destination and only
// renamed into place on commit. Dropping an uncommitted set deletes the
// temporaries, so a failed run leaves no partial artifacts behind. Files
// being replaced are moved aside first and put back if the commit fails.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};

use crate::CompileError;

#[derive(Debug, Default)]
pub struct OutputSet {
    staged: Vec<(PathBuf, NamedTempFile)>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `contents` for `path` without touching `path` yet.
    pub fn stage(&mut self, path: &Path, contents: &str) -> Result<(), CompileError> {
        let mut file = tempfile::Builder::new()
            .prefix(".gramdfa-")
            .tempfile_in(parent_dir(path))
            .map_err(|e| CompileError::io(path, e))?;
        file.write_all(contents.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| CompileError::io(path, e))?;
        self.staged.push((path.to_path_buf(), file));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Move every staged file into place, in staging order.
    ///
    /// If a rename fails, the files already moved by this call are removed,
    /// the files they replaced are restored and the remaining temporaries
    /// are discarded.
    pub fn commit(self) -> Result<Vec<PathBuf>, CompileError> {
        let mut committed: Vec<(PathBuf, Option<TempPath>)> =
            Vec::with_capacity(self.staged.len());
        for (path, file) in self.staged {
            let result = set_aside(&path).and_then(|backup| {
                committed.push((path.clone(), backup));
                file.persist(&path).map_err(|e| e.error)
            });
            if let Err(e) = result {
                roll_back(committed);
                return Err(CompileError::io(path, e));
            }
        }
        // Dropping the backups deletes the replaced files.
        Ok(committed.into_iter().map(|(path, _)| path).collect())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Move an existing regular file at `path` to a temporary name beside it.
fn set_aside(path: &Path) -> std::io::Result<Option<TempPath>> {
    if !path.is_file() {
        return Ok(None);
    }
    let backup = tempfile::Builder::new()
        .prefix(".gramdfa-old-")
        .tempfile_in(parent_dir(path))?
        .into_temp_path();
    std::fs::rename(path, &backup)?;
    Ok(Some(backup))
}

fn roll_back(committed: Vec<(PathBuf, Option<TempPath>)>) {
    for (path, backup) in committed.into_iter().rev() {
        match backup {
            Some(backup) => {
                if let Err(e) = std::fs::rename(&backup, &path) {
                    tracing::warn!("could not restore {}: {e}", path.display());
                }
            }
            None => {
                let _ = std::fs::remove_file(&path);
            }
        }
    }
}
