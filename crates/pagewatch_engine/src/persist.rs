//! Crash-safe replacement of small state files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot use {} as a state directory: {reason}", dir.display())]
    StateDir { dir: PathBuf, reason: String },
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Create `dir` and its missing parents. An existing non-directory is an error.
pub fn ensure_state_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |reason: String| PersistError::StateDir {
        dir: dir.to_path_buf(),
        reason,
    };
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(unusable("not a directory".to_string())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| unusable(err.to_string()))
        }
        Err(err) => Err(unusable(err.to_string())),
    }
}

/// Replace the contents of `path`, creating its directory first.
///
/// The value is synced to a temp file beside `path` and renamed over it; a crash
/// leaves either the old content or the new one.
pub fn replace_file(path: &Path, content: &str) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_state_dir(dir)?;

    let failed = |source: io::Error| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(failed)?;
    tmp.write_all(content.as_bytes()).map_err(failed)?;
    tmp.as_file_mut().sync_all().map_err(failed)?;
    tmp.persist(path).map_err(|err| failed(err.error))?;
    Ok(())
}
