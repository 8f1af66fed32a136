//! The scratch directory holding tone-adjusted copies until the PDF is built.
//!
//! [`ScratchDir`] owns the directory for the length of one run. It is removed
//! by [`ScratchDir::close`], which reports failures, or by `Drop` on any early
//! return or panic, which can only log them. Unlike a `tempfile::TempDir` the
//! location is fixed (`<input>/.images_to_pdf_temp` by default) so a leftover
//! from a crashed run is found and offered for removal on the next one.

use crate::error::ImagesToPdfError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An owned, initially empty scratch directory.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    armed: bool,
}

impl ScratchDir {
    /// Create a new, empty directory at `path`.
    ///
    /// Fails if anything already exists there; use [`remove_existing`] first.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, ImagesToPdfError> {
        let path = path.into();
        fs::create_dir(&path).map_err(|source| ImagesToPdfError::ScratchDirFailed {
            path: path.clone(),
            source,
        })?;
        debug!("Created scratch directory {}", path.display());
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory and everything in it.
    pub fn close(mut self) -> Result<(), ImagesToPdfError> {
        self.armed = false;
        remove_tree(&self.path).map_err(|source| ImagesToPdfError::ScratchDirFailed {
            path: self.path.clone(),
            source,
        })?;
        debug!("Removed scratch directory {}", self.path.display());
        Ok(())
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match remove_tree(&self.path) {
            Ok(()) => debug!("Removed scratch directory {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove scratch directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Remove whatever is at `path`: a file, a symlink, or a whole directory tree.
pub fn remove_existing(path: &Path) -> Result<(), ImagesToPdfError> {
    let meta = fs::symlink_metadata(path).map_err(|source| ImagesToPdfError::ScratchDirFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|source| ImagesToPdfError::ScratchDirFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_removes_contents() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(root.path().join(".scratch")).unwrap();
        let path = scratch.path().to_path_buf();
        fs::write(path.join("a__temp.jpg"), b"x").unwrap();
        fs::create_dir(path.join("nested")).unwrap();

        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join(".scratch");
        {
            let scratch = ScratchDir::create(&path).unwrap();
            fs::write(scratch.path().join("x.jpg"), b"x").unwrap();
        }
        assert!(!path.exists());
    }

    #[test]
    fn create_refuses_existing_path() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join(".scratch");
        fs::write(&path, b"not a dir").unwrap();
        assert!(matches!(
            ScratchDir::create(&path),
            Err(ImagesToPdfError::ScratchDirFailed { .. })
        ));
        // the pre-existing file is not ours to delete
        assert!(path.is_file());
    }

    #[test]
    fn remove_existing_handles_files_and_trees() {
        let root = tempfile::tempdir().unwrap();

        let file = root.path().join("f");
        fs::write(&file, b"x").unwrap();
        remove_existing(&file).unwrap();
        assert!(!file.exists());

        let tree = root.path().join("t");
        fs::create_dir_all(tree.join("a/b")).unwrap();
        fs::write(tree.join("a/b/c.jpg"), b"x").unwrap();
        remove_existing(&tree).unwrap();
        assert!(!tree.exists());
    }

    #[test]
    fn close_tolerates_already_removed() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(root.path().join(".scratch")).unwrap();
        fs::remove_dir(scratch.path()).unwrap();
        assert!(scratch.close().is_ok());
    }
}
