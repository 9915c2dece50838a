//! Verbatim mirroring of the public files directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Public file copy errors.
#[derive(Debug, Error)]
pub enum PublicError {
    /// IO error on a specific path.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Path escaped the public root.
    #[error("invalid public path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for public file copying.
pub type Result<T> = std::result::Result<T, PublicError>;

/// Mirror the contents of `source_dir` into `dest_dir`.
///
/// Returns the number of files copied. A missing source directory copies nothing.
pub fn copy_public_files(source_dir: &Path, dest_dir: &Path) -> Result<usize> {
    if !source_dir.exists() {
        debug!(dir = %source_dir.display(), "public directory does not exist, skipping");
        return Ok(0);
    }

    info!(
        source = %source_dir.display(),
        dest = %dest_dir.display(),
        "copying public files"
    );

    let mut count = 0;
    for entry in WalkDir::new(source_dir).min_depth(1).follow_links(true) {
        let entry = entry?;
        let path = entry.path();
        let relative = path
            .strip_prefix(source_dir)
            .map_err(|_| PublicError::InvalidPath(path.to_path_buf()))?;
        let dest_path = dest_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path).map_err(|source| PublicError::Io {
                path: dest_path.clone(),
                source,
            })?;
        } else {
            fs::copy(path, &dest_path).map_err(|source| PublicError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(file = %relative.display(), "copied public file");
            count += 1;
        }
    }

    info!(count, "public files copied");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_public_dir_is_noop() {
        let dest = TempDir::new().unwrap();
        let count = copy_public_files(&dest.path().join("public"), dest.path()).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_mirrors_tree_verbatim() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::create_dir_all(source.path().join("fonts/inter")).unwrap();
        fs::create_dir_all(source.path().join("empty")).unwrap();
        fs::write(source.path().join("robots.txt"), "robot").unwrap();
        fs::write(source.path().join("fonts/inter/inter.woff2"), [0u8, 159, 146, 150]).unwrap();

        let count = copy_public_files(source.path(), dest.path()).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(dest.path().join("robots.txt")).unwrap(),
            "robot"
        );
        assert_eq!(
            fs::read(dest.path().join("fonts/inter/inter.woff2")).unwrap(),
            vec![0u8, 159, 146, 150]
        );
        assert!(dest.path().join("empty").is_dir());
    }

    #[test]
    fn test_root_dir_not_copied_as_entry() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("public");
        let dest = root.path().join("output");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(source.join("favicon.ico"), "ico").unwrap();

        copy_public_files(&source, &dest).unwrap();

        assert!(dest.join("favicon.ico").exists());
        assert!(!dest.join("public").exists());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(source.path().join("index.txt"), "new").unwrap();
        fs::write(dest.path().join("index.txt"), "old and longer").unwrap();

        copy_public_files(source.path(), dest.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dest.path().join("index.txt")).unwrap(),
            "new"
        );
    }
}
