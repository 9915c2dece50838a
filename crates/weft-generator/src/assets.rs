//! Asset fingerprinting.
//!
//! Copies every file of the assets directory into the output tree under a
//! content-addressed name (`name.<digest>.ext`) and records the mapping so
//! renderers can refer to assets by their original name.

use std::{
    collections::BTreeMap,
    ffi::{OsStr, OsString},
    fs,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Number of hex characters of the digest embedded in file names.
pub const DIGEST_LEN: usize = 7;

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
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

    /// Invalid asset path.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> AssetError + '_ {
    move |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Mapping from logical asset name to fingerprinted relative path.
///
/// Both sides are relative to the assets root and use forward slashes,
/// e.g. `css/site.css` → `css/site.3f2a9c1.css`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    assets: BTreeMap<String, String>,
}

impl AssetManifest {
    /// Create a new empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset to the manifest.
    pub fn add(&mut self, original: impl Into<String>, fingerprinted: impl Into<String>) {
        self.assets.insert(original.into(), fingerprinted.into());
    }

    /// Get the fingerprinted path for an asset.
    #[must_use]
    pub fn get(&self, original: &str) -> Option<&str> {
        self.assets.get(original).map(String::as_str)
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the manifest is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Iterate over `(original, fingerprinted)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assets.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize manifest to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.assets)
    }
}

/// Short content digest: the first [`DIGEST_LEN`] hex characters of SHA-256.
#[must_use]
pub fn content_digest(data: &[u8]) -> String {
    let full = format!("{:x}", Sha256::digest(data));
    full[..DIGEST_LEN].to_string()
}

/// Insert `.<digest>` before the extension of `file_name`.
///
/// The extension starts at the last dot, so `app.min.js` becomes
/// `app.min.<digest>.js` and a name without a dot gets the digest appended.
#[must_use]
pub fn fingerprint_name(file_name: &str, digest: &str) -> String {
    match file_name.rfind('.') {
        Some(index) => format!("{}.{digest}{}", &file_name[..index], &file_name[index..]),
        None => format!("{file_name}.{digest}"),
    }
}

/// [`fingerprint_name`] over a raw file name, which need not be UTF-8.
#[must_use]
pub fn fingerprint_os_name(file_name: &OsStr, digest: &str) -> OsString {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let bytes = file_name.as_bytes();
        let split = bytes.iter().rposition(|&b| b == b'.').unwrap_or(bytes.len());
        let mut name = Vec::with_capacity(bytes.len() + digest.len() + 1);
        name.extend_from_slice(&bytes[..split]);
        name.push(b'.');
        name.extend_from_slice(digest.as_bytes());
        name.extend_from_slice(&bytes[split..]);
        OsString::from_vec(name)
    }
    #[cfg(not(unix))]
    {
        fingerprint_name(&file_name.to_string_lossy(), digest).into()
    }
}

/// Copies assets under fingerprinted names.
#[derive(Debug, Default)]
pub struct AssetProcessor;

impl AssetProcessor {
    /// Create a new asset processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Process all assets from source to destination directory.
    ///
    /// A missing source directory yields an empty manifest.
    pub fn process(&self, source_dir: &Path, dest_dir: &Path) -> Result<AssetManifest> {
        info!(
            source = %source_dir.display(),
            dest = %dest_dir.display(),
            "processing assets"
        );

        let mut manifest = AssetManifest::new();

        if !source_dir.exists() {
            debug!("assets directory does not exist, skipping");
            return Ok(manifest);
        }

        fs::create_dir_all(dest_dir).map_err(io_err(dest_dir))?;

        for entry in WalkDir::new(source_dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            let relative = path
                .strip_prefix(source_dir)
                .map_err(|_| AssetError::InvalidPath(path.to_path_buf()))?;

            if entry.file_type().is_dir() {
                let dir = dest_dir.join(relative);
                fs::create_dir_all(&dir).map_err(io_err(&dir))?;
            } else {
                self.process_file(path, relative, dest_dir, &mut manifest)?;
            }
        }

        info!(count = manifest.len(), "assets processed");
        Ok(manifest)
    }

    /// Fingerprint and copy a single file.
    fn process_file(
        &self,
        file_path: &Path,
        relative: &Path,
        dest_base: &Path,
        manifest: &mut AssetManifest,
    ) -> Result<()> {
        let file_name = relative
            .file_name()
            .ok_or_else(|| AssetError::InvalidPath(file_path.to_path_buf()))?;

        let data = fs::read(file_path).map_err(io_err(file_path))?;
        let digest = content_digest(&data);
        let fingerprinted = fingerprint_os_name(file_name, &digest);

        let dest_relative = relative
            .parent()
            .unwrap_or(Path::new(""))
            .join(&fingerprinted);
        let dest_path = dest_base.join(&dest_relative);
        fs::write(&dest_path, &data).map_err(io_err(&dest_path))?;

        let name = relative.to_string_lossy().replace('\\', "/");
        let dest_name = dest_relative.to_string_lossy().replace('\\', "/");
        debug!(asset = %name, dest = %dest_name, "copied asset");
        manifest.add(name, dest_name);

        Ok(())
    }
}
