//! Build orchestration.
//!
//! Phases run strictly in order: reset, commands, assets, public files,
//! render. The first four abort the build on error; render failures are
//! logged per page.

use std::{fs, io, path::Path, time::Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    assets::{AssetError, AssetProcessor},
    commands::{CommandError, CommandRunner},
    context::BuildContext,
    public::{PublicError, copy_public_files},
    render::RenderEngine,
    site::Site,
};

/// Build errors, each naming the phase that failed.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Output directory could not be removed or recreated.
    #[error("reset output dir: {0}")]
    Reset(#[source] std::io::Error),

    /// A build command failed.
    #[error("run commands: {0}")]
    Commands(#[from] CommandError),

    /// Asset fingerprinting failed.
    #[error("copy assets: {0}")]
    Assets(#[from] AssetError),

    /// Public files could not be mirrored.
    #[error("copy public files: {0}")]
    Public(#[from] PublicError),

    /// The asset manifest could not be written.
    #[error("write asset manifest: {0}")]
    Manifest(String),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of commands run.
    pub commands: usize,

    /// Number of fingerprinted assets.
    pub assets: usize,

    /// Number of public files copied.
    pub public_files: usize,

    /// Number of pages rendered.
    pub pages: usize,

    /// Output paths whose renderer failed.
    pub failed_pages: Vec<String>,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

impl Site {
    /// Rebuild the output directory from scratch.
    pub fn build(&mut self, cx: &BuildContext) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(output = %self.output_dir.display(), "starting build");

        // 1. Reset output directory
        self.reset_output()?;

        // 2. Run commands
        let runner = CommandRunner::new(self.shell.as_deref());
        stats.commands = runner.run_all(&self.commands, cx)?;

        // 3. Fingerprint assets
        let assets_out = self.output_dir.join(&self.assets_route);
        self.assets = AssetProcessor::new().process(&self.assets_dir, &assets_out)?;
        stats.assets = self.assets.len();
        if self.write_manifest && !self.assets.is_empty() {
            self.emit_manifest(&assets_out)?;
        }

        // 4. Copy public files
        stats.public_files = copy_public_files(&self.public_dir, &self.output_dir)?;

        // 5. Render pages
        let engine = RenderEngine::new(&self.output_dir, &self.assets, &self.assets_route);
        let report = engine.render_all(&self.renderers, cx);
        stats.pages = report.rendered;
        stats.failed_pages = report.failed.into_iter().map(|(path, _)| path).collect();

        stats.duration_ms = start.elapsed().as_millis() as u64;

        if !stats.failed_pages.is_empty() {
            warn!(failed = stats.failed_pages.len(), "some pages failed to render");
        }
        info!(
            commands = stats.commands,
            assets = stats.assets,
            public_files = stats.public_files,
            pages = stats.pages,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Remove whatever is at the output path and recreate it as a directory.
    fn reset_output(&self) -> Result<()> {
        let dir = &self.output_dir;
        match fs::symlink_metadata(dir) {
            Ok(meta) if meta.is_dir() => {
                debug!(dir = %dir.display(), "cleaning output directory");
                fs::remove_dir_all(dir).map_err(BuildError::Reset)?;
            }
            Ok(_) => {
                debug!(path = %dir.display(), "removing non-directory output path");
                fs::remove_file(dir).map_err(BuildError::Reset)?;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(BuildError::Reset(e)),
        }
        fs::create_dir_all(dir).map_err(BuildError::Reset)?;
        Ok(())
    }

    fn emit_manifest(&self, assets_out: &Path) -> Result<()> {
        let json = self
            .assets
            .to_json()
            .map_err(|e| BuildError::Manifest(e.to_string()))?;
        let path = assets_out.join("manifest.json");
        fs::write(&path, json).map_err(|e| BuildError::Manifest(e.to_string()))?;
        debug!(path = %path.display(), "wrote asset manifest");
        Ok(())
    }
}
