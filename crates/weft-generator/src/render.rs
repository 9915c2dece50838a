//! Page rendering.
//!
//! Every registered renderer writes exactly one file under the output
//! directory. A failing renderer is logged and skipped; it never fails the
//! build.

use std::{
    collections::HashMap,
    fmt,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Component, Path, PathBuf},
};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    assets::AssetManifest,
    context::{BuildContext, RenderContext},
    site::BoxError,
};

/// Produces the contents of one output file.
pub trait Render: Send + Sync {
    /// Write the page body to `out`.
    fn render(&self, cx: &RenderContext<'_>, out: &mut dyn Write) -> Result<(), BoxError>;
}

/// Adapts a closure into a [`Render`].
pub struct RenderFn<F>(F);

impl<F> RenderFn<F>
where
    F: Fn(&RenderContext<'_>, &mut dyn Write) -> Result<(), BoxError> + Send + Sync,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Render for RenderFn<F>
where
    F: Fn(&RenderContext<'_>, &mut dyn Write) -> Result<(), BoxError> + Send + Sync,
{
    fn render(&self, cx: &RenderContext<'_>, out: &mut dyn Write) -> Result<(), BoxError> {
        (self.0)(cx, out)
    }
}

impl<F> fmt::Debug for RenderFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderFn").finish_non_exhaustive()
    }
}

/// Errors from a single renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output path is absolute or leaves the output directory.
    #[error("invalid output path: {0}")]
    InvalidPath(String),

    /// Creating, writing or flushing the output file failed.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer itself returned an error.
    #[error("{0}")]
    Render(#[source] BoxError),
}

/// Outcome of the render phase.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Number of files rendered successfully.
    pub rendered: usize,

    /// Paths that failed, with the error message.
    pub failed: Vec<(String, String)>,
}

/// Runs renderers against a frozen asset table.
#[derive(Debug)]
pub struct RenderEngine<'a> {
    output_dir: &'a Path,
    assets: &'a AssetManifest,
    assets_route: &'a str,
}

impl<'a> RenderEngine<'a> {
    /// Create an engine writing below `output_dir`.
    #[must_use]
    pub fn new(output_dir: &'a Path, assets: &'a AssetManifest, assets_route: &'a str) -> Self {
        Self {
            output_dir,
            assets,
            assets_route,
        }
    }

    /// Render every page in parallel.
    pub fn render_all(
        &self,
        renderers: &HashMap<String, Box<dyn Render>>,
        cx: &BuildContext,
    ) -> RenderReport {
        info!(count = renderers.len(), "rendering pages");

        let results: Vec<_> = renderers
            .par_iter()
            .map(|(path, renderer)| (path, self.render_one(path, renderer.as_ref(), cx)))
            .collect();

        let mut report = RenderReport::default();
        for (path, result) in results {
            match result {
                Ok(()) => report.rendered += 1,
                Err(e) => {
                    warn!(path = %path, error = %e, "failed to render page");
                    report.failed.push((path.clone(), e.to_string()));
                }
            }
        }
        report.failed.sort();

        report
    }

    /// Render a single page to `<output_dir>/<path>`.
    pub fn render_one(
        &self,
        path: &str,
        renderer: &dyn Render,
        cx: &BuildContext,
    ) -> Result<(), RenderError> {
        let output_path = self.output_path(path)?;
        debug!(path, "rendering");

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(&output_path).map_err(|source| RenderError::Io {
            path: output_path.clone(),
            source,
        })?;

        let mut writer = BufWriter::new(file);
        let render_cx = RenderContext::new(cx, self.assets, self.assets_route, path);
        renderer
            .render(&render_cx, &mut writer)
            .map_err(RenderError::Render)?;
        writer.flush().map_err(|source| RenderError::Io {
            path: output_path,
            source,
        })?;

        Ok(())
    }

    fn output_path(&self, path: &str) -> Result<PathBuf, RenderError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(RenderError::InvalidPath(path.to_string()));
        }
        Ok(self.output_dir.join(relative))
    }
}
