//! Execution contexts threaded through configuration steps, commands and renderers.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{assets::AssetManifest, site::SiteError};

/// Cancellation-aware context for a build.
///
/// Clones share the same cancellation flag, so a clone handed to a signal
/// handler can stop a build running elsewhere.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    cancelled: Arc<AtomicBool>,
}

impl BuildContext {
    /// Create a context that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// What a renderer sees while producing one output file.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    build: &'a BuildContext,
    assets: &'a AssetManifest,
    assets_route: &'a str,
    path: &'a str,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        build: &'a BuildContext,
        assets: &'a AssetManifest,
        assets_route: &'a str,
        path: &'a str,
    ) -> Self {
        Self {
            build,
            assets,
            assets_route,
            path,
        }
    }

    /// Resolve a logical asset name to its fingerprinted URL path.
    pub fn asset(&self, name: &str) -> Result<String, SiteError> {
        asset_url(self.assets, self.assets_route, name)
    }

    /// The frozen asset table.
    #[must_use]
    pub fn assets(&self) -> &'a AssetManifest {
        self.assets
    }

    /// Output-relative path of the file being rendered.
    #[must_use]
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// The surrounding build context.
    #[must_use]
    pub fn build(&self) -> &'a BuildContext {
        self.build
    }

    /// Whether the build was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.build.is_cancelled()
    }
}

pub(crate) fn asset_url(
    assets: &AssetManifest,
    route: &str,
    name: &str,
) -> Result<String, SiteError> {
    assets
        .get(name)
        .map(|path| format!("/{route}/{path}"))
        .ok_or_else(|| SiteError::AssetNotFound(name.to_string()))
}
