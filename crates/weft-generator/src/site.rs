//! The site: build settings plus everything configuration steps register.
//!
//! A [`Site`] is built from one initial configuration step. Steps run in FIFO
//! order and may queue further steps, renderers and commands; construction
//! finishes once the queue is empty.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    io::Write,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use weft_core::SiteConfig;

use crate::{
    assets::AssetManifest,
    context::{BuildContext, RenderContext, asset_url},
    render::{Render, RenderFn},
};

/// Error type returned by user-supplied configuration steps and renderers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Site construction and lookup errors.
#[derive(Debug, Error)]
pub enum SiteError {
    /// A configuration step failed; the site is unusable.
    #[error("configure: {0}")]
    Configure(#[source] BoxError),

    /// No asset was registered under this logical name.
    #[error("asset {0:?} not found")]
    AssetNotFound(String),
}

/// A configuration step, consumed exactly once while the site is constructed.
pub trait Configure: Send {
    /// Mutate `site`: register renderers, commands or further steps.
    fn configure(self: Box<Self>, site: &mut Site, cx: &BuildContext) -> Result<(), BoxError>;
}

/// Adapts a closure into a [`Configure`].
pub struct ConfigureFn<F>(F);

impl<F> ConfigureFn<F>
where
    F: FnOnce(&mut Site, &BuildContext) -> Result<(), BoxError> + Send,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Configure for ConfigureFn<F>
where
    F: FnOnce(&mut Site, &BuildContext) -> Result<(), BoxError> + Send,
{
    fn configure(self: Box<Self>, site: &mut Site, cx: &BuildContext) -> Result<(), BoxError> {
        (self.0)(site, cx)
    }
}

impl<F> fmt::Debug for ConfigureFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigureFn").finish_non_exhaustive()
    }
}

/// Central build context: directories, asset table and registrations.
pub struct Site {
    pub(crate) output_dir: PathBuf,
    pub(crate) public_dir: PathBuf,
    pub(crate) assets_dir: PathBuf,
    pub(crate) assets_route: String,
    pub(crate) shell: Option<String>,
    pub(crate) write_manifest: bool,

    pub(crate) assets: AssetManifest,
    pending: VecDeque<Box<dyn Configure>>,
    pub(crate) renderers: HashMap<String, Box<dyn Render>>,
    pub(crate) commands: Vec<String>,
}

impl Site {
    /// Construct a site with the default layout and drain the configuration queue.
    pub fn new(cx: &BuildContext, initial: impl Configure + 'static) -> Result<Self, SiteError> {
        Self::with_config(cx, &SiteConfig::default(), initial)
    }

    /// Construct a site using the directories from `config`.
    pub fn with_config(
        cx: &BuildContext,
        config: &SiteConfig,
        initial: impl Configure + 'static,
    ) -> Result<Self, SiteError> {
        let mut site = Self {
            output_dir: config.output_dir.clone(),
            public_dir: config.public_dir.clone(),
            assets_dir: config.assets_dir.clone(),
            assets_route: config.assets_route.clone(),
            shell: None,
            write_manifest: false,
            assets: AssetManifest::new(),
            pending: VecDeque::new(),
            renderers: HashMap::new(),
            commands: Vec::new(),
        };
        site.configure(initial);
        site.drain(cx)?;

        info!(
            renderers = site.renderers.len(),
            commands = site.commands.len(),
            "site configured"
        );
        Ok(site)
    }

    fn drain(&mut self, cx: &BuildContext) -> Result<(), SiteError> {
        let mut steps = 0usize;
        while let Some(step) = self.pending.pop_front() {
            steps += 1;
            step.configure(self, cx).map_err(SiteError::Configure)?;
        }
        debug!(steps, "configuration queue drained");
        Ok(())
    }

    /// Queue a configuration step after every step already queued.
    pub fn configure(&mut self, step: impl Configure + 'static) {
        self.pending.push_back(Box::new(step));
    }

    /// Queue a closure as a configuration step.
    pub fn configure_fn<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Site, &BuildContext) -> Result<(), BoxError> + Send + 'static,
    {
        self.configure(ConfigureFn::new(f));
    }

    /// Register the renderer for an output-relative path, replacing any previous one.
    pub fn render(&mut self, path: impl Into<String>, renderer: impl Render + 'static) {
        let path = path.into();
        if self.renderers.insert(path.clone(), Box::new(renderer)).is_some() {
            debug!(path = %path, "renderer replaced");
        }
    }

    /// Register a closure as the renderer for `path`.
    pub fn render_fn<F>(&mut self, path: impl Into<String>, f: F)
    where
        F: Fn(&RenderContext<'_>, &mut dyn Write) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.render(path, RenderFn::new(f));
    }

    /// Append a shell command to run before assets are copied.
    pub fn run(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    /// Resolve a logical asset name to its fingerprinted URL path.
    ///
    /// Only meaningful after the asset phase of [`Site::build`].
    pub fn asset(&self, name: &str) -> Result<String, SiteError> {
        asset_url(&self.assets, &self.assets_route, name)
    }

    /// The asset table from the most recent build.
    #[must_use]
    pub fn assets(&self) -> &AssetManifest {
        &self.assets
    }

    /// Registered commands, in run order.
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Registered output paths, sorted.
    #[must_use]
    pub fn rendered_paths(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.renderers.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Public files directory.
    #[must_use]
    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// Assets source directory.
    #[must_use]
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// URL segment fingerprinted assets are served under.
    #[must_use]
    pub fn assets_route(&self) -> &str {
        &self.assets_route
    }

    /// Set the output directory.
    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = dir.into();
    }

    /// Set the public files directory.
    pub fn set_public_dir(&mut self, dir: impl Into<PathBuf>) {
        self.public_dir = dir.into();
    }

    /// Set the assets source directory.
    pub fn set_assets_dir(&mut self, dir: impl Into<PathBuf>) {
        self.assets_dir = dir.into();
    }

    /// Use `shell` for commands instead of `$SHELL`.
    pub fn set_shell(&mut self, shell: impl Into<String>) {
        self.shell = Some(shell.into());
    }

    /// Write `manifest.json` next to the fingerprinted assets on build.
    pub fn set_write_manifest(&mut self, enabled: bool) {
        self.write_manifest = enabled;
    }
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("output_dir", &self.output_dir)
            .field("public_dir", &self.public_dir)
            .field("assets_dir", &self.assets_dir)
            .field("assets_route", &self.assets_route)
            .field("assets", &self.assets)
            .field("renderers", &self.rendered_paths())
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn record(log: &Log, name: &'static str) {
        log.lock().unwrap().push(name);
    }

    #[test]
    fn test_default_layout() {
        let site = Site::new(&BuildContext::new(), ConfigureFn::new(|_site, _cx| Ok(()))).unwrap();

        assert_eq!(site.output_dir(), Path::new("output"));
        assert_eq!(site.public_dir(), Path::new("public"));
        assert_eq!(site.assets_dir(), Path::new("assets"));
        assert_eq!(site.assets_route(), "assets");
        assert!(site.commands().is_empty());
    }

    #[test]
    fn test_queue_is_breadth_first() {
        let log: Log = Arc::default();
        let l = log.clone();

        Site::new(
            &BuildContext::new(),
            ConfigureFn::new(move |site, _cx| {
                record(&l, "root");
                let (a, b) = (l.clone(), l.clone());
                site.configure_fn(move |site, _cx| {
                    record(&a, "a");
                    let a1 = a.clone();
                    site.configure_fn(move |site, _cx| {
                        record(&a1, "a1");
                        let a11 = a1.clone();
                        site.configure_fn(move |_site, _cx| {
                            record(&a11, "a11");
                            Ok(())
                        });
                        Ok(())
                    });
                    Ok(())
                });
                site.configure_fn(move |site, _cx| {
                    record(&b, "b");
                    let b1 = b.clone();
                    site.configure_fn(move |_site, _cx| {
                        record(&b1, "b1");
                        Ok(())
                    });
                    Ok(())
                });
                Ok(())
            }),
        )
        .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["root", "a", "b", "a1", "b1", "a11"]);
    }

    #[test]
    fn test_failing_step_aborts_construction() {
        let log: Log = Arc::default();
        let l = log.clone();

        let result = Site::new(
            &BuildContext::new(),
            ConfigureFn::new(move |site, _cx| {
                let (a, b) = (l.clone(), l.clone());
                site.configure_fn(move |_site, _cx| {
                    record(&a, "failing");
                    Err("bad step".into())
                });
                site.configure_fn(move |_site, _cx| {
                    record(&b, "never");
                    Ok(())
                });
                Ok(())
            }),
        );

        let err = result.unwrap_err();
        assert!(matches!(err, SiteError::Configure(_)));
        assert!(err.to_string().contains("bad step"));
        assert_eq!(*log.lock().unwrap(), vec!["failing"]);
    }

    #[test]
    fn test_registrations() {
        let site = Site::new(
            &BuildContext::new(),
            ConfigureFn::new(|site, _cx| {
                site.run("npm run css");
                site.render_fn("b.html", |_cx, out| Ok(out.write_all(b"b")?));
                site.render_fn("a.html", |_cx, out| Ok(out.write_all(b"a")?));
                site.configure_fn(|site, _cx| {
                    site.run("npm run js");
                    site.render_fn("a.html", |_cx, out| Ok(out.write_all(b"a2")?));
                    Ok(())
                });
                Ok(())
            }),
        )
        .unwrap();

        assert_eq!(site.commands(), ["npm run css", "npm run js"]);
        assert_eq!(site.rendered_paths(), vec!["a.html", "b.html"]);
    }

    #[test]
    fn test_with_config_layout() {
        let config = SiteConfig {
            output_dir: PathBuf::from("dist"),
            public_dir: PathBuf::from("static"),
            assets_dir: PathBuf::from("src/assets"),
            assets_route: "a".to_string(),
        };
        let site = Site::with_config(
            &BuildContext::new(),
            &config,
            ConfigureFn::new(|site, _cx| {
                site.set_shell("bash");
                Ok(())
            }),
        )
        .unwrap();

        assert_eq!(site.output_dir(), Path::new("dist"));
        assert_eq!(site.assets_route(), "a");
        assert_eq!(site.shell.as_deref(), Some("bash"));
    }

    #[test]
    fn test_unknown_asset_is_error() {
        let site = Site::new(&BuildContext::new(), ConfigureFn::new(|_site, _cx| Ok(()))).unwrap();
        let err = site.asset("image.png").unwrap_err();
        assert_eq!(err.to_string(), "asset \"image.png\" not found");
    }
}
