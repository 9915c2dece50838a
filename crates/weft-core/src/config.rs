//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for Weft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory layout.
    #[serde(default)]
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings.
    #[serde(default)]
    pub serve: ServeConfig,
}

/// Directory layout of a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Output directory, wiped and regenerated on every build.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Files mirrored verbatim into the output directory.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Files copied under a content-addressed name.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// URL segment (and output sub-directory) fingerprinted assets live under.
    #[serde(default = "default_assets_route")]
    pub assets_route: String,
}

/// Build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Shell commands run before assets are copied.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Shell used to run commands. Falls back to `$SHELL`, then `sh`.
    #[serde(default)]
    pub shell: Option<String>,

    /// Write the asset manifest as JSON next to the fingerprinted assets.
    #[serde(default)]
    pub write_manifest: bool,
}

/// Development server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_assets_route() -> String {
    "assets".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            public_dir: default_public_dir(),
            assets_dir: default_assets_dir(),
            assets_route: default_assets_route(),
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `WEFT__SECTION__KEY` environment overrides.
    ///
    /// A missing file contributes nothing, so the overrides apply on top of
    /// the defaults.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("WEFT").separator("__"))
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or use the defaults when it is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(CoreError::NotFound(_)) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn normalize(&mut self) {
        let trimmed = self.site.assets_route.trim_matches('/');
        if trimmed.len() != self.site.assets_route.len() {
            tracing::warn!("site.assets_route should not have leading or trailing slashes");
            self.site.assets_route = trimmed.to_string();
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        let site = &self.site;

        if site.output_dir.as_os_str().is_empty() {
            return Err(CoreError::config("site.output_dir cannot be empty"));
        }

        // The output directory is removed on every build.
        if site.output_dir == site.public_dir || site.output_dir == site.assets_dir {
            return Err(CoreError::config(
                "site.output_dir must differ from site.public_dir and site.assets_dir",
            ));
        }

        if site.assets_route.is_empty() {
            return Err(CoreError::config("site.assets_route cannot be empty"));
        }

        if site.assets_route.split('/').any(|seg| seg == "..") {
            return Err(CoreError::config(
                "site.assets_route cannot contain '..' segments",
            ));
        }

        if self.build.commands.iter().any(|c| c.trim().is_empty()) {
            return Err(CoreError::config("build.commands cannot contain empty commands"));
        }

        Ok(())
    }
}
