//! Weft Generator Library
//!
//! Build orchestration engine for Weft.
//!
//! # Modules
//!
//! - [`site`] - The site and its self-extending configuration queue
//! - [`context`] - Build and render contexts
//! - [`commands`] - Sequential shell command execution
//! - [`assets`] - Content-addressed asset fingerprinting
//! - [`public`] - Verbatim copying of public files
//! - [`render`] - Page rendering with per-page failure isolation
//! - [`build`] - Build orchestration

pub mod assets;
pub mod build;
pub mod commands;
pub mod context;
pub mod public;
pub mod render;
pub mod site;

pub use assets::{AssetError, AssetManifest, AssetProcessor};
pub use build::{BuildError, BuildStats};
pub use commands::{CommandError, CommandRunner};
pub use context::{BuildContext, RenderContext};
pub use public::{PublicError, copy_public_files};
pub use render::{Render, RenderEngine, RenderError, RenderFn, RenderReport};
pub use site::{BoxError, Configure, ConfigureFn, Site, SiteError};
