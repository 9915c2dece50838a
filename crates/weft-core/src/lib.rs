//! Weft Core Library
//!
//! Configuration model and error handling shared by the Weft build pipeline and CLI.

pub mod config;
pub mod error;

pub use crate::config::{BuildConfig, Config, ServeConfig, SiteConfig};
pub use crate::error::{CoreError, Result};
