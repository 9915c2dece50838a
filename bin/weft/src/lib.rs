//! Weft CLI Library
//!
//! Entry point for sites built with Weft. A site is a program that hands its
//! initial configuration step to [`main`], which parses the command line and
//! either builds the output directory or serves it.
//!
//! # Modules
//!
//! - [`cli`] - Command-line definition
//! - [`cmd`] - Command implementations (build, serve)
//! - [`server`] - Development server over the output directory
//!
//! # Example
//!
//! ```no_run
//! use std::io::Write;
//!
//! use weft::generator::ConfigureFn;
//!
//! fn main() -> color_eyre::Result<()> {
//!     weft::main(ConfigureFn::new(|site, _cx| {
//!         site.render_fn("index.html", |cx, out| {
//!             writeln!(out, "<link rel=\"stylesheet\" href=\"{}\">", cx.asset("site.css")?)?;
//!             Ok(())
//!         });
//!         Ok(())
//!     }))
//! }
//! ```

pub mod cli;
pub mod cmd;
pub mod server;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
pub use weft_core::Config;
pub use weft_generator as generator;
use weft_generator::{BuildContext, Configure, ConfigureFn, Site, SiteError};

use crate::cli::{Cli, Commands};

/// Parse the command line and run it against the site described by `configurer`.
pub fn main(configurer: impl Configure + 'static) -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Runtime::new().wrap_err("Failed to start runtime")?;
    runtime.block_on(run(cli, configurer))
}

/// Run an already parsed command line.
pub async fn run(cli: Cli, configurer: impl Configure + 'static) -> Result<()> {
    let config = Config::load_with_env(&cli.config).wrap_err("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let cx = BuildContext::new();
    let site = configure_site(&cx, &config, configurer).wrap_err("Failed to configure site")?;

    match cli.command {
        Commands::Build => cmd::build::run(site, cx).await,
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.serve.host);
            let port = port.unwrap_or(config.serve.port);
            cmd::serve::run(site.output_dir(), &host, port).await
        }
    }
}

/// Construct the site, applying the `[build]` settings before `configurer` runs.
pub fn configure_site(
    cx: &BuildContext,
    config: &Config,
    configurer: impl Configure + 'static,
) -> std::result::Result<Site, SiteError> {
    let build = config.build.clone();
    Site::with_config(
        cx,
        &config.site,
        ConfigureFn::new(move |site, _cx| {
            if let Some(shell) = build.shell {
                site.set_shell(shell);
            }
            site.set_write_manifest(build.write_manifest);
            for command in build.commands {
                site.run(command);
            }
            site.configure(configurer);
            Ok(())
        }),
    )
}

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
