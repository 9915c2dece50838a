//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line interface for Weft.
#[derive(Debug, Parser)]
#[command(name = "weft", version, about = "Build and serve a static site")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "weft.toml")]
    pub config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rebuild the output directory from scratch
    Build,
    /// Serve the output directory over HTTP
    Serve {
        /// Interface to bind (overrides serve.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides serve.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build_command_parsing() {
        let cli = Cli::parse_from(["weft", "build"]);

        assert_eq!(cli.config, PathBuf::from("weft.toml"));
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.command, Commands::Build));
    }

    #[test]
    fn test_cli_serve_command_parsing() {
        let cli = Cli::parse_from(["weft", "serve", "--port", "3000", "--host", "0.0.0.0"]);

        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(3000));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_serve_defaults_from_config() {
        let cli = Cli::parse_from(["weft", "serve"]);

        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert!(port.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let cli = Cli::parse_from(["weft", "-vvv", "build"]);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_custom_config_path() {
        let cli = Cli::parse_from(["weft", "--config", "site.toml", "build"]);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["weft"]).is_err());
    }
}
