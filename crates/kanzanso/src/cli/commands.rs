//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::Config;

/// Serve command arguments.
#[derive(Debug, Default, Args)]
pub struct ServeCommand {
    /// Interface to bind, overriding the configured host
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overriding the configured port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip seeding demo data on startup
    #[arg(long)]
    pub no_seed: bool,
}

impl ServeCommand {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.no_seed {
            config.seed.enabled = false;
        }
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration with secrets redacted
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides() {
        let mut config = Config::default();
        let cmd = ServeCommand {
            host: Some("127.0.0.1".to_string()),
            port: Some(9090),
            no_seed: true,
        };
        cmd.apply(&mut config);
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
        assert!(!config.seed.enabled);
    }

    #[test]
    fn test_serve_without_overrides() {
        let mut config = Config::default();
        ServeCommand::default().apply(&mut config);
        assert_eq!(config, Config::default());
    }
}
