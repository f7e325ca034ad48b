//! Command line interface for the Kindred server

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "kindred-server", version, about = "Kindred family service")]
pub struct CliArgs {
    /// Host address to bind to
    #[arg(long, env = "KINDRED_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "KINDRED_SERVER_PORT", default_value_t = 8280)]
    pub port: u16,

    /// Path to a kindred configuration file (toml/yaml/json)
    #[arg(short, long, env = "KINDRED_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level filter (e.g. "info", "kindred=debug")
    #[arg(long, env = "KINDRED_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Tenant id applied to requests that do not carry one
    #[arg(long, env = "KINDRED_DEFAULT_TENANT")]
    pub default_tenant: Option<uuid::Uuid>,
}

impl CliArgs {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
