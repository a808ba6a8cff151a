use std::path::PathBuf;

use clap::Parser;

use super::constants::{ENV_CONFIG, ENV_DEFAULT_TTL, ENV_HOST, ENV_PORT, ENV_SWEEP_INTERVAL};

#[derive(Parser, Debug)]
#[command(name = "promgate")]
#[command(version, about = "Push-to-pull metrics gateway with TTL expiry", long_about = None)]
pub struct CliConfig {
    /// Server host address
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Default TTL for samples without an expires override (e.g. "90s")
    #[arg(long, env = ENV_DEFAULT_TTL)]
    pub default_ttl: Option<String>,

    /// Janitor sweep interval (e.g. "60s")
    #[arg(long, env = ENV_SWEEP_INTERVAL)]
    pub sweep_interval: Option<String>,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,
}

/// Parse command line arguments
pub fn parse() -> CliConfig {
    CliConfig::parse()
}
