//! Application configuration
//!
//! Precedence: built-in defaults, then the config file (path from
//! `--config`/`PROMGATE_CONFIG`, falling back to `./promgate.json`), then
//! CLI flags and their environment fallbacks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
use crate::utils::time::parse_duration;

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Ingestion and expiry configuration
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// TTL applied when a sample carries no `expires` override
    pub default_ttl: Duration,
    /// Interval between janitor sweeps
    pub sweep_interval: Duration,
}

/// Fully resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
}

// =============================================================================
// File Config (all fields optional, merged over defaults)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IngestFileConfig {
    default_ttl: Option<String>,
    sweep_interval: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    server: Option<ServerFileConfig>,
    ingest: Option<IngestFileConfig>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl FileConfig {
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config (possible typos)
    fn warn_unknown_fields(&self) {
        if !self.extra.is_empty() {
            let keys: Vec<&str> = self.extra.keys().map(|k| k.as_str()).collect();
            tracing::warn!(fields = %keys.join(", "), "Unknown fields in config file");
        }
    }
}

impl AppConfig {
    /// Load configuration from file, env and CLI
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let file = Self::resolve_config_path(cli)?
            .map(|path| FileConfig::load_from_file(&path))
            .transpose()?
            .unwrap_or_default();
        file.warn_unknown_fields();

        let file_server = file.server.unwrap_or_default();
        let file_ingest = file.ingest.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let default_ttl_str = cli
            .default_ttl
            .clone()
            .or(file_ingest.default_ttl)
            .unwrap_or_else(|| DEFAULT_TTL.to_string());
        let default_ttl = parse_duration(&default_ttl_str)
            .with_context(|| format!("Invalid default TTL: {}", default_ttl_str))?;
        if default_ttl.is_zero() {
            anyhow::bail!("Default TTL must be greater than zero");
        }

        let sweep_str = cli
            .sweep_interval
            .clone()
            .or(file_ingest.sweep_interval)
            .unwrap_or_else(|| DEFAULT_SWEEP_INTERVAL.to_string());
        let sweep_interval = parse_duration(&sweep_str)
            .with_context(|| format!("Invalid sweep interval: {}", sweep_str))?;
        if sweep_interval.is_zero() {
            anyhow::bail!("Sweep interval must be greater than zero");
        }

        Ok(Self {
            server: ServerConfig { host, port },
            ingest: IngestConfig {
                default_ttl,
                sweep_interval,
            },
        })
    }

    /// Resolve the config file path: CLI path is required to exist; the
    /// local default file is optional.
    fn resolve_config_path(cli: &CliConfig) -> Result<Option<PathBuf>> {
        if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(Some(path.clone()));
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        Ok(local.exists().then_some(local))
    }
}
