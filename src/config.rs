use std::env;
use std::path::PathBuf;
use anyhow::{Context, Result, bail};

use crate::heartbeat::HeartbeatTarget;

/// Public address of the deployed service, pinged to keep the host awake.
pub const DEFAULT_HEARTBEAT_URL: &str = "https://visa-pizzaria-backend.onrender.com";

const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_database: Option<String>,
    pub service_port: u16,
    pub service_host: String,
    pub upload_dir: PathBuf,
    pub body_limit: usize,
    pub heartbeat_target: HeartbeatTarget,
    pub heartbeat_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongodb_uri = lookup("MONGODB_URI")
            .filter(|uri| !uri.trim().is_empty())
            .context("MONGODB_URI environment variable is required")?;

        let mongodb_database = lookup("MONGODB_DATABASE").filter(|db| !db.is_empty());

        let service_port = lookup("PORT")
            .unwrap_or_else(|| "3001".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let upload_dir = PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()));

        let body_limit = match lookup("BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .context("BODY_LIMIT_BYTES must be a positive integer")?,
            None => DEFAULT_BODY_LIMIT,
        };

        // Validated even when the heartbeat is disabled
        let heartbeat_target = HeartbeatTarget::parse(
            lookup("HEARTBEAT_URL").as_deref().unwrap_or(DEFAULT_HEARTBEAT_URL),
        )?;

        let heartbeat_enabled = match lookup("HEARTBEAT_ENABLED").as_deref() {
            None => true,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => bail!("HEARTBEAT_ENABLED must be true or false, got '{}'", other),
        };

        Ok(Config {
            mongodb_uri,
            mongodb_database,
            service_port,
            service_host,
            upload_dir,
            body_limit,
            heartbeat_target,
            heartbeat_enabled,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  MongoDB database: {}",
            self.mongodb_database.as_deref().unwrap_or("(from connection string)"));
        tracing::info!("  Upload directory: {}", self.upload_dir.display());
        tracing::info!("  Body limit: {} bytes", self.body_limit);
        if self.heartbeat_enabled {
            tracing::info!("  Heartbeat target: {}", self.heartbeat_target.url());
        } else {
            tracing::info!("  Heartbeat: disabled");
        }
        tracing::info!("  Service listening on: {}:{}", self.service_host, self.service_port);
    }
}
