use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_INGEST_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: SocketAddr,
    pub ingest_addr: SocketAddr,
    /// Host the front end dials to reach the ingest server.
    pub relay_host: String,
    pub static_dir: PathBuf,
    pub db_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let http_port: u16 = var("POSTBOX_HTTP_PORT", &DEFAULT_HTTP_PORT.to_string())
            .parse()
            .context("POSTBOX_HTTP_PORT is not a valid port")?;
        let ingest_port: u16 = var("POSTBOX_INGEST_PORT", &DEFAULT_INGEST_PORT.to_string())
            .parse()
            .context("POSTBOX_INGEST_PORT is not a valid port")?;

        let http_host = var("POSTBOX_HTTP_HOST", "0.0.0.0");
        let ingest_host = var("POSTBOX_INGEST_HOST", "0.0.0.0");

        let http_addr: SocketAddr = format!("{}:{}", http_host, http_port)
            .parse()
            .context("POSTBOX_HTTP_HOST is not a valid address")?;
        let ingest_addr: SocketAddr = format!("{}:{}", ingest_host, ingest_port)
            .parse()
            .context("POSTBOX_INGEST_HOST is not a valid address")?;

        Ok(Self {
            http_addr,
            ingest_addr,
            relay_host: var("POSTBOX_RELAY_HOST", "127.0.0.1"),
            static_dir: var("POSTBOX_STATIC_DIR", "front-init").into(),
            db_path: var("POSTBOX_DB_PATH", "postbox.db").into(),
        })
    }

    /// `host:port` the relay client connects to.
    pub fn relay_target(&self) -> String {
        format!("{}:{}", self.relay_host, self.ingest_addr.port())
    }
}
