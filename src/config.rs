use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// File name of the journal document inside `data_dir`.
pub const STORAGE_FILE: &str = "mealmind.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into());
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        let config = Self {
            data_dir: data_dir.into(),
            host,
            port,
        };
        // fail at startup rather than at bind time
        config.bind_addr()?;
        Ok(config)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
