//! Configuration management for RAX FTP Client
//!
//! Layers built-in defaults, an optional `config.toml`, `RAX_FTP_CLIENT_*`
//! environment variables and finally command-line overrides.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::error::TransferError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: i64 = 21;
const DEFAULT_BUFFER_SIZE: i64 = 8192;
const DEFAULT_DOWNLOAD_DIR: &str = ".";

const CONFIG_PATH: &str = "config";
const ENV_PREFIX: &str = "RAX_FTP_CLIENT";

/// Client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Server address for the control connection
    /// Environment: RAX_FTP_CLIENT_HOST
    pub host: String,

    /// Server control port
    /// Environment: RAX_FTP_CLIENT_PORT
    pub port: u16,

    /// Read buffer size for data connections
    pub buffer_size: usize,

    /// Directory where downloaded files are written
    pub download_dir: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT as u16,
            buffer_size: DEFAULT_BUFFER_SIZE as usize,
            download_dir: DEFAULT_DOWNLOAD_DIR.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", DEFAULT_PORT)?
            .set_default("buffer_size", DEFAULT_BUFFER_SIZE)?
            .set_default("download_dir", DEFAULT_DOWNLOAD_DIR)?
            .add_source(File::with_name(CONFIG_PATH).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.host.trim().is_empty() {
            return Err(config::ConfigError::Message("host cannot be empty".into()));
        }

        if self.port == 0 {
            return Err(config::ConfigError::Message(
                "Control port cannot be 0".into(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Control connection address as `host:port`
    pub fn control_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Local path a downloaded remote file is written to.
    ///
    /// Only the last component of the remote name is used, so the file
    /// always lands directly inside `download_dir`.
    pub fn download_path(&self, remote_name: &str) -> Result<PathBuf, TransferError> {
        match Path::new(remote_name).components().next_back() {
            Some(Component::Normal(name)) => Ok(Path::new(&self.download_dir).join(name)),
            _ => Err(TransferError::InvalidFileName(remote_name.to_string())),
        }
    }
}
