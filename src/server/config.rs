//! Server configuration
//!
//! Layers built-in defaults, an optional TOML file, `FTSERVER_*` environment
//! variables and the port given on the command line.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::transfer::WindowPlan;

/// Name of the config file looked up in the working directory when no
/// explicit path is given.
const DEFAULT_CONFIG_NAME: &str = "ftserver";

/// Server configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the control listener binds to
    pub bind_address: String,

    /// Port for the control connection
    pub port: u16,

    /// Directory whose entries are listed and served
    pub root_dir: PathBuf,

    /// Maximum number of bytes taken from the control socket per read
    pub command_buffer_size: usize,

    /// Bytes written per data-channel window during `get`
    pub window_size: usize,

    /// Bytes advanced through the file between windows
    pub window_stride: usize,

    /// Default data port is the listening port plus this offset
    pub data_port_offset: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 0,
            root_dir: PathBuf::from("."),
            command_buffer_size: 4096,
            window_size: 4095,
            window_stride: 4096,
            data_port_offset: 1,
        }
    }
}

impl ServerConfig {
    /// Load configuration for `port`, reading `config_file` if given or
    /// `ftserver.toml` from the working directory if it exists.
    pub fn load(port: u16, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_layers(port, config_file, Path::new(DEFAULT_CONFIG_NAME))
    }

    /// Layers defaults, `config_file` (or the optional file named by
    /// `fallback`, extension resolved by the `config` crate), the
    /// environment and `port`, in increasing precedence.
    fn load_layers(
        port: u16,
        config_file: Option<&Path>,
        fallback: &Path,
    ) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let mut builder = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("root_dir", defaults.root_dir.to_string_lossy().to_string())?
            .set_default("command_buffer_size", defaults.command_buffer_size as i64)?
            .set_default("window_size", defaults.window_size as i64)?
            .set_default("window_stride", defaults.window_stride as i64)?
            .set_default("data_port_offset", i64::from(defaults.data_port_offset))?;

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::from(fallback).required(false)),
        };

        let settings = builder
            .add_source(Environment::with_prefix("FTSERVER").try_parsing(true))
            .set_override("port", i64::from(port))?
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_buffer_size == 0 {
            return Err(ConfigError::Message(
                "command_buffer_size must be greater than 0".into(),
            ));
        }

        if self.window_size == 0 {
            return Err(ConfigError::Message(
                "window_size must be greater than 0".into(),
            ));
        }

        if self.window_size > self.window_stride {
            return Err(ConfigError::Message(
                "window_size cannot exceed window_stride".into(),
            ));
        }

        if !self.root_dir.is_dir() {
            return Err(ConfigError::Message(format!(
                "root_dir {} is not a directory",
                self.root_dir.display()
            )));
        }

        Ok(())
    }

    /// Get bind address and control port as socket address string
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Window layout used when sending files
    pub fn window_plan(&self) -> WindowPlan {
        WindowPlan::new(self.window_size, self.window_stride)
    }
}
