//! Configuration file loading for replbridge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `REPLBRIDGE_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./replbridge.toml` or `./.replbridge.toml`
//! 4. Global: `$XDG_CONFIG_HOME/replbridge/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_DEBUG_PORT, FileBridgeConfig, FileConfig, FileLoggingConfig,
    FileMarkerConfig, FileOutputConfig, FileProcessConfig, FileSessionConfig, SUPPORTED_DIALECTS,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
