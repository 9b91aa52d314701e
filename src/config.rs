//! Engine configuration, loadable from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid config.
//! Settings that do not apply to the current platform are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub capture: CaptureConfig,
    pub injector: InjectorConfig,
}

/// Device-poll capture settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Directory scanned for `event*` device nodes.
    pub device_dir: PathBuf,
    /// Sleep between polling passes; also bounds shutdown latency.
    pub poll_interval_ms: u64,
    /// Also read the engine's own virtual device, so injected keys show up
    /// in `is_key_pressed`.
    pub observe_injected: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_dir: PathBuf::from("/dev/input"),
            poll_interval_ms: 1,
            observe_injected: false,
        }
    }
}

/// Injection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InjectorConfig {
    /// Name of the uinput virtual device.
    pub device_name: String,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
    /// Hold time used by `Engine::tap_key`.
    pub press_delay_ms: u64,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            device_name: "CrossInput Virtual Device".into(),
            vendor: 0x1234,
            product: 0x5678,
            version: 1,
            press_delay_ms: 50,
        }
    }
}

impl EngineConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        log::debug!("config: loaded {}", path.display());
        Ok(config)
    }
}
