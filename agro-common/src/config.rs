//! Configuration loading and root folder resolution
//!
//! Bootstrap settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unparsable TOML file never aborts startup: a warning is
//! logged and compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ENV_ROOT_FOLDER: &str = "AGRO_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "agrodetect.db";

/// Certificate output directory inside the root folder
pub const CERTIFICATES_DIR: &str = "certificates";

/// Flat account file written by earlier releases
pub const LEGACY_ACCOUNTS_FILE: &str = "users.json";

/// Built-in defaults used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    pub max_upload_bytes: usize,
    pub session_idle_timeout_secs: u64,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            bind_address: "127.0.0.1".to_string(),
            port: 5780,
            log_level: "info".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            session_idle_timeout_secs: 3600,
        }
    }
}

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub bind_address: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Largest accepted leaf image upload, in bytes
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    #[serde(default)]
    pub session_idle_timeout_secs: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub voice: VoiceConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Speech synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// When false, voice playback is reported as unavailable
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the translate TTS endpoint
    #[serde(default = "default_voice_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_voice_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_voice_base_url(),
            timeout_secs: default_voice_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_voice_base_url() -> String {
    "https://translate.google.com".to_string()
}

fn default_voice_timeout_secs() -> u64 {
    15
}

/// Parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Default TOML location for a module: `<config dir>/agrodetect/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("agrodetect").join(format!("{}.toml", module_name)))
}

/// Load the TOML config, degrading to defaults on any failure
///
/// An explicit path that cannot be loaded is warned about; an absent default
/// file is normal and only logged at info level.
pub fn load_or_default(explicit: Option<&Path>, module_name: &str) -> TomlConfig {
    let (path, explicit) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path(module_name) {
            Some(p) => (p, false),
            None => return TomlConfig::default(),
        },
    };

    if !path.exists() {
        if explicit {
            warn!("Config file {} not found, using defaults", path.display());
        } else {
            info!("No config file at {}, using defaults", path.display());
        }
        return TomlConfig::default();
    }

    match load_toml_config(&path) {
        Ok(config) => {
            info!("Loaded configuration from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{} - using defaults", e);
            TomlConfig::default()
        }
    }
}

/// Resolves the root folder holding the database and certificates
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_override: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_override: None,
            toml_root: None,
        }
    }

    pub fn with_cli_override(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    pub fn with_toml_root(mut self, path: Option<PathBuf>) -> Self {
        self.toml_root = path;
        self
    }

    /// Apply CLI > environment > TOML > compiled default
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            info!("[{}] Root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
            if !path.trim().is_empty() {
                info!("[{}] Root folder from {}: {}", self.module_name, ENV_ROOT_FOLDER, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!("[{}] Root folder from TOML: {}", self.module_name, path.display());
            return path.clone();
        }

        let path = default_root_folder();
        info!("[{}] Root folder (default): {}", self.module_name, path.display());
        path
    }
}

/// Creates the root folder layout and hands out paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder if it does not exist
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn certificates_path(&self) -> PathBuf {
        self.root_folder.join(CERTIFICATES_DIR)
    }

    pub fn legacy_accounts_path(&self) -> PathBuf {
        self.root_folder.join(LEGACY_ACCOUNTS_FILE)
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("agrodetect"))
        .unwrap_or_else(|| PathBuf::from("./agrodetect_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_nested_defaults() {
        let config: TomlConfig = toml::from_str("port = 6000\n").unwrap();
        assert_eq!(config.port, Some(6000));
        assert!(config.root_folder.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.voice.enabled);
        assert_eq!(config.voice.timeout_secs, 15);
    }

    #[test]
    fn test_voice_section_overrides() {
        let config: TomlConfig = toml::from_str(
            "[voice]\nenabled = false\nbase_url = \"http://127.0.0.1:9\"\n",
        )
        .unwrap();
        assert!(!config.voice.enabled);
        assert_eq!(config.voice.base_url, "http://127.0.0.1:9");
        assert_eq!(config.voice.timeout_secs, 15);
    }

    #[test]
    fn test_initializer_paths() {
        let init = RootFolderInitializer::new(PathBuf::from("/srv/agro"));
        assert_eq!(init.database_path(), PathBuf::from("/srv/agro/agrodetect.db"));
        assert_eq!(init.certificates_path(), PathBuf::from("/srv/agro/certificates"));
        assert_eq!(init.legacy_accounts_path(), PathBuf::from("/srv/agro/users.json"));
    }
}
