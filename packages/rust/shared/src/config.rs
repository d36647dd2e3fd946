//! Application configuration for AssetLens.
//!
//! User config lives at `~/.assetlens/assetlens.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored in the file: it only names the environment
//! variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AssetLensError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "assetlens.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".assetlens";

// ---------------------------------------------------------------------------
// Config structs (matching assetlens.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Scraping provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Secondary asset-extraction pass settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP service binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".into()
}

/// `[provider]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name of the env var holding the provider API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Scrape endpoint of the provider.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// TCP connect timeout for provider requests.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            endpoint: default_endpoint(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "FIRECRAWL_API_KEY".into()
}
fn default_endpoint() -> String {
    "https://api.firecrawl.dev/v1/scrape".into()
}
fn default_connect_timeout() -> u64 {
    10
}

impl ProviderConfig {
    /// Read the provider API key from the configured env var.
    ///
    /// An unset or empty variable is a configuration error.
    pub fn api_key(&self) -> Result<String> {
        let var_name = &self.api_key_env;
        match std::env::var(var_name) {
            Ok(val) if !val.trim().is_empty() => Ok(val),
            _ => Err(AssetLensError::config(format!(
                "{var_name} environment variable is not set"
            ))),
        }
    }
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Name of the env var that, when set, points enrichment at a remote
    /// `/extract-assets` service instead of the in-process extractor.
    #[serde(default = "default_base_url_env")]
    pub base_url_env: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url_env: default_base_url_env(),
        }
    }
}

fn default_base_url_env() -> String {
    "ASSETLENS_EXTRACT_BASE_URL".into()
}

impl ExtractionConfig {
    /// Remote extraction base URL, if one is configured.
    pub fn remote_base_url(&self) -> Option<String> {
        std::env::var(&self.base_url_env)
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.assetlens/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AssetLensError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.assetlens/assetlens.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AssetLensError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        AssetLensError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AssetLensError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AssetLensError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AssetLensError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("bind"));
        assert!(toml_str.contains("FIRECRAWL_API_KEY"));
        assert!(toml_str.contains("ASSETLENS_EXTRACT_BASE_URL"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[provider]
endpoint = "http://localhost:9999/v1/scrape"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.provider.endpoint, "http://localhost:9999/v1/scrape");
        assert_eq!(config.provider.api_key_env, "FIRECRAWL_API_KEY");
        assert_eq!(config.provider.connect_timeout_secs, 10);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("assetlens-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("assetlens.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:8080\"\n").expect("write config");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.server.bind, "0.0.0.0:8080");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let config = ProviderConfig {
            // Unique name so parallel tests never set it.
            api_key_env: "ASSETLENS_TEST_NONEXISTENT_KEY_31337".into(),
            ..Default::default()
        };
        let err = config.api_key().unwrap_err();
        assert!(matches!(err, AssetLensError::Config { .. }));
        assert!(err.to_string().contains("is not set"));
    }

    #[test]
    fn remote_base_url_absent_by_default() {
        let config = ExtractionConfig {
            base_url_env: "ASSETLENS_TEST_NONEXISTENT_BASE_31337".into(),
        };
        assert!(config.remote_base_url().is_none());
    }
}
