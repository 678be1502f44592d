//! Application configuration for brochure.
//!
//! User config lives at `~/.brochure/brochure.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BrochureError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "brochure.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".brochure";

// ---------------------------------------------------------------------------
// Config structs (matching brochure.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Ollama endpoint settings.
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Character budget for the gathered site details in the brochure prompt.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,

    /// Timeout in seconds for page fetches.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: default_max_prompt_chars(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_max_prompt_chars() -> usize {
    5000
}
fn default_fetch_timeout() -> u64 {
    30
}

/// `[ollama]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the local Ollama service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to use for link selection and brochure generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout in seconds for model calls (local models can be slow).
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_model_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llama3.2".into()
}
fn default_model_timeout() -> u64 {
    120
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.brochure/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BrochureError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.brochure/brochure.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| BrochureError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BrochureError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BrochureError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BrochureError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BrochureError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
