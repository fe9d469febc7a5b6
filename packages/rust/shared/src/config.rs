//! Application configuration for ContactScout.
//!
//! User config lives at `~/.contactscout/contactscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ContactScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contactscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contactscout";

// ---------------------------------------------------------------------------
// Config structs (matching contactscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini model and credential settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Row pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Env vars tried in order when `api_key_env` is unset or empty.
    #[serde(default = "default_fallback_key_envs")]
    pub fallback_key_envs: Vec<String>,

    /// Model ID passed to `models/{model}:generateContent`.
    #[serde(default = "default_model")]
    pub model: String,

    /// API root, without the `/models/...` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            fallback_key_envs: default_fallback_key_envs(),
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_fallback_key_envs() -> Vec<String> {
    vec!["GEMINI_API_KEY_ALT".into()]
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_top_p() -> f32 {
    0.95
}
fn default_top_k() -> u32 {
    40
}
fn default_max_output_tokens() -> u32 {
    8192
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pause after every lookup call, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Text encodings tried in order when reading the input file.
    #[serde(default = "default_encodings")]
    pub encodings: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            encodings: default_encodings(),
        }
    }
}

fn default_delay_ms() -> u64 {
    1000
}
fn default_encodings() -> Vec<String> {
    vec!["utf-8".into(), "latin1".into(), "cp1252".into()]
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// A resolved Gemini API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Resolve the API key from the process environment.
///
/// Tries `api_key_env` first, then each of `fallback_key_envs`. Empty values
/// count as unset.
pub fn resolve_api_key(config: &GeminiConfig) -> Result<ApiKey> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}

/// Resolve the API key through an arbitrary variable lookup.
pub fn resolve_api_key_with(
    config: &GeminiConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ApiKey> {
    let names = std::iter::once(&config.api_key_env).chain(config.fallback_key_envs.iter());

    for name in names {
        if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(var = %name, "resolved Gemini API key");
            return Ok(ApiKey::new(value.trim()));
        }
    }

    Err(ContactScoutError::config(format!(
        "Gemini API key not found. Set the {} environment variable.\n\
         Get a key at https://aistudio.google.com/apikey",
        config.api_key_env
    )))
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contactscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContactScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contactscout/contactscout.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| ContactScoutError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ContactScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    config.validate()?;
    Ok(config)
}

impl AppConfig {
    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.gemini.base_url).map_err(|e| {
            ContactScoutError::config(format!(
                "invalid gemini.base_url '{}': {e}",
                self.gemini.base_url
            ))
        })?;

        if self.gemini.model.trim().is_empty() {
            return Err(ContactScoutError::config("gemini.model must not be empty"));
        }

        if self.pipeline.encodings.is_empty() {
            return Err(ContactScoutError::config(
                "pipeline.encodings must list at least one encoding",
            ));
        }

        Ok(())
    }
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ContactScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ContactScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ContactScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
