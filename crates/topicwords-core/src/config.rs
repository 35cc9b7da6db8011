use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::generate::DEFAULT_WORD_COUNT;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_word_count")]
    pub word_count: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            word_count: default_word_count(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub user: UserConfig,
    pub data_dir: PathBuf,
    pub resolved_output: String,
}

/// Path of the user config file, if a config directory exists.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("topicwords/config.toml"))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    load_config_from(&path)
}

/// Load a config file; a missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn resolve_config(cli_data_dir: Option<PathBuf>, cli_json: bool) -> Result<EffectiveConfig> {
    let mut user = load_user_config()?;
    if let Ok(endpoint) = env::var("TOPICWORDS_ENDPOINT") {
        user.generator.endpoint = endpoint;
    }

    let env_data_dir = env::var_os("TOPICWORDS_DATA_DIR").map(PathBuf::from);
    let data_dir = resolve_data_dir(cli_data_dir, env_data_dir, user.storage.data_dir.clone())?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format);

    Ok(EffectiveConfig {
        user,
        data_dir,
        resolved_output,
    })
}

/// Pick the data directory: CLI flag, then env, then config, then the
/// platform data dir.
pub fn resolve_data_dir(
    cli: Option<PathBuf>,
    env: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = cli.or(env).or(config) {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("topicwords"))
        .context("Could not determine a data directory; pass --data-dir")
}

fn resolve_output(cli_json: bool, user_output: Option<String>, env_format: Option<String>) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

fn default_endpoint() -> String {
    "https://w3tsrv.awesomeapps.workers.dev/".to_string()
}

fn default_model() -> String {
    "openai/gpt-oss-120b".to_string()
}

const fn default_word_count() -> usize {
    DEFAULT_WORD_COUNT
}

const fn default_timeout_secs() -> u64 {
    30
}
