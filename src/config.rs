//! Configuration for podshelf.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PODSHELF_HOME, PODSHELF_API_URL)
//! 2. Config file (.podshelf/config.yaml)
//! 3. Defaults (~/.podshelf, public podcast API)
//!
//! Config file discovery:
//! - Searches current directory and parents for .podshelf/config.yaml
//! - `paths.home` in the config file is relative to the .podshelf/ directory

pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::{StalePolicy, DEFAULT_BASE_URL, DEFAULT_EPISODE_LIST_FILE};
use crate::progress::CompletionPolicy;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".podshelf";
const CONFIG_FILE: &str = "config.yaml";
const HOME_ENV: &str = "PODSHELF_HOME";
const API_URL_ENV: &str = "PODSHELF_API_URL";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub policies: Option<PoliciesConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .podshelf/)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub episode_list_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoliciesConfig {
    pub stale_responses: Option<StalePolicy>,
    pub completion: Option<CompletionPolicy>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to podshelf home (persisted state)
    pub home: PathBuf,
    /// Catalog API settings
    pub api: ApiSettings,
    /// How overlapping catalog fetches are applied
    pub stale_policy: StalePolicy,
    /// What completion does to a saved position
    pub completion_policy: CompletionPolicy,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub episode_list_file: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            episode_list_file: DEFAULT_EPISODE_LIST_FILE.to_string(),
        }
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge env, config file and defaults
fn resolve(
    default_home: PathBuf,
    config_file: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let parsed = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    let home = if let Some(env_home) = env(HOME_ENV) {
        PathBuf::from(env_home)
    } else if let (Some(config), Some(path)) = (&parsed, &config_file) {
        match config.paths.home {
            Some(ref home) => {
                let config_dir = path.parent().unwrap_or(Path::new("."));
                resolve_path(config_dir, home)
            }
            None => default_home,
        }
    } else {
        default_home
    };

    let api_config = parsed.as_ref().and_then(|c| c.api.clone());
    let defaults = ApiSettings::default();
    let api = ApiSettings {
        base_url: env(API_URL_ENV)
            .or_else(|| api_config.as_ref().and_then(|a| a.base_url.clone()))
            .unwrap_or(defaults.base_url),
        timeout_seconds: api_config
            .as_ref()
            .and_then(|a| a.timeout_seconds)
            .unwrap_or(defaults.timeout_seconds),
        episode_list_file: api_config
            .as_ref()
            .and_then(|a| a.episode_list_file.clone())
            .unwrap_or(defaults.episode_list_file),
    };

    let policies = parsed.as_ref().and_then(|c| c.policies.clone());

    Ok(ResolvedConfig {
        home,
        api,
        stale_policy: policies
            .as_ref()
            .and_then(|p| p.stale_responses)
            .unwrap_or_default(),
        completion_policy: policies
            .as_ref()
            .and_then(|p| p.completion)
            .unwrap_or_default(),
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    let config_file = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_file(&cwd));

    resolve(default_home, config_file, |name| std::env::var(name).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the podshelf home directory
pub fn podshelf_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}
