//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.postboard/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::core::fetcher::CacheSettings;
use crate::core::query::{DEFAULT_PAGE_LIMIT, PageLimit, QueryError};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PostboardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub list: ListConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListConfig {
    pub page_limit: Option<i64>,
    pub list_stale_secs: Option<u64>,
    pub detail_stale_secs: Option<u64>,
    pub cache_gc_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LIST_STALE_SECS: u64 = 30;
pub const DEFAULT_DETAIL_STALE_SECS: u64 = 60;
pub const DEFAULT_CACHE_GC_SECS: u64 = 300;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    /// Token from env or config; when set it takes the place of the stored
    /// login session.
    pub token: Option<String>,
    pub request_timeout: Duration,
    pub page_limit: PageLimit,
    pub cache: CacheSettings,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub page_limit: Option<i64>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(QueryError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Invalid(e) => write!(f, "invalid config value: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.postboard/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".postboard").join("config.toml"))
}

/// Load config from `~/.postboard/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PostboardConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<PostboardConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(PostboardConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<PostboardConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(PostboardConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PostboardConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Postboard Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [api]
# base_url = "https://fe-hiring-rest-api.vercel.app"   # Or POSTBOARD_BASE_URL
# token = "..."                     # Or POSTBOARD_TOKEN; overrides `postboard login`
# request_timeout_secs = 15

# [list]
# page_limit = 10                   # 1..=100
# list_stale_secs = 30              # How long a fetched page is reused
# detail_stale_secs = 60
# cache_gc_secs = 300               # Unused pages are dropped after this long
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &PostboardConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], with environment lookups supplied by the caller.
pub fn resolve_with_env(
    config: &PostboardConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig, ConfigError> {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| env("POSTBOARD_BASE_URL"))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Token: env → config
    let token = env("POSTBOARD_TOKEN")
        .or_else(|| config.api.token.clone())
        .filter(|t| !t.trim().is_empty());

    // Page limit: CLI → config → default, rejected when out of range
    let page_limit = cli
        .page_limit
        .or(config.list.page_limit)
        .unwrap_or(i64::from(DEFAULT_PAGE_LIMIT));
    let page_limit = PageLimit::new(page_limit).map_err(ConfigError::Invalid)?;

    let cache = CacheSettings {
        list_stale_time: Duration::from_secs(
            config.list.list_stale_secs.unwrap_or(DEFAULT_LIST_STALE_SECS),
        ),
        detail_stale_time: Duration::from_secs(
            config.list.detail_stale_secs.unwrap_or(DEFAULT_DETAIL_STALE_SECS),
        ),
        gc_time: Duration::from_secs(config.list.cache_gc_secs.unwrap_or(DEFAULT_CACHE_GC_SECS)),
    };

    Ok(ResolvedConfig {
        base_url,
        token,
        request_timeout: Duration::from_secs(
            config
                .api
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        page_limit,
        cache,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved =
            resolve_with_env(&PostboardConfig::default(), &CliOverrides::default(), no_env).unwrap();
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.token, None);
        assert_eq!(resolved.page_limit.get(), 10);
        assert_eq!(resolved.cache.list_stale_time, Duration::from_secs(30));
        assert_eq!(resolved.cache.gc_time, Duration::from_secs(300));
        assert_eq!(resolved.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let config = PostboardConfig {
            api: ApiConfig {
                base_url: Some("http://from-file".to_string()),
                token: Some("file-token".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            "POSTBOARD_BASE_URL" => Some("http://from-env".to_string()),
            "POSTBOARD_TOKEN" => Some("env-token".to_string()),
            _ => None,
        };

        let resolved = resolve_with_env(&config, &CliOverrides::default(), env).unwrap();
        assert_eq!(resolved.base_url, "http://from-env");
        assert_eq!(resolved.token.as_deref(), Some("env-token"));

        let cli = CliOverrides {
            base_url: Some("http://from-cli".to_string()),
            page_limit: Some(50),
        };
        let resolved = resolve_with_env(&config, &cli, env).unwrap();
        assert_eq!(resolved.base_url, "http://from-cli");
        assert_eq!(resolved.page_limit.get(), 50);
    }

    #[test]
    fn test_out_of_range_limit_is_rejected() {
        let config = PostboardConfig {
            list: ListConfig {
                page_limit: Some(500),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(QueryError::LimitOutOfRange(500)))
        ));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let env = |key: &str| (key == "POSTBOARD_TOKEN").then(|| "  ".to_string());
        let resolved =
            resolve_with_env(&PostboardConfig::default(), &CliOverrides::default(), env).unwrap();
        assert_eq!(resolved.token, None);
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[list]
page_limit = 25
"#;
        let config: PostboardConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.list.page_limit, Some(25));
        assert!(config.api.base_url.is_none());
        assert!(config.list.list_stale_secs.is_none());
    }

    #[test]
    fn test_missing_file_generates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert!(config.api.base_url.is_none());
        assert!(path.exists());

        // The generated file is all comments, so it parses back to defaults
        let reloaded = load_config_from(&path).unwrap();
        assert!(reloaded.list.page_limit.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[list\npage_limit = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}
