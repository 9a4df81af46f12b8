//! Client configuration and API factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quiztime_core::traits::QuizApi;

use crate::http::HttpQuizApi;

/// Connection settings for the quiz API.
///
/// Note: Custom Debug impl masks the access token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server root, without the API prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path prefix of the versioned API.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_prefix", &self.api_prefix)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            access_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_api_prefix() -> String {
    "/api/v1".to_string()
}
fn default_timeout() -> u64 {
    30
}

/// Top-level quiztime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuiztimeConfig {
    /// Quiz API connection.
    #[serde(default)]
    pub api: ApiConfig,
    /// Directory where attempt reports are saved.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Never contact the API; quizzes come from files only.
    #[serde(default)]
    pub offline: bool,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("./quiztime-results")
}

impl Default for QuiztimeConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            results_dir: default_results_dir(),
            offline: false,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quiztime.toml` in the current directory
/// 2. `~/.config/quiztime/config.toml`
///
/// Environment variable overrides: `QUIZTIME_API_URL`, `QUIZTIME_TOKEN`.
pub fn load_config() -> Result<QuiztimeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuiztimeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quiztime.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuiztimeConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("QUIZTIME_API_URL") {
        config.api.base_url = url;
    }
    if let Ok(token) = std::env::var("QUIZTIME_TOKEN") {
        config.api.access_token = Some(token);
    }

    Ok(config)
}

/// Parse a config document and resolve `${VAR}` references.
pub fn parse_config(content: &str) -> Result<QuiztimeConfig> {
    let mut config: QuiztimeConfig = toml::from_str(content)?;
    config.api.base_url = resolve_env_vars(&config.api.base_url);
    config.api.access_token = config
        .api
        .access_token
        .as_deref()
        .map(resolve_env_vars)
        .filter(|token| !token.is_empty());
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quiztime"))
}

/// Create an API client from its configuration.
pub fn create_api(config: &ApiConfig) -> Result<Box<dyn QuizApi>> {
    Ok(Box::new(HttpQuizApi::from_config(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZTIME_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZTIME_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZTIME_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_QUIZTIME_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuiztimeConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.api_prefix, "/api/v1");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(!config.offline);
    }

    #[test]
    fn parse_full_config() {
        std::env::set_var("_QUIZTIME_TEST_TOKEN", "tok-123");
        let toml_str = r#"
results_dir = "attempts"
offline = true

[api]
base_url = "https://learn.example.com"
access_token = "${_QUIZTIME_TEST_TOKEN}"
timeout_secs = 5
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://learn.example.com");
        assert_eq!(config.api.access_token.as_deref(), Some("tok-123"));
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.results_dir, PathBuf::from("attempts"));
        assert!(config.offline);
        std::env::remove_var("_QUIZTIME_TEST_TOKEN");
    }

    #[test]
    fn unset_token_variable_means_no_token() {
        let config = parse_config("[api]\naccess_token = \"${_QUIZTIME_SURELY_UNSET}\"\n").unwrap();
        assert!(config.api.access_token.is_none());
    }

    #[test]
    fn debug_masks_token() {
        let config = ApiConfig {
            access_token: Some("secret-token".into()),
            ..ApiConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn load_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiztime.toml");
        std::fs::write(&path, "results_dir = \"out\"\n[api]\ntimeout_secs = 9\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.api.timeout_secs, 9);
        assert_eq!(config.results_dir, PathBuf::from("out"));
    }

    #[test]
    fn missing_explicit_config_fails() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
