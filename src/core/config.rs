//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.azchat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! Secrets (`CLIENT_SECRET`) are normally supplied through the environment or
//! a `.env` file rather than the config file.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::AuthSettings;
use crate::auth::flow::{DEFAULT_AUTHORITY_HOST, DEFAULT_REDIRECT_URI, DEFAULT_SCOPE};
use crate::inference::SamplingConfig;
use crate::inference::providers::azure::DEFAULT_API_VERSION;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AzchatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct IdentityConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant_id: Option<String>,
    pub authority_host: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ENDPOINT: &str = "https://ai-kokuljosetesthub385023345165.openai.azure.com/";
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4.1-mini";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

// ============================================================================
// Resolved Config (concrete values, no Options except missing credentials)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub auth: AuthSettings,
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
    pub system_prompt: String,
    pub sampling: SamplingConfig,
}

/// Values that only come from the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub deployment: Option<String>,
    pub endpoint: Option<String>,
    pub redirect_uri: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.azchat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".azchat").join("config.toml"))
}

/// Load config from `~/.azchat/config.toml`, or from `explicit` when given.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `AzchatConfig::default()`. An explicit path that doesn't exist is
/// an I/O error. A malformed file is `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<AzchatConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                warn!("Could not determine home directory, using default config");
                return Ok(AzchatConfig::default());
            }
        },
    };

    if explicit.is_none() && !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(AzchatConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<AzchatConfig, ConfigError> {
    let config: AzchatConfig = toml::from_str(contents).map_err(ConfigError::Parse)?;
    // Never log the struct itself: it may carry the client secret.
    debug!(
        "Config: deployment={:?}, endpoint={:?}, tenant set={}",
        config.openai.deployment,
        config.openai.endpoint,
        config.identity.tenant_id.is_some()
    );
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# azchat Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# system_prompt = "You are a helpful AI assistant."
# temperature = 1.0                  # 0.0 – 2.0
# max_tokens = 1000                  # 100 – 4000

# [identity]
# client_id = "00000000-0000-0000-0000-000000000000"   # Or CLIENT_ID
# tenant_id = "00000000-0000-0000-0000-000000000000"   # Or TENANT_ID
# client_secret = "..."              # Prefer the CLIENT_SECRET env var
# authority_host = "https://login.microsoftonline.com"
# redirect_uri = "http://localhost:8400/redirect"
# scope = "https://cognitiveservices.azure.com/.default"

# [openai]
# endpoint = "https://my-resource.openai.azure.com/"  # Or ENDPOINT_URL
# deployment = "gpt-4.1-mini"                          # Or DEPLOYMENT_NAME
# api_version = "2025-01-01-preview"
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

/// Source of environment values. Tests pass a closure over a fixed map.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads the process environment, treating empty values as unset.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &AzchatConfig, cli: &CliOverrides, env: EnvLookup<'_>) -> ResolvedConfig {
    let auth = AuthSettings {
        client_id: env("CLIENT_ID").or_else(|| config.identity.client_id.clone()),
        client_secret: env("CLIENT_SECRET").or_else(|| config.identity.client_secret.clone()),
        tenant_id: env("TENANT_ID").or_else(|| config.identity.tenant_id.clone()),
        authority_host: env("AZURE_AUTHORITY_HOST")
            .or_else(|| config.identity.authority_host.clone())
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
        redirect_uri: cli
            .redirect_uri
            .clone()
            .or_else(|| env("REDIRECT_URI"))
            .or_else(|| config.identity.redirect_uri.clone())
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
        scope: config
            .identity
            .scope
            .clone()
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
    };

    // Endpoint / deployment: CLI → env → config → default
    let endpoint = cli
        .endpoint
        .clone()
        .or_else(|| env("ENDPOINT_URL"))
        .or_else(|| config.openai.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let deployment = cli
        .deployment
        .clone()
        .or_else(|| env("DEPLOYMENT_NAME"))
        .or_else(|| config.openai.deployment.clone())
        .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string());

    let api_version = env("AZURE_OPENAI_API_VERSION")
        .or_else(|| config.openai.api_version.clone())
        .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

    let defaults = SamplingConfig::default();
    let sampling = SamplingConfig::new(
        config.general.temperature.unwrap_or(defaults.temperature()),
        config.general.max_tokens.unwrap_or(defaults.max_tokens()),
    );

    ResolvedConfig {
        auth,
        endpoint,
        deployment,
        api_version,
        system_prompt: config
            .general
            .system_prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        sampling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&AzchatConfig::default(), &CliOverrides::default(), &no_env);
        assert_eq!(resolved.deployment, DEFAULT_DEPLOYMENT);
        assert_eq!(resolved.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(resolved.api_version, DEFAULT_API_VERSION);
        assert_eq!(resolved.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(resolved.sampling, SamplingConfig::default());
        assert_eq!(resolved.auth.scope, DEFAULT_SCOPE);
        assert_eq!(resolved.auth.redirect_uri, DEFAULT_REDIRECT_URI);
        assert!(resolved.auth.client_id.is_none());
    }

    #[test]
    fn test_env_overrides_config_file() {
        let config = parse_config(
            r#"
[identity]
client_id = "from-file"
tenant_id = "tenant-file"

[openai]
deployment = "file-deployment"
"#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("CLIENT_ID", "from-env"),
            ("DEPLOYMENT_NAME", "env-deployment"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let resolved = resolve(&config, &CliOverrides::default(), &lookup);
        assert_eq!(resolved.auth.client_id.as_deref(), Some("from-env"));
        assert_eq!(resolved.auth.tenant_id.as_deref(), Some("tenant-file"));
        assert_eq!(resolved.deployment, "env-deployment");
    }

    #[test]
    fn test_cli_wins_over_env() {
        let lookup = |key: &str| (key == "DEPLOYMENT_NAME").then(|| "env-deployment".to_string());
        let cli = CliOverrides {
            deployment: Some("cli-deployment".to_string()),
            ..Default::default()
        };
        let resolved = resolve(&AzchatConfig::default(), &cli, &lookup);
        assert_eq!(resolved.deployment, "cli-deployment");
    }

    #[test]
    fn test_sampling_from_file_is_clamped() {
        let config = parse_config(
            r#"
[general]
temperature = 3.5
max_tokens = 9000
"#,
        )
        .unwrap();
        let resolved = resolve(&config, &CliOverrides::default(), &no_env);
        assert_eq!(resolved.sampling.temperature(), 2.0);
        assert_eq!(resolved.sampling.max_tokens(), 4000);
    }

    #[test]
    fn test_blank_system_prompt_falls_back() {
        let config = parse_config("[general]\nsystem_prompt = \"   \"\n").unwrap();
        let resolved = resolve(&config, &CliOverrides::default(), &no_env);
        assert_eq!(resolved.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config = parse_config("[openai]\nendpoint = \"https://x.openai.azure.com\"\n").unwrap();
        assert_eq!(config.openai.endpoint.as_deref(), Some("https://x.openai.azure.com"));
        assert!(config.identity.client_id.is_none());
        assert!(config.general.temperature.is_none());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(parse_config("[general\n"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_explicit_missing_path_is_io_error() {
        let result = load_config(Some(Path::new("/definitely/not/here/azchat.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
