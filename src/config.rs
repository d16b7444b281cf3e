use std::{
    collections::HashMap,
    env,
    fs::{create_dir_all, read_to_string, File},
    path::Path,
    time::Duration,
};

use anyhow::Context;
use home::home_dir;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::gql_queries::vocabulary::MAX_PAGE_SIZE;

const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";
const ENV_SECRET_PREFIX: &str = "env:";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_host")]
    pub default_host: String,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default = "default_page_size_ceiling")]
    pub page_size_ceiling: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Token per host, either literal or `env:VAR_NAME`.
    #[serde(default)]
    pub github_tokens: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_host: default_host(),
            page_size: default_page_size(),
            page_size_ceiling: default_page_size_ceiling(),
            timeout_secs: default_timeout_secs(),
            github_tokens: HashMap::new(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Bearer token for `host`: the configured entry, otherwise `GITHUB_TOKEN`.
    pub fn github_token(&self, host: &str) -> Result<String, Error> {
        if let Some(raw) = self.github_tokens.get(host) {
            return resolve_secret(raw);
        }
        match env::var(TOKEN_ENV_VAR) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(Error::Authentication(format!(
                "no GitHub token configured for host '{host}'. \
                 Add it to github_tokens in your config file or set {TOKEN_ENV_VAR}."
            ))),
        }
    }
}

fn default_host() -> String {
    "github.com".to_string()
}

fn default_page_size() -> i64 {
    i64::from(MAX_PAGE_SIZE)
}

fn default_page_size_ceiling() -> u32 {
    MAX_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    30
}

/// Resolves `env:NAME` to the value of `NAME`; anything else is taken as is.
pub fn resolve_secret(raw: &str) -> Result<String, Error> {
    let secret = match raw.strip_prefix(ENV_SECRET_PREFIX) {
        Some(var_name) => env::var(var_name).map_err(|_| {
            Error::Authentication(format!("environment variable '{var_name}' is not set"))
        })?,
        None => raw.to_string(),
    };
    if secret.trim().is_empty() {
        return Err(Error::Authentication("configured token is empty".to_string()));
    }
    Ok(secret)
}

pub fn load_config(config_file: &Path) -> anyhow::Result<Config> {
    let config_str = read_to_string(config_file)
        .with_context(|| format!("Failed to read config file {}", config_file.display()))?;
    let config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file {}", config_file.display()))?;
    Ok(config)
}

pub fn get_config() -> anyhow::Result<Config> {
    let mut config_buf = home_dir().ok_or(anyhow::anyhow!("Can't determine home dir"))?;
    config_buf.push(".config/ghactivity/");
    let config_dir = config_buf.as_path();
    if !config_dir.exists() {
        create_dir_all(config_dir)?;
    }
    config_buf.push("config.toml");
    let config_file = config_buf.as_path();
    if !config_file.exists() {
        File::create(config_file)?;
    }
    load_config(config_file)
}
