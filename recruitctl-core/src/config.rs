use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Used when neither the config file nor the environment names a store
pub const DEFAULT_DATABASE_URL: &str = "sqlite://recruiter.db?mode=rwc";

/// Kept low: one bot process, short request-scoped queries
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Store configuration, read from ~/.recruitctl/config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout_secs() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_SECS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    store: Option<StoreConfig>,
}

impl StoreConfig {
    /// Config with an explicit connection string and default pool limits
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Load from the default config path, then apply `DATABASE_URL`.
    ///
    /// A missing file is fine (defaults apply); an unreadable or invalid one
    /// is an error.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                config.database_url = url;
            }
        }
        Ok(config)
    }

    /// Load from a specific file without consulting `DATABASE_URL`
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::from_toml(&content)
    }

    /// Parse a config document (`[store]` table), expanding `${VAR}` in the URL
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| StoreError::config(format!("invalid TOML: {}", e)))?;

        let mut config = file.store.unwrap_or_default();
        config.database_url = expand_string(&config.database_url, &env_vars());

        if config.max_connections == 0 {
            return Err(StoreError::config("store.max_connections must be at least 1"));
        }

        Ok(config)
    }

    /// Config file path: ~/.recruitctl/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".recruitctl/config.toml")
    }

    /// Connection string with any password replaced, for logs and `config show`
    pub fn redacted_url(&self) -> String {
        redact_password(&self.database_url)
    }
}

fn env_vars() -> HashMap<String, String> {
    env::vars().collect()
}

/// Replace ${VAR} references; unknown variables expand to an empty string
fn expand_string(input: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if let Some(value) = vars.get(name) {
                    out.push_str(value);
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated reference: keep it literally
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn redact_password(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let authority_start = scheme_end + 3;
    let authority_end = url[authority_start..]
        .find('/')
        .map(|i| authority_start + i)
        .unwrap_or(url.len());
    let authority = &url[authority_start..authority_end];

    match (authority.rfind('@'), authority.find(':')) {
        (Some(at), Some(colon)) if colon < at => format!(
            "{}{}:***{}",
            &url[..authority_start],
            &authority[..colon],
            &url[authority_start + at..]
        ),
        _ => url.to_string(),
    }
}
