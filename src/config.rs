use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Upper bound on the number of projects and skills each search returns.
    #[serde(default = "default_search_cap")]
    pub search_cap: i64,
    /// Requests per minute allowed on `GET /profile`. Absent disables limiting.
    #[serde(default)]
    pub profile_rate_limit_per_minute: Option<u32>,
}

fn default_search_cap() -> i64 {
    50
}

/// Admin credentials for the write endpoint.
///
/// The `ME_API_ADMIN_USERNAME` / `ME_API_ADMIN_PASSWORD` environment
/// variables override whatever the config file says, so deployments never
/// need secrets on disk.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: default_admin_password(),
        }
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}
fn default_admin_password() -> String {
    "secret".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if let Ok(username) = std::env::var("ME_API_ADMIN_USERNAME") {
        config.auth.username = username;
    }
    if let Ok(password) = std::env::var("ME_API_ADMIN_PASSWORD") {
        config.auth.password = password;
    }

    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.server.search_cap < 1 {
        anyhow::bail!("server.search_cap must be >= 1");
    }

    if let Some(limit) = config.server.profile_rate_limit_per_minute {
        if limit == 0 {
            anyhow::bail!("server.profile_rate_limit_per_minute must be > 0 when set");
        }
    }

    if config.auth.username.is_empty() || config.auth.password.is_empty() {
        anyhow::bail!("auth.username and auth.password must not be empty");
    }

    Ok(config)
}
