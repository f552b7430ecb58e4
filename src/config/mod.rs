//! Configuration Management
//!
//! This module resolves the PostgreSQL connection settings.
//!
//! # Sources
//! 1. Process environment (highest priority, never overwritten)
//! 2. Dotenv file: `--env-file <PATH>` if given, otherwise `./.env`
//! 3. Fallback dotenv file: `~/.config/staffdesk/.env`
//!
//! # Variables
//! - `DB_USER`, `DB_PASSWORD`, `DB_NAME` (required)
//! - `DB_HOST` (default `localhost`), `DB_PORT` (default `5432`)

use std::fmt;
use std::path::{Path, PathBuf};

use tokio_postgres::Config;

use crate::error::{Result, StaffdeskError};

/// Default database host
pub const DEFAULT_HOST: &str = "localhost";

/// Default PostgreSQL port
pub const DEFAULT_PORT: u16 = 5432;

pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_NAME: &str = "DB_NAME";
pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";

/// Connection parameters for the PostgreSQL server
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// WARNING: Sensitive data, do not log or include in error messages
    pub password: String,
    pub database: String,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl ConnectionSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                StaffdeskError::config_error(format!(
                    "Environment variable {key} is not set (add it to .env or export it)"
                ))
            })
        };

        let user = require(ENV_USER)?;
        let password = require(ENV_PASSWORD)?;
        let database = require(ENV_NAME)?;
        let host = get(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(ENV_PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                StaffdeskError::config_error(format!("{ENV_PORT} must be a port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self { host, port, user, password, database })
    }

    /// Build the driver configuration
    #[must_use]
    pub fn to_pg_config(&self) -> Config {
        let mut pg_config = Config::new();
        pg_config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.database);
        pg_config
    }
}

/// Get path to the per-user fallback env file (`~/.config/staffdesk/.env`)
pub fn user_env_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("staffdesk").join(".env"))
}

/// Load dotenv variables into the process environment
///
/// An explicit path must exist. Without one, `.env` in the working directory
/// is tried first (parent directories are not searched) and the per-user file
/// second; finding neither is fine.
/// Returns the file that was loaded, if any.
pub fn load_env_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let working_dir = std::env::current_dir().map_err(|e| {
        StaffdeskError::config_error(format!("Could not read the working directory: {e}"))
    })?;
    load_env_from(explicit, &working_dir, user_env_path())
}

fn load_env_from(
    explicit: Option<&Path>,
    working_dir: &Path,
    user_file: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        read_env_file(path)?;
        return Ok(Some(path.to_path_buf()));
    }

    let found = [Some(working_dir.join(".env")), user_file]
        .into_iter()
        .flatten()
        .find(|path| path.is_file());

    match found {
        Some(path) => {
            read_env_file(&path)?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

fn read_env_file(path: &Path) -> Result<()> {
    dotenvy::from_path(path).map_err(|e| {
        StaffdeskError::config_error(format!("Could not load env file {}: {e}", path.display()))
    })
}
