//! Database connection settings read from `config.json`.
//!
//! ```json
//! {
//!   "database": {
//!     "host": "localhost",
//!     "database": "warehouse",
//!     "user": "loader",
//!     "password": "secret",
//!     "port": 5432
//!   }
//! }
//! ```
//!
//! `dbname` is accepted as an alias for `database`.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "config.json";

/// Default PostgreSQL port.
pub const DEFAULT_PORT: u16 = 5432;

/// Top-level layout of `config.json`. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
}

/// Connection parameters for the target database.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(alias = "database")]
    pub dbname: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password_set", &self.password.is_some())
            .field("port", &self.port)
            .finish()
    }
}

impl AppConfig {
    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
