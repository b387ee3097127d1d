//! Server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use zapfleet_runtime::roster::{DEFAULT_COUNTRY_CODE, DEFAULT_PHONE_COLUMN};

/// Configuration for the zapfleet server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `3000`, `0` for auto-assign).
    pub port: u16,
    /// Directory uploaded rosters are stored in.
    pub roster_dir: PathBuf,
    /// Header of the roster column holding phone numbers.
    pub phone_column: String,
    /// Country code prefixed to every roster number.
    pub country_code: String,
    /// Max accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            roster_dir: PathBuf::from("rosters"),
            phone_column: DEFAULT_PHONE_COLUMN.to_owned(),
            country_code: DEFAULT_COUNTRY_CODE.to_owned(),
            max_upload_bytes: 8 * 1024 * 1024, // 8 MB
        }
    }
}
