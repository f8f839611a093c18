use std::path::{Path, PathBuf};

use config::{Config, File};
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;

/// Tunables read from the optional settings file.
/// Every key can be omitted, in which case the default value is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// User agent sent by the direct fetcher
    pub user_agent: String,

    /// Upper bound for a whole direct fetch, body included
    pub http_timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Passed to the downloader program as `--socket-timeout`
    pub ytdl_socket_timeout_secs: u64,

    /// Directory of the run log files
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
            http_timeout_secs: 60,
            connect_timeout_secs: 10,
            ytdl_socket_timeout_secs: 30,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Settings {
    /// Read the settings file if it exists, or use the defaults
    pub fn load(path: &Path) -> Result<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not read settings file {}", path.display()))?
            .try_deserialize()
            .into_diagnostic()
            .wrap_err("Invalid settings")
    }
}
