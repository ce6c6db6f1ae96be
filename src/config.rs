//! Runtime settings
//!
//! Combines CLI arguments with the XDG project directories:
//! the recipe snapshot lives in `~/.cache/foody/`, preferences in
//! `~/.config/foody/`, and the log file next to the cache.

use std::path::PathBuf;

use directories::ProjectDirs;
use reqwest::Url;

use crate::cli::Cli;
use crate::network::MonitorConfig;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "foody";

/// Log file name
pub const LOG_FILE: &str = "foody.log";

/// Settings the application is wired from
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key appended to every search request (empty if none was given)
    pub api_key: String,
    /// Base URL of the recipe API
    pub api_url: String,
    /// Connectivity monitor settings
    pub monitor: MonitorConfig,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        let monitor = MonitorConfig {
            probe_addr: probe_addr(&cli.api_url)
                .unwrap_or_else(|| MonitorConfig::default().probe_addr),
            enabled: !cli.no_monitor,
            ..MonitorConfig::default()
        };

        Self {
            api_key: cli.api_key.clone().unwrap_or_default(),
            api_url: cli.api_url.clone(),
            monitor,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Derives the `host:port` to probe for connectivity from the API URL
pub fn probe_addr(api_url: &str) -> Option<String> {
    let url = Url::parse(api_url).ok()?;
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}", host, port))
}

/// Directory for the log file, if a home directory is available
pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.cache_dir().to_path_buf())
}
