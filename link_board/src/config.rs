//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration for the client.

use std::path::PathBuf;

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend
    pub server_url: String,
    /// Base URL of the application itself
    pub app_url: String,
    /// External sign-in destination, used by logout's hard navigation
    pub login_url: String,
    /// Directory holding locally cached state (user record, credential)
    pub state_dir: PathBuf,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A URL variable does not look like an http(s) URL
    #[error("Invalid URL in {var}: '{value}' (must start with http:// or https://)")]
    InvalidUrl { var: String, value: String },
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `server_url_override` - Optional server URL override (from CLI args)
    /// * `state_dir_override` - Optional state directory override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns an error if a URL variable is present but not http(s).
    pub fn from_env(
        server_url_override: Option<String>,
        state_dir_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let server_url = server_url_override
            .or_else(|| std::env::var("LINK_BOARD_SERVER_URL").ok())
            .unwrap_or_else(|| "http://localhost:12000".to_string());
        validate_url("LINK_BOARD_SERVER_URL", &server_url)?;

        let app_url = std::env::var("LINK_BOARD_APP_URL")
            .unwrap_or_else(|_| "http://localhost:12001".to_string());
        validate_url("LINK_BOARD_APP_URL", &app_url)?;

        let login_url = std::env::var("LINK_BOARD_LOGIN_URL")
            .unwrap_or_else(|_| format!("{}/sign-in", app_url.trim_end_matches('/')));
        validate_url("LINK_BOARD_LOGIN_URL", &login_url)?;

        let state_dir = state_dir_override
            .or_else(|| std::env::var_os("LINK_BOARD_STATE_DIR").map(PathBuf::from))
            .unwrap_or_else(default_state_dir);

        Ok(Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            app_url,
            login_url,
            state_dir,
        })
    }
}

fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".link_board")
}

fn validate_url(var: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            var: var.to_string(),
            value: value.to_string(),
        })
    }
}
