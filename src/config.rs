//! Configuration management for quizify.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `<local data dir>/quizify/.env`
//! 3. Built-in defaults for everything except the client id and redirect URI

use std::{env, path::PathBuf};

use crate::{QuizError, Result};

pub const DEFAULT_SCOPES: &[&str] = &["user-modify-playback-state", "user-read-playback-state"];
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_STORAGE_PREFIX: &str = "spotify_";
pub const DEFAULT_CONTEXT: &str = "quiz";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `quizify` data directory if needed, then loads the `.env`
/// file inside it when one exists. Variables already present in the process
/// environment are not overridden.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/quizify/.env`
/// - macOS: `~/Library/Application Support/quizify/.env`
/// - Windows: `%LOCALAPPDATA%/quizify/.env`
///
/// # Returns
///
/// `Ok(())` when the file was loaded or does not exist.
///
/// # Errors
///
/// - [`QuizError::Io`] if the directory cannot be created
/// - [`QuizError::Config`] if the `.env` file cannot be read or parsed
///
/// # Example
///
/// ```
/// use quizify::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<()> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| QuizError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Returns the path of the `.env` file read by [`load_env`].
///
/// Falls back to `./quizify/.env` when the platform has no local data
/// directory.
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("quizify/.env");
    path
}

/// OAuth client settings used by the auth flow controller.
///
/// `client_id` and `redirect_uri` must be non-empty; the redirect URI must
/// match the one registered for the app in the Spotify developer dashboard
/// byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorize_url: String,
    pub token_url: String,
}

/// Everything the binary reads from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub auth: AuthConfig,
    pub api_url: String,
    pub server_address: String,
    pub storage_prefix: String,
    pub context: String,
}

impl Settings {
    /// Reads the settings from the process environment.
    ///
    /// Call [`load_env`] first so values from the `.env` file are visible.
    ///
    /// # Returns
    ///
    /// The assembled settings, with defaults for every optional variable.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::Config`] if `QUIZIFY_CLIENT_ID` or
    /// `QUIZIFY_REDIRECT_URI` is missing or empty.
    ///
    /// # Example
    ///
    /// ```
    /// let settings = Settings::from_env()?;
    /// println!("callback server on {}", settings.server_address);
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any variable source.
    ///
    /// Values are trimmed and empty values count as unset. `QUIZIFY_SCOPES`
    /// may be separated by whitespace or commas.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the raw value of a variable name, or `None`
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::Config`] naming the first missing required
    /// variable.
    ///
    /// # Example
    ///
    /// ```
    /// let vars = HashMap::from([
    ///     ("QUIZIFY_CLIENT_ID", "abc123"),
    ///     ("QUIZIFY_REDIRECT_URI", "http://127.0.0.1:8000/callback"),
    /// ]);
    /// let settings = Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string()))?;
    /// assert_eq!(settings.context, "quiz");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| QuizError::Config(format!("{key} must be set")))
        };

        let scopes = match var("QUIZIFY_SCOPES") {
            Some(raw) => raw
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            auth: AuthConfig {
                client_id: required("QUIZIFY_CLIENT_ID")?,
                redirect_uri: required("QUIZIFY_REDIRECT_URI")?,
                scopes,
                authorize_url: var("QUIZIFY_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.into()),
                token_url: var("QUIZIFY_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
            },
            api_url: var("QUIZIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            server_address: var("QUIZIFY_SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.into()),
            storage_prefix: var("QUIZIFY_STORAGE_PREFIX")
                .unwrap_or_else(|| DEFAULT_STORAGE_PREFIX.into()),
            context: var("QUIZIFY_CONTEXT").unwrap_or_else(|| DEFAULT_CONTEXT.into()),
        })
    }
}
