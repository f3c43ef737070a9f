//! Error taxonomy shared by the auth flow, the API client and the stores.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Spotify login error: {0}")]
    AuthorizationDenied(String),
    #[error("Missing PKCE state/verifier in session storage")]
    MissingPkceSession,
    #[error("State mismatch, possible CSRF")]
    StateMismatch,
    #[error("Token error {status}: {body}")]
    TokenExchangeFailed { status: u16, body: String },
    #[error("No access_token returned from the token endpoint")]
    MalformedTokenResponse,
    #[error("No Spotify access token. Log in first")]
    Unauthenticated,
    #[error("Spotify API error {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("Failed to fetch track list from URL: {status}")]
    ImportFetchFailed { status: u16 },
    #[error("Stored value under {0} is malformed")]
    MalformedStoredData(String),
    #[error("Track list is not valid: {0}")]
    MalformedTrackList(String),
    #[error("Track list name is required")]
    MissingListName,
    #[error("Playlist \"{0}\" already exists")]
    ListAlreadyExists(String),
    #[error("Playlist \"{0}\" not found")]
    ListNotFound(String),
    #[error("No playlist selected")]
    NoListSelected,
    #[error("Invalid track URI: {0}")]
    InvalidTrackUri(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl QuizError {
    /// Spotify answers playback commands with 404 `NO_ACTIVE_DEVICE` when no
    /// player is open for the account.
    pub fn is_no_active_device(&self) -> bool {
        match self {
            QuizError::ApiError { status, body } => {
                *status == StatusCode::NOT_FOUND.as_u16() || body.contains("NO_ACTIVE_DEVICE")
            }
            _ => false,
        }
    }

    /// Errors that mean "log in (again)" to the user.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            QuizError::Unauthenticated
                | QuizError::AuthorizationDenied(_)
                | QuizError::MissingPkceSession
                | QuizError::StateMismatch
                | QuizError::TokenExchangeFailed { .. }
                | QuizError::MalformedTokenResponse
        ) || matches!(self, QuizError::ApiError { status, .. } if *status == StatusCode::UNAUTHORIZED.as_u16())
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
