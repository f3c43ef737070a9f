use std::sync::Arc;

use reqwest::{Client, Response};
use tracing::{debug, warn};
use url::Url;

use crate::{
    QuizError, Result,
    config::AuthConfig,
    management::{PkceSessionStore, TokenStore},
    types::{PkceSession, TokenResponse},
    utils, warning,
};

pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Where the flow stands, as derived from the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    AwaitingRedirect,
    LoggedIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The URL carried no `code` and no `error`.
    NothingToDo,
    /// The code was exchanged and this token is now stored.
    LoggedIn(String),
}

/// Sends the user agent to the authorization page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &Url) -> Result<()>;
}

/// Opens the system browser, falling back to printing the URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &Url) -> Result<()> {
        if webbrowser::open(url.as_str()).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                url
            );
        }
        Ok(())
    }
}

/// OAuth 2.0 authorization-code flow with PKCE.
///
/// `LoggedOut -> AwaitingRedirect` on [`AuthFlow::start_auth`], then
/// `AwaitingRedirect -> LoggedIn` on a successful
/// [`AuthFlow::handle_redirect_callback`]. Every failed transition surfaces
/// as a [`QuizError`]. The PKCE session is single use: it is cleared after
/// every exchange attempt and whenever the redirect is rejected.
pub struct AuthFlow {
    config: AuthConfig,
    tokens: Arc<TokenStore>,
    session: PkceSessionStore,
    navigator: Arc<dyn Navigator>,
    http: Client,
}

impl AuthFlow {
    /// Creates the controller with a default HTTP client.
    ///
    /// # Arguments
    ///
    /// * `config` - Client id, redirect URI, scopes and endpoint URLs
    /// * `tokens` - Durable token store shared with the API client
    /// * `session` - Process-scoped PKCE session store
    /// * `navigator` - Opens the authorization page
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::Config`] if the client id or redirect URI is empty.
    pub fn new(
        config: AuthConfig,
        tokens: Arc<TokenStore>,
        session: PkceSessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        Self::with_http_client(config, tokens, session, navigator, Client::new())
    }

    /// Like [`AuthFlow::new`] with a caller-provided `reqwest` client.
    pub fn with_http_client(
        config: AuthConfig,
        tokens: Arc<TokenStore>,
        session: PkceSessionStore,
        navigator: Arc<dyn Navigator>,
        http: Client,
    ) -> Result<Self> {
        if config.client_id.is_empty() {
            return Err(QuizError::Config("clientId is required".into()));
        }
        if config.redirect_uri.is_empty() {
            return Err(QuizError::Config("redirectUri is required".into()));
        }
        Ok(Self {
            config,
            tokens,
            session,
            navigator,
            http,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn get_access_token(&self) -> Result<Option<String>> {
        self.tokens.get_access_token().await
    }

    /// Derives the flow state from the stores.
    ///
    /// A valid token wins over a pending PKCE session.
    pub async fn status(&self) -> Result<AuthState> {
        if self.tokens.get_access_token().await?.is_some() {
            Ok(AuthState::LoggedIn)
        } else if self.session.exists().await? {
            Ok(AuthState::AwaitingRedirect)
        } else {
            Ok(AuthState::LoggedOut)
        }
    }

    /// Creates a fresh PKCE session and navigates to the authorization page.
    ///
    /// A new verifier and state replace any session left over from an
    /// earlier attempt. No request is sent to Spotify here.
    ///
    /// # Returns
    ///
    /// The authorization URL that was handed to the navigator.
    ///
    /// # Errors
    ///
    /// - [`QuizError::Url`] if the configured authorize URL is invalid
    /// - Storage errors while saving the session
    ///
    /// # Example
    ///
    /// ```
    /// let url = auth.start_auth().await?;
    /// info!("If no browser opened, visit {}", url);
    /// ```
    pub async fn start_auth(&self) -> Result<Url> {
        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::create_code_challenge(&code_verifier);
        let state = utils::generate_state();

        let auth_url = self.authorize_url(&code_challenge, &state)?;

        self.session
            .save(&PkceSession {
                code_verifier,
                state,
            })
            .await?;

        debug!("navigating to the authorization page");
        self.navigator.navigate(&auth_url)?;
        Ok(auth_url)
    }

    /// Builds the authorization URL for a challenge and state.
    ///
    /// # Arguments
    ///
    /// * `code_challenge` - base64url SHA-256 of the verifier
    /// * `state` - Anti-CSRF value echoed back on the redirect
    pub fn authorize_url(&self, code_challenge: &str, state: &str) -> Result<Url> {
        let scope = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", code_challenge),
                ("state", state),
            ],
        )?;
        Ok(url)
    }

    /// Inspects the URL the provider redirected to.
    ///
    /// OAuth parameters are removed from `url` in place before anything is
    /// validated or exchanged, so reloading the cleaned URL can never replay
    /// a code.
    ///
    /// # Arguments
    ///
    /// * `url` - The full redirect URL; `code`, `state` and `error` are
    ///   stripped from it, other parameters are kept
    ///
    /// # Returns
    ///
    /// - [`RedirectOutcome::NothingToDo`] if the URL carries no `code`
    /// - [`RedirectOutcome::LoggedIn`] with the new access token
    ///
    /// # Errors
    ///
    /// - [`QuizError::AuthorizationDenied`] for an `error` parameter
    /// - [`QuizError::MissingPkceSession`] if no login was started
    /// - [`QuizError::StateMismatch`] if `state` differs; nothing is sent
    /// - [`QuizError::TokenExchangeFailed`] / [`QuizError::MalformedTokenResponse`]
    ///   from the token endpoint
    ///
    /// # Example
    ///
    /// ```
    /// let mut url = Url::parse("http://127.0.0.1:8000/callback?code=AQB&state=xyz")?;
    /// match auth.handle_redirect_callback(&mut url).await? {
    ///     RedirectOutcome::LoggedIn(_) => success!("Logged in"),
    ///     RedirectOutcome::NothingToDo => {}
    /// }
    /// assert_eq!(url.as_str(), "http://127.0.0.1:8000/callback");
    /// ```
    pub async fn handle_redirect_callback(&self, url: &mut Url) -> Result<RedirectOutcome> {
        if let Some(error) = utils::query_param(url, "error") {
            utils::strip_query_params(url, &["error"]);
            self.session.clear().await?;
            return Err(QuizError::AuthorizationDenied(error));
        }

        let Some(code) = utils::query_param(url, "code") else {
            return Ok(RedirectOutcome::NothingToDo);
        };
        let returned_state = utils::query_param(url, "state");
        utils::strip_query_params(url, &["code", "state"]);

        let Some(session) = self.session.load().await? else {
            self.session.clear().await?;
            return Err(QuizError::MissingPkceSession);
        };

        if returned_state.as_deref() != Some(session.state.as_str()) {
            warn!("redirect state does not match the stored PKCE state");
            self.session.clear().await?;
            return Err(QuizError::StateMismatch);
        }

        let exchanged = self.exchange_code(&code, &session.code_verifier).await;
        self.session.clear().await?;
        let token = exchanged?;

        Ok(RedirectOutcome::LoggedIn(token))
    }

    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<String> {
        let res = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code_verifier", verifier),
            ])
            .send()
            .await?;

        self.store_grant(res).await
    }

    /// Trades the stored refresh token for a new access token.
    ///
    /// A rotated refresh token in the response replaces the stored one.
    ///
    /// # Returns
    ///
    /// The new access token, already persisted.
    ///
    /// # Errors
    ///
    /// - [`QuizError::Unauthenticated`] if no refresh token is stored
    /// - [`QuizError::TokenExchangeFailed`] if Spotify rejects the grant
    pub async fn refresh(&self) -> Result<String> {
        let Some(refresh_token) = self.tokens.refresh_token().await? else {
            return Err(QuizError::Unauthenticated);
        };

        let res = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.config.client_id.as_str()),
            ])
            .send()
            .await?;

        self.store_grant(res).await
    }

    /// Forgets the access token, its expiry and the refresh token.
    pub async fn logout(&self) -> Result<()> {
        self.tokens.clear().await
    }

    async fn store_grant(&self, res: Response) -> Result<String> {
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(QuizError::TokenExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let grant: TokenResponse =
            serde_json::from_str(&body).map_err(|_| QuizError::MalformedTokenResponse)?;
        let access_token = grant
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(QuizError::MalformedTokenResponse)?;

        let expires_in = grant
            .expires_in
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        self.tokens.store_token(&access_token, expires_in).await?;
        if let Some(refresh_token) = grant.refresh_token.filter(|t| !t.is_empty()) {
            self.tokens.store_refresh_token(&refresh_token).await?;
        }

        debug!(expires_in, "token grant stored");
        Ok(access_token)
    }
}
