use std::time::Duration;

use chrono::{Local, TimeZone};
use tokio::sync::mpsc;
use url::Url;

use crate::{
    api::CallbackState,
    cli::App,
    error, info,
    server::start_api_server,
    spotify::{AuthState, RedirectOutcome, user},
    success, warning,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the PKCE login: serves the redirect URI locally, opens the
/// authorization page and waits for the redirect to come back.
pub async fn login(app: &App) {
    let redirect_uri = match Url::parse(&app.settings.auth.redirect_uri) {
        Ok(url) => url,
        Err(e) => error!("Invalid redirect URI: {}", e),
    };

    let (tx, mut rx) = mpsc::channel(1);
    let state = CallbackState {
        auth: app.auth.clone(),
        redirect_uri,
        outcome: tx,
    };

    let addr = app.settings.server_address.clone();
    let server = tokio::spawn(async move { start_api_server(&addr, state).await });

    if let Err(e) = app.auth.start_auth().await {
        server.abort();
        error!("Cannot start login: {}", e);
    }
    info!("Waiting for the Spotify login to complete in your browser...");

    let outcome = tokio::select! {
        res = tokio::time::timeout(LOGIN_TIMEOUT, rx.recv()) => res,
        joined = server => {
            match joined {
                Ok(Err(e)) => error!("Callback server stopped: {}", e),
                _ => error!("Callback server stopped unexpectedly."),
            }
        }
    };

    match outcome {
        Ok(Some(Ok(RedirectOutcome::LoggedIn(_)))) => {
            success!("Authentication successful!");
            match user::get_current_user(&app.api).await {
                Ok(profile) => info!(
                    "Logged in as {}",
                    profile.display_name.unwrap_or(profile.id)
                ),
                Err(e) => warning!("Logged in, but fetching the profile failed: {}", e),
            }
        }
        Ok(Some(Ok(RedirectOutcome::NothingToDo))) | Ok(None) => {
            error!("Authentication failed or timed out.")
        }
        Ok(Some(Err(e))) => error!("Authentication error: {}", e),
        Err(_) => error!("Authentication timed out."),
    }
}

pub async fn status(app: &App) {
    match app.auth.status().await {
        Ok(AuthState::LoggedIn) => {
            let expires = match app.auth.tokens().current().await {
                Ok(Some(token)) => Local
                    .timestamp_millis_opt(token.expires_at)
                    .single()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
                _ => None,
            };
            success!(
                "Logged in (token expires {})",
                expires.unwrap_or_else(|| "at an unknown time".into())
            );
            match user::get_current_user(&app.api).await {
                Ok(profile) => info!(
                    "Logged in as {}",
                    profile.display_name.unwrap_or(profile.id)
                ),
                Err(e) => warning!("Could not fetch user data: {}", e),
            }
        }
        Ok(AuthState::AwaitingRedirect) => info!("Waiting for the Spotify redirect."),
        Ok(AuthState::LoggedOut) => match app.auth.tokens().refresh_token().await {
            Ok(Some(_)) => warning!("Not logged in. Run `quizify auth refresh` to renew the session."),
            _ => warning!("Not logged in. Run `quizify auth login`."),
        },
        Err(e) => error!("Authentication error: {}", e),
    }
}

pub async fn refresh(app: &App) {
    match app.auth.refresh().await {
        Ok(_) => success!("Access token refreshed."),
        Err(e) => error!("Cannot refresh the access token: {}", e),
    }
}

pub async fn logout(app: &App) {
    match app.auth.logout().await {
        Ok(()) => success!("Logged out."),
        Err(e) => error!("Cannot log out: {}", e),
    }
}
