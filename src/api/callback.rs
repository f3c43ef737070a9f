use std::sync::Arc;

use axum::{Extension, extract::RawQuery, response::Html};
use tokio::sync::mpsc;
use url::Url;

use crate::{
    Result,
    spotify::{AuthFlow, RedirectOutcome},
    warning,
};

/// Shared with the `/callback` handler.
#[derive(Clone)]
pub struct CallbackState {
    pub auth: Arc<AuthFlow>,
    /// The redirect URI registered with Spotify; the request query is
    /// grafted onto it to rebuild the URL the browser landed on.
    pub redirect_uri: Url,
    pub outcome: mpsc::Sender<Result<RedirectOutcome>>,
}

pub async fn callback(
    RawQuery(query): RawQuery,
    Extension(state): Extension<CallbackState>,
) -> Html<String> {
    let mut url = state.redirect_uri.clone();
    url.set_query(query.as_deref());

    let result = state.auth.handle_redirect_callback(&mut url).await;
    let page = match &result {
        Ok(RedirectOutcome::NothingToDo) => {
            return Html("<h4>Nothing to do here. Waiting for the Spotify login.</h4>".into());
        }
        Ok(RedirectOutcome::LoggedIn(_)) => {
            "<h2>Authentication successful.</h2><p>Close this browser window.</p>".to_string()
        }
        Err(e) => {
            warning!("Login failed: {}", e);
            format!("<h4>Login failed.</h4><p>{}</p>", escape_html(&e.to_string()))
        }
    };

    if state.outcome.send(result).await.is_err() {
        warning!("Nobody is waiting for the login result anymore.");
    }
    Html(page)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
