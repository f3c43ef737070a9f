use std::{net::SocketAddr, str::FromStr};

use axum::{Extension, Router, routing::get};

use crate::{
    QuizError, Result,
    api::{self, CallbackState},
};

pub fn router(state: CallbackState) -> Router {
    let callback_path = match state.redirect_uri.path() {
        "" => "/",
        path => path,
    }
    .to_string();

    Router::new()
        .route("/health", get(api::health))
        .route(&callback_path, get(api::callback).layer(Extension(state)))
}

/// Serves the callback router on `addr` until the task is dropped.
pub async fn start_api_server(addr: &str, state: CallbackState) -> Result<()> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| QuizError::Config(format!("invalid server address {addr}: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
