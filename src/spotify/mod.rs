//! # Spotify Integration Module
//!
//! The authorization flow and the Web API client, plus thin endpoint
//! wrappers. Everything that talks to Spotify goes through here:
//!
//! ```text
//! CLI / quiz controllers
//!          ↓
//!     ├── auth    (OAuth 2.0 PKCE: start, redirect, exchange, refresh)
//!     ├── client  (bearer-authenticated requests, status mapping)
//!     ├── player  (devices, play, pause)
//!     ├── tracks  (track metadata)
//!     └── user    (profile)
//!          ↓
//! reqwest → accounts.spotify.com / api.spotify.com
//! ```
//!
//! ## API Coverage
//!
//! - `GET /me`
//! - `GET /me/player/devices`
//! - `PUT /me/player/play` with `{"uris": [uri], "position_ms": start}`
//! - `PUT /me/player/pause`
//! - `GET /tracks/{id}`
//! - `POST /api/token` (authorization code and refresh token grants)

pub mod auth;
pub mod client;
pub mod player;
pub mod tracks;
pub mod user;

pub use auth::{AuthFlow, AuthState, BrowserNavigator, Navigator, RedirectOutcome};
pub use client::ApiClient;
