//! # API Module
//!
//! HTTP handlers for the short-lived local server that receives the
//! Spotify redirect during `quizify auth login`.
//!
//! - [`callback`] - Hands the redirect URL to the auth flow controller and
//!   reports the outcome to the waiting login command.
//! - [`health`] - Returns status, name and version.

mod callback;
mod health;

pub use callback::CallbackState;
pub use callback::callback;
pub use health::health;
