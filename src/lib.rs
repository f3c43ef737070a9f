//! Quizify library
//!
//! Building blocks for a music quiz that plays short Spotify clips from
//! locally stored track lists. The library covers the OAuth 2.0 PKCE login,
//! token lifecycle, the bearer-authenticated Web API client and the named
//! track-list store. The `quizify` binary wires them into a CLI.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration from environment variables and `.env`
//! - `error` - Error taxonomy
//! - `management` - Token, PKCE session and track-list stores
//! - `quiz` - Quiz and builder controllers, device status polling
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Auth flow controller and Spotify Web API client
//! - `storage` - Key-value storage backends (durable file, in-memory)
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers and URL utilities

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod quiz;
pub mod server;
pub mod spotify;
pub mod storage;
pub mod types;
pub mod utils;

pub use error::{QuizError, Result};

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Waiting for the Spotify redirect...");
/// info!("Found {} playlist(s)", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the CLI layer uses this; library code returns [`QuizError`] instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
