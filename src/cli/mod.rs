//! # CLI Module
//!
//! User-facing commands. Each command builds what it needs from [`App`],
//! prints through the status macros and exits non-zero on failure.
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Quiz / Builder controllers
//!     ↓
//! Auth flow, API client, track-list store
//!     ↓
//! Storage (file, memory) and HTTP
//! ```
//!
//! ## Usage Patterns
//!
//! ```bash
//! quizify auth login                           # PKCE login in the browser
//! quizify lists import party --url https://example.org/party.json
//! quizify lists select party                   # remember it for the quiz
//! quizify quiz play 3                          # play clip #3 of the selection
//! quizify quiz reveal 3                        # show artist and title
//! ```

mod auth;
mod devices;
mod lists;
mod quiz;

pub use auth::{login, logout, refresh, status};
pub use devices::{devices, watch_devices};
pub use lists::{
    create_list, delete_list, export_list, import_list, list_lists, select_list, show_list,
};
pub use quiz::{add_track, play, reveal};

use std::sync::Arc;

use crate::{
    Result,
    config::Settings,
    management::{PkceSessionStore, SystemClock, TokenStore, TrackListStore},
    quiz::{BuilderController, QuizController},
    spotify::{ApiClient, AuthFlow, BrowserNavigator},
    storage::{FileStorage, MemoryStorage, Storage},
};

/// Everything a command may need, constructed once per process.
pub struct App {
    pub settings: Settings,
    pub auth: Arc<AuthFlow>,
    pub api: Arc<ApiClient>,
    pub lists: Arc<TrackListStore>,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self> {
        let durable: Arc<dyn Storage> = Arc::new(FileStorage::default_location());
        let session: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

        let tokens = Arc::new(TokenStore::new(
            Arc::clone(&durable),
            Arc::new(SystemClock),
            settings.storage_prefix.clone(),
        ));
        let auth = Arc::new(AuthFlow::new(
            settings.auth.clone(),
            Arc::clone(&tokens),
            PkceSessionStore::new(session, settings.storage_prefix.clone()),
            Arc::new(BrowserNavigator),
        )?);
        let api = Arc::new(ApiClient::new(settings.api_url.clone(), tokens));
        let lists = Arc::new(TrackListStore::new(durable));

        Ok(Self {
            settings,
            auth,
            api,
            lists,
        })
    }

    pub fn quiz(&self) -> QuizController {
        QuizController::new(
            Arc::clone(&self.api),
            Arc::clone(&self.lists),
            self.settings.context.clone(),
        )
    }

    pub fn builder(&self) -> BuilderController {
        BuilderController::new(
            Arc::clone(&self.api),
            Arc::clone(&self.lists),
            self.settings.context.clone(),
        )
    }
}
