use std::sync::Arc;

use tracing::debug;

use crate::{
    QuizError, Result,
    management::TrackListStore,
    spotify::{ApiClient, tracks},
    types::Track,
};

/// Intent methods for the list builder view.
pub struct BuilderController {
    api: Arc<ApiClient>,
    lists: Arc<TrackListStore>,
    context: String,
    current: Option<String>,
}

impl BuilderController {
    pub fn new(api: Arc<ApiClient>, lists: Arc<TrackListStore>, context: impl Into<String>) -> Self {
        Self {
            api,
            lists,
            context: context.into(),
            current: None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Picks up the list this context had selected last time.
    pub async fn restore(&mut self) -> Result<Option<String>> {
        self.current = self.lists.load_selection(&self.context).await?;
        Ok(self.current.clone())
    }

    /// Creates an empty list and selects it. Existing names are refused.
    pub async fn create_list(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuizError::MissingListName);
        }
        if self.lists.list_names().await?.iter().any(|n| n == name) {
            return Err(QuizError::ListAlreadyExists(name.to_string()));
        }

        self.lists.save_list(name, &[]).await?;
        self.select_unchecked(name).await
    }

    pub async fn select(&mut self, name: &str) -> Result<Vec<Track>> {
        let tracks = self
            .lists
            .load_list(name)
            .await?
            .ok_or_else(|| QuizError::ListNotFound(name.to_string()))?;
        self.select_unchecked(name).await?;
        Ok(tracks)
    }

    /// Targets `name` for this controller only; the stored selection is
    /// left untouched.
    pub async fn open(&mut self, name: &str) -> Result<Vec<Track>> {
        let tracks = self
            .lists
            .load_list(name)
            .await?
            .ok_or_else(|| QuizError::ListNotFound(name.to_string()))?;
        self.current = Some(name.to_string());
        Ok(tracks)
    }

    /// Appends to the selected list and persists it. Returns the new length.
    ///
    /// An unnamed track gets its title from the catalog when possible.
    pub async fn add_track(&self, mut track: Track) -> Result<usize> {
        let name = self.current.as_deref().ok_or(QuizError::NoListSelected)?;
        let mut list = self.lists.load_list(name).await?.unwrap_or_default();

        if track.name.is_none() {
            if let Some(id) = track.spotify_id().map(str::to_string) {
                match tracks::get_track(&self.api, &id).await {
                    Ok(details) => track.name = Some(details.name),
                    Err(e) => debug!("no catalog name for {}: {}", id, e),
                }
            }
        }

        list.push(track);
        self.lists.save_list(name, &list).await?;
        Ok(list.len())
    }

    /// Overwrites the selected list.
    pub async fn save(&self, tracks: &[Track]) -> Result<()> {
        let name = self.current.as_deref().ok_or(QuizError::NoListSelected)?;
        self.lists.save_list(name, tracks).await
    }

    async fn select_unchecked(&mut self, name: &str) -> Result<()> {
        self.lists.save_selection(&self.context, Some(name)).await?;
        self.current = Some(name.to_string());
        Ok(())
    }
}
