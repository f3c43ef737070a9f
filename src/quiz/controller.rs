use std::{sync::Arc, time::Duration};

use tracing::warn;

use crate::{
    QuizError, Result,
    management::TrackListStore,
    spotify::{ApiClient, player, tracks},
    types::{Reveal, Track},
};

/// Intent methods for the quiz view: pick a list, play clips, reveal answers.
pub struct QuizController {
    api: Arc<ApiClient>,
    lists: Arc<TrackListStore>,
    context: String,
}

impl QuizController {
    pub fn new(api: Arc<ApiClient>, lists: Arc<TrackListStore>, context: impl Into<String>) -> Self {
        Self {
            api,
            lists,
            context: context.into(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// The selected list for this context with its tracks.
    pub async fn load_selected(&self) -> Result<Option<(String, Vec<Track>)>> {
        let Some(name) = self.lists.load_selection(&self.context).await? else {
            return Ok(None);
        };
        Ok(self
            .lists
            .load_list(&name)
            .await?
            .map(|tracks| (name, tracks)))
    }

    pub async fn select(&self, name: &str) -> Result<Vec<Track>> {
        let tracks = self
            .lists
            .load_list(name)
            .await?
            .ok_or_else(|| QuizError::ListNotFound(name.to_string()))?;
        self.lists.save_selection(&self.context, Some(name)).await?;
        Ok(tracks)
    }

    /// Plays the clip, waits its duration, then pauses.
    ///
    /// A failed pause is only logged: the clip already played.
    pub async fn on_play_requested(&self, track: &Track) -> Result<()> {
        let uri = track
            .playback_uri()
            .ok_or_else(|| QuizError::InvalidTrackUri(track.display_name().to_string()))?;

        player::start_playback(&self.api, &uri, track.start_ms()).await?;
        tokio::time::sleep(Duration::from_millis(track.clip_duration_ms())).await;

        if let Err(e) = player::pause_playback(&self.api).await {
            warn!("Pause error: {}", e);
        }
        Ok(())
    }

    /// Reveals artist and title, caching them on `track` so the next reveal
    /// needs no request.
    pub async fn on_confirm_requested(&self, track: &mut Track) -> Result<Reveal> {
        if let Some(reveal) = track.reveal() {
            return Ok(reveal);
        }

        let id = track
            .spotify_id()
            .ok_or_else(|| {
                QuizError::InvalidTrackUri(track.uri.clone().unwrap_or_default())
            })?
            .to_string();
        let details = tracks::get_track(&self.api, &id).await?;

        let artist = details
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let reveal = Reveal {
            artist: if artist.is_empty() {
                "Unknown artist".to_string()
            } else {
                artist
            },
            title: if details.name.is_empty() {
                "Unknown title".to_string()
            } else {
                details.name
            },
        };

        track.artist_name = Some(reveal.artist.clone());
        track.track_title = Some(reveal.title.clone());
        Ok(reveal)
    }
}
