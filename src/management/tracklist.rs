use std::{path::Path, sync::Arc};

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{QuizError, Result, storage::Storage, types::Track};

pub const TRACKLIST_PREFIX: &str = "tracklist:";
pub const SELECTION_PREFIX: &str = "selected_tracklist:";

/// Named track lists and the per-context "selected list" pointers.
///
/// Saving is always create-or-overwrite. Refusing duplicate names is left to
/// callers, who check [`TrackListStore::list_names`] first.
pub struct TrackListStore {
    storage: Arc<dyn Storage>,
    http: Client,
}

impl TrackListStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_http_client(storage, Client::new())
    }

    pub fn with_http_client(storage: Arc<dyn Storage>, http: Client) -> Self {
        Self { storage, http }
    }

    pub async fn save_list(&self, name: &str, tracks: &[Track]) -> Result<()> {
        let key = list_key(name)?;
        let json = serde_json::to_string(tracks)?;
        self.storage.set(&key, &json).await?;
        debug!(name, tracks = tracks.len(), "saved track list");
        Ok(())
    }

    /// Saves arbitrary JSON after normalizing it to a list: `null` becomes an
    /// empty list and a bare object a one-element list.
    pub async fn save_value(&self, name: &str, value: Value) -> Result<usize> {
        let tracks = normalize_track_list(value)?;
        self.save_list(name, &tracks).await?;
        Ok(tracks.len())
    }

    /// `None` when the list is absent or its stored content is not a list.
    pub async fn load_list(&self, name: &str) -> Result<Option<Vec<Track>>> {
        let key = list_key(name)?;
        let Some(raw) = self.storage.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Vec<Track>>(&raw) {
            Ok(tracks) => Ok(Some(tracks)),
            Err(e) => {
                warn!(
                    "{}, treating as absent: {}",
                    QuizError::MalformedStoredData(key),
                    e
                );
                Ok(None)
            }
        }
    }

    pub async fn delete_list(&self, name: &str) -> Result<()> {
        self.storage.remove(&list_key(name)?).await
    }

    pub async fn list_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for key in self.storage.keys().await? {
            if let Some(name) = key.strip_prefix(TRACKLIST_PREFIX) {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    pub async fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.storage.get(&list_key(name)?).await?.is_some())
    }

    /// Points `context` at `name`, or clears the pointer with `None`.
    pub async fn save_selection(&self, context: &str, name: Option<&str>) -> Result<()> {
        let key = selection_key(context);
        match name {
            Some(name) if !name.is_empty() => self.storage.set(&key, name).await,
            _ => self.storage.remove(&key).await,
        }
    }

    /// The selected list name for `context`. A pointer at a list that no
    /// longer exists reads as `None`; the stale key itself is left alone.
    pub async fn load_selection(&self, context: &str) -> Result<Option<String>> {
        let Some(name) = self.storage.get(&selection_key(context)).await? else {
            return Ok(None);
        };
        if name.is_empty() || !self.contains(&name).await? {
            return Ok(None);
        }
        Ok(Some(name))
    }

    /// Fetches JSON from `url` and stores it under `name`.
    ///
    /// A body that is not plain JSON gets a second, lenient parse before the
    /// import is rejected.
    pub async fn import_from_url(&self, name: &str, url: &str) -> Result<usize> {
        list_key(name)?;
        let res = self.http.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(QuizError::ImportFetchFailed {
                status: status.as_u16(),
            });
        }

        let body = res.text().await?;
        let value = match serde_json::from_str::<Value>(&body) {
            Ok(value) => value,
            Err(e) => {
                debug!("response from {} is not plain JSON ({}), retrying leniently", url, e);
                parse_lenient(&body)?
            }
        };

        self.save_value(name, value).await
    }

    /// Strict JSON text, as pasted by a user.
    pub async fn import_from_str(&self, name: &str, json: &str) -> Result<usize> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| QuizError::MalformedTrackList(e.to_string()))?;
        self.save_value(name, value).await
    }

    pub async fn import_from_file(&self, name: &str, path: impl AsRef<Path>) -> Result<usize> {
        let content = async_fs::read_to_string(path.as_ref()).await?;
        self.import_from_str(name, content.trim_start_matches('\u{feff}'))
            .await
    }

    /// The list as JSON text; empty when the list does not exist.
    pub async fn export_list(&self, name: &str, pretty: bool) -> Result<String> {
        let Some(tracks) = self.load_list(name).await? else {
            return Ok(String::new());
        };
        Ok(if pretty {
            serde_json::to_string_pretty(&tracks)?
        } else {
            serde_json::to_string(&tracks)?
        })
    }
}

pub fn normalize_track_list(value: Value) -> Result<Vec<Track>> {
    let items = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        other => {
            return Err(QuizError::MalformedTrackList(format!(
                "expected a list of tracks, found {other}"
            )));
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<Track>(item)
                .map_err(|e| QuizError::MalformedTrackList(e.to_string()))
        })
        .collect()
}

/// Tolerates a byte-order mark, surrounding whitespace and JSON that was
/// encoded twice (a JSON string holding the document).
pub fn parse_lenient(text: &str) -> Result<Value> {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| QuizError::MalformedTrackList(e.to_string()))?;

    match value {
        Value::String(inner) => serde_json::from_str(inner.trim())
            .map_err(|e| QuizError::MalformedTrackList(e.to_string())),
        value => Ok(value),
    }
}

fn list_key(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(QuizError::MissingListName);
    }
    Ok(format!("{TRACKLIST_PREFIX}{name}"))
}

fn selection_key(context: &str) -> String {
    format!("{SELECTION_PREFIX}{context}")
}
