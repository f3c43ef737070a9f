use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabled::Tabled;

use crate::utils;

pub const DEFAULT_CLIP_DURATION_MS: u64 = 2000;

/// Bearer token plus the absolute instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// Milliseconds since the Unix epoch.
    pub expires_at: i64,
}

impl AccessToken {
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }
}

/// Verifier and anti-CSRF state of one in-flight login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceSession {
    pub code_verifier: String,
    pub state: String,
}

/// Token endpoint response. Only `access_token` is mandatory for success.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// One clip of a track list as stored on disk.
///
/// Every field is optional so that hand-written and imported lists survive a
/// load/save cycle unchanged; unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(rename = "_artistName", default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(rename = "_trackTitle", default, skip_serializing_if = "Option::is_none")]
    pub track_title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    pub fn new(uri: impl Into<String>, start_ms: u64, duration_ms: u64) -> Self {
        Self {
            uri: Some(uri.into()),
            start_ms: Some(start_ms),
            duration_ms: Some(duration_ms),
            ..Default::default()
        }
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms.unwrap_or(0)
    }

    /// Zero counts as unset.
    pub fn clip_duration_ms(&self) -> u64 {
        match self.duration_ms {
            Some(ms) if ms > 0 => ms,
            _ => DEFAULT_CLIP_DURATION_MS,
        }
    }

    /// Catalog id, taken from the URI first and `id` second.
    pub fn spotify_id(&self) -> Option<&str> {
        self.uri
            .as_deref()
            .and_then(utils::track_id_from_uri)
            .or(self.id.as_deref())
    }

    pub fn playback_uri(&self) -> Option<String> {
        match (&self.uri, &self.id) {
            (Some(uri), _) => Some(uri.clone()),
            (None, Some(id)) => Some(format!("spotify:track:{id}")),
            (None, None) => None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .or(self.uri.as_deref())
            .unwrap_or("Untitled")
    }

    /// Metadata cached by an earlier reveal.
    pub fn reveal(&self) -> Option<Reveal> {
        match (&self.artist_name, &self.track_title) {
            (Some(artist), Some(title)) => Some(Reveal {
                artist: artist.clone(),
                title: title.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub artist: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPlaybackRequest {
    pub uris: Vec<String>,
    pub position_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Tabled)]
pub struct TrackListTableRow {
    pub selected: String,
    pub name: String,
    pub tracks: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub index: usize,
    pub name: String,
    pub start: String,
    pub clip: String,
}
