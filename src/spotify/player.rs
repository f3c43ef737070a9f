use crate::{
    Result,
    spotify::ApiClient,
    types::{Device, DevicesResponse, StartPlaybackRequest},
};

/// Lists the playback devices of the logged-in account.
///
/// # Returns
///
/// All devices Spotify knows about; at most one has `is_active` set.
///
/// # Errors
///
/// Any error of [`ApiClient::request`].
pub async fn get_devices(client: &ApiClient) -> Result<Vec<Device>> {
    let res: DevicesResponse = client.get("/me/player/devices").await?;
    Ok(res.devices)
}

pub async fn get_active_device(client: &ApiClient) -> Result<Option<Device>> {
    Ok(get_devices(client).await?.into_iter().find(|d| d.is_active))
}

/// Starts `uri` on the active device at `position_ms`.
///
/// # Arguments
///
/// * `client` - Authenticated API client
/// * `uri` - Track URI, e.g. `spotify:track:4uLU6hMCjMI75M1A2tKUQC`
/// * `position_ms` - Offset into the track to start from
///
/// # Errors
///
/// Spotify answers 404 when no device is active; check
/// [`crate::QuizError::is_no_active_device`] on the error.
///
/// # Example
///
/// ```
/// start_playback(&client, "spotify:track:4uLU6hMCjMI75M1A2tKUQC", 30_000).await?;
/// ```
pub async fn start_playback(client: &ApiClient, uri: &str, position_ms: u64) -> Result<()> {
    let body = serde_json::to_value(StartPlaybackRequest {
        uris: vec![uri.to_string()],
        position_ms,
    })?;
    client.put("/me/player/play", Some(&body)).await?;
    Ok(())
}

pub async fn pause_playback(client: &ApiClient) -> Result<()> {
    client.put("/me/player/pause", None).await?;
    Ok(())
}
