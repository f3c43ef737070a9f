use crate::{Result, spotify::ApiClient, types::TrackDetails};

pub async fn get_track(client: &ApiClient, id: &str) -> Result<TrackDetails> {
    client.get(&format!("/tracks/{id}")).await
}
