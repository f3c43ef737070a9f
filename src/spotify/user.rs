use crate::{Result, spotify::ApiClient, types::UserProfile};

pub async fn get_current_user(client: &ApiClient) -> Result<UserProfile> {
    client.get("/me").await
}
