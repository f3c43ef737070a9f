use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::Clock;
use crate::{Result, storage::Storage, types::AccessToken};

pub const KEY_ACCESS_TOKEN: &str = "access_token";
pub const KEY_TOKEN_EXPIRY: &str = "token_expiry";
pub const KEY_REFRESH_TOKEN: &str = "refresh_token";

/// Owns the persisted bearer token of one application surface.
///
/// Keys are `<prefix>access_token`, `<prefix>token_expiry` (epoch ms as a
/// decimal string) and `<prefix>refresh_token`, so stores with different
/// prefixes can share one storage without colliding.
///
/// Reads are not read-only: an expired or half-written token is purged from
/// storage the moment it is observed.
pub struct TokenStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    prefix: String,
    cache: Mutex<Option<AccessToken>>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            clock,
            prefix: prefix.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    pub async fn store_token(&self, token: &str, expires_in_secs: u64) -> Result<AccessToken> {
        let expires_in_ms = i64::try_from(expires_in_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let access = AccessToken {
            token: token.to_string(),
            expires_at: self.clock.now_millis().saturating_add(expires_in_ms),
        };

        self.storage
            .set(&self.key(KEY_ACCESS_TOKEN), &access.token)
            .await?;
        self.storage
            .set(&self.key(KEY_TOKEN_EXPIRY), &access.expires_at.to_string())
            .await?;

        *self.cache.lock().await = Some(access.clone());
        debug!(expires_at = access.expires_at, "stored access token");
        Ok(access)
    }

    /// The current token, or `None` when absent or expired.
    pub async fn get_access_token(&self) -> Result<Option<String>> {
        Ok(self.current().await?.map(|t| t.token))
    }

    /// Like [`TokenStore::get_access_token`] but keeps the expiry instant.
    pub async fn current(&self) -> Result<Option<AccessToken>> {
        let now = self.clock.now_millis();
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.is_valid_at(now) {
                return Ok(Some(cached.clone()));
            }
            *cache = None;
        }

        let token = self.storage.get(&self.key(KEY_ACCESS_TOKEN)).await?;
        let expiry = self.storage.get(&self.key(KEY_TOKEN_EXPIRY)).await?;

        match (token, expiry) {
            (None, None) => Ok(None),
            (Some(token), Some(expiry)) => match expiry.trim().parse::<i64>() {
                Ok(expires_at) if now < expires_at => {
                    let access = AccessToken { token, expires_at };
                    *cache = Some(access.clone());
                    Ok(Some(access))
                }
                _ => {
                    debug!("access token expired, purging");
                    self.purge().await?;
                    Ok(None)
                }
            },
            _ => {
                debug!("half-written access token, purging");
                self.purge().await?;
                Ok(None)
            }
        }
    }

    pub async fn store_refresh_token(&self, refresh_token: &str) -> Result<()> {
        self.storage
            .set(&self.key(KEY_REFRESH_TOKEN), refresh_token)
            .await
    }

    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.storage.get(&self.key(KEY_REFRESH_TOKEN)).await
    }

    /// Logout: forget the access token and the refresh token.
    pub async fn clear(&self) -> Result<()> {
        *self.cache.lock().await = None;
        self.purge().await?;
        self.storage.remove(&self.key(KEY_REFRESH_TOKEN)).await
    }

    async fn purge(&self) -> Result<()> {
        self.storage.remove(&self.key(KEY_ACCESS_TOKEN)).await?;
        self.storage.remove(&self.key(KEY_TOKEN_EXPIRY)).await?;
        Ok(())
    }
}
