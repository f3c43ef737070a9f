use std::sync::Arc;

use crate::{Result, storage::Storage, types::PkceSession};

pub const KEY_PKCE_STATE: &str = "pkce_state";
pub const KEY_PKCE_VERIFIER: &str = "pkce_code_verifier";

/// Holds the PKCE verifier and state between starting a login and
/// handling its redirect. Backed by process-scoped storage.
pub struct PkceSessionStore {
    storage: Arc<dyn Storage>,
    prefix: String,
}

impl PkceSessionStore {
    pub fn new(storage: Arc<dyn Storage>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    pub async fn save(&self, session: &PkceSession) -> Result<()> {
        self.storage
            .set(&self.key(KEY_PKCE_VERIFIER), &session.code_verifier)
            .await?;
        self.storage
            .set(&self.key(KEY_PKCE_STATE), &session.state)
            .await
    }

    /// Both halves, or `None` if either is missing.
    pub async fn load(&self) -> Result<Option<PkceSession>> {
        let state = self.storage.get(&self.key(KEY_PKCE_STATE)).await?;
        let verifier = self.storage.get(&self.key(KEY_PKCE_VERIFIER)).await?;

        Ok(match (state, verifier) {
            (Some(state), Some(code_verifier)) if !state.is_empty() && !code_verifier.is_empty() => {
                Some(PkceSession {
                    code_verifier,
                    state,
                })
            }
            _ => None,
        })
    }

    pub async fn exists(&self) -> Result<bool> {
        Ok(self.load().await?.is_some())
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage.remove(&self.key(KEY_PKCE_STATE)).await?;
        self.storage.remove(&self.key(KEY_PKCE_VERIFIER)).await
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}
