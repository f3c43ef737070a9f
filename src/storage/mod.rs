//! Key-value storage backends.
//!
//! [`Storage`] is the seam every store in [`crate::management`] persists
//! through. Two backends exist:
//!
//! - [`FileStorage`] - durable, shared by every `quizify` process of the
//!   same user. Keys are independent files: concurrent writers to one key
//!   resolve by last write wins, writers to different keys never interfere.
//! - [`MemoryStorage`] - lives as long as the process. Used for the PKCE
//!   session, which must not outlive the login that created it, and in tests.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently stored. Order carries no meaning.
    async fn keys(&self) -> Result<Vec<String>>;
}
