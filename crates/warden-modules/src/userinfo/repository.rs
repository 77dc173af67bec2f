//! Storage for self-written infos and bios written by others.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use warden_core::UserId;

use crate::error::ModuleResult;

/// Where [`Bios`](super::Bios) keeps its texts.
#[async_trait]
pub trait UserInfoRepository: Send + Sync {
    /// The info `user` wrote about themselves.
    async fn me(&self, user: UserId) -> ModuleResult<Option<String>>;

    async fn set_me(&self, user: UserId, info: &str) -> ModuleResult<()>;

    /// The bio others wrote about `user`.
    async fn bio(&self, user: UserId) -> ModuleResult<Option<String>>;

    async fn set_bio(&self, user: UserId, bio: &str) -> ModuleResult<()>;

    /// Drops both texts for `user`.
    async fn forget(&self, user: UserId) -> ModuleResult<()>;
}

/// Process-local repository. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryUserInfo {
    me: RwLock<HashMap<UserId, String>>,
    bios: RwLock<HashMap<UserId, String>>,
}

impl InMemoryUserInfo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserInfoRepository for InMemoryUserInfo {
    async fn me(&self, user: UserId) -> ModuleResult<Option<String>> {
        Ok(self.me.read().get(&user).cloned())
    }

    async fn set_me(&self, user: UserId, info: &str) -> ModuleResult<()> {
        self.me.write().insert(user, info.to_string());
        Ok(())
    }

    async fn bio(&self, user: UserId) -> ModuleResult<Option<String>> {
        Ok(self.bios.read().get(&user).cloned())
    }

    async fn set_bio(&self, user: UserId, bio: &str) -> ModuleResult<()> {
        self.bios.write().insert(user, bio.to_string());
        Ok(())
    }

    async fn forget(&self, user: UserId) -> ModuleResult<()> {
        self.me.write().remove(&user);
        self.bios.write().remove(&user);
        Ok(())
    }
}
