//! In-memory context profile repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::profile::UserContextProfile;
use crate::ports::ContextProfileRepository;

/// In-memory implementation of the ContextProfileRepository port.
#[derive(Default)]
pub struct InMemoryContextProfileRepository {
    profiles: RwLock<HashMap<UserId, UserContextProfile>>,
}

impl InMemoryContextProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContextProfileRepository for InMemoryContextProfileRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserContextProfile>, DomainError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn save(&self, profile: &UserContextProfile) -> Result<(), DomainError> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}
