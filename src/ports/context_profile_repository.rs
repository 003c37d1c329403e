//! Context profile repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::profile::UserContextProfile;

/// Repository port for the per-user context profile singleton.
#[async_trait]
pub trait ContextProfileRepository: Send + Sync {
    /// Find the user's profile, if the agent has produced one.
    async fn find_by_user(&self, user_id: &UserId)
        -> Result<Option<UserContextProfile>, DomainError>;

    /// Insert or fully replace the user's profile.
    async fn save(&self, profile: &UserContextProfile) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_profile_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ContextProfileRepository) {}
    }
}
