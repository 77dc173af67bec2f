//! Privileged users, as handed to modules at construction.

use warden_core::{ChatId, UserId};
use warden_framework::prelude::*;

/// The bot owner and its sudo users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Privileges {
    pub owner: Option<UserId>,
    /// Sudo users, owner included.
    pub sudoers: Vec<UserId>,
}

impl Privileges {
    pub fn new(owner: Option<UserId>, sudo_users: impl IntoIterator<Item = UserId>) -> Self {
        let mut sudoers: Vec<UserId> = owner.into_iter().chain(sudo_users).collect();
        sudoers.sort_unstable_by_key(|u| u.0);
        sudoers.dedup();
        Self { owner, sudoers }
    }

    pub fn is_sudo(&self, user: UserId) -> bool {
        self.sudoers.contains(&user)
    }

    /// Matches updates sent by the owner or a sudo user.
    pub fn sudo_filter(&self) -> Predicate {
        from_users(self.sudoers.clone())
    }

    /// Matches updates from the owner's private chat. Never matches when
    /// no owner is configured.
    pub fn owner_chat(&self) -> Predicate {
        in_chats(self.owner.map(|owner| ChatId(owner.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_sudo() {
        let privileges = Privileges::new(Some(UserId(1)), [UserId(3), UserId(1)]);
        assert_eq!(privileges.sudoers, vec![UserId(1), UserId(3)]);
        assert!(privileges.is_sudo(UserId(1)));
        assert!(!privileges.is_sudo(UserId(2)));
    }
}
