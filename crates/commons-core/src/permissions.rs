//! Edit, delete and moderation eligibility.

use std::sync::Arc;

use crate::domain::{ContentItem, ModerationStatus, User};
use crate::ports::{AuthorizationPolicy, Intent};

/// Default platform rules: admins may do anything, collaborators may edit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformPolicy;

impl AuthorizationPolicy for PlatformPolicy {
    fn grants(&self, intent: Intent, item: Option<&ContentItem>, user: &User) -> bool {
        if user.has_admin_rights() {
            return true;
        }
        match (intent, item, user.username()) {
            (Intent::Edit, Some(item), Some(username)) => item.is_collaborator(username),
            _ => false,
        }
    }
}

/// Decides what an acting user may do with an item.
///
/// Ownership is checked here. Anything beyond ownership is delegated to the
/// configured [`AuthorizationPolicy`].
#[derive(Clone)]
pub struct PermissionPredicate {
    policy: Arc<dyn AuthorizationPolicy>,
}

impl PermissionPredicate {
    pub fn new(policy: Arc<dyn AuthorizationPolicy>) -> Self {
        Self { policy }
    }

    pub fn can_edit(&self, item: Option<&ContentItem>, user: Option<&User>) -> bool {
        self.check(Intent::Edit, item, user)
    }

    pub fn can_delete(&self, item: Option<&ContentItem>, user: Option<&User>) -> bool {
        self.check(Intent::Delete, item, user)
    }

    pub fn can_moderate(&self, user: Option<&User>) -> bool {
        user.is_some_and(|user| self.policy.grants(Intent::Moderate, None, user))
    }

    /// Items a moderator still has to decide on.
    pub fn needs_moderation(&self, item: &ContentItem, user: Option<&User>) -> bool {
        self.can_moderate(user) && item.moderation != ModerationStatus::Accepted
    }

    fn check(&self, intent: Intent, item: Option<&ContentItem>, user: Option<&User>) -> bool {
        let (Some(item), Some(user)) = (item, user) else {
            return false;
        };
        item.is_created_by(user.id, user.username()) || self.policy.grants(intent, Some(item), user)
    }
}

impl Default for PermissionPredicate {
    fn default() -> Self {
        Self::new(Arc::new(PlatformPolicy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentKind, Creator, UserRole};

    fn user(name: &str) -> User {
        User::new(name.into(), name.into(), format!("{name}@example.com"), String::new())
    }

    fn item_by(creator: &User) -> ContentItem {
        ContentItem::new(
            ContentKind::Research,
            "compost-toilet",
            "Compost toilet",
            Creator {
                id: creator.id,
                username: creator.username.clone(),
                country: None,
            },
        )
    }

    #[test]
    fn creator_can_edit_and_delete() {
        let alice = user("alice");
        let item = item_by(&alice);
        let permissions = PermissionPredicate::default();

        assert!(permissions.can_edit(Some(&item), Some(&alice)));
        assert!(permissions.can_delete(Some(&item), Some(&alice)));
    }

    #[test]
    fn missing_user_or_item_is_never_allowed() {
        let alice = user("alice");
        let item = item_by(&alice);
        let permissions = PermissionPredicate::default();

        assert!(!permissions.can_edit(Some(&item), None));
        assert!(!permissions.can_edit(None, Some(&alice)));
        assert!(!permissions.can_delete(None, None));
        assert!(!permissions.can_moderate(None));
    }

    #[test]
    fn collaborators_edit_but_do_not_delete() {
        let alice = user("alice");
        let bob = user("bob");
        let mut item = item_by(&alice);
        item.collaborators.push("bob".into());
        let permissions = PermissionPredicate::default();

        assert!(permissions.can_edit(Some(&item), Some(&bob)));
        assert!(!permissions.can_delete(Some(&item), Some(&bob)));
    }

    #[test]
    fn admins_have_elevated_access() {
        let alice = user("alice");
        let admin = user("root").with_roles(vec![UserRole::Admin]);
        let item = item_by(&alice);
        let permissions = PermissionPredicate::default();

        assert!(permissions.can_edit(Some(&item), Some(&admin)));
        assert!(permissions.can_delete(Some(&item), Some(&admin)));
        assert!(permissions.can_moderate(Some(&admin)));
        assert!(!permissions.can_moderate(Some(&alice)));
    }

    #[test]
    fn needs_moderation_only_for_moderators_on_unaccepted_items() {
        let alice = user("alice");
        let admin = user("root").with_roles(vec![UserRole::Admin]);
        let mut item = item_by(&alice);
        let permissions = PermissionPredicate::default();

        assert!(permissions.needs_moderation(&item, Some(&admin)));
        assert!(!permissions.needs_moderation(&item, Some(&alice)));

        item.moderation = ModerationStatus::Accepted;
        assert!(!permissions.needs_moderation(&item, Some(&admin)));
    }

    #[test]
    fn custom_policy_is_consulted() {
        struct DenyAll;
        impl AuthorizationPolicy for DenyAll {
            fn grants(&self, _: Intent, _: Option<&ContentItem>, _: &User) -> bool {
                false
            }
        }

        let alice = user("alice");
        let admin = user("root").with_roles(vec![UserRole::Admin]);
        let item = item_by(&alice);
        let permissions = PermissionPredicate::new(Arc::new(DenyAll));

        assert!(!permissions.can_edit(Some(&item), Some(&admin)));
        assert!(permissions.can_edit(Some(&item), Some(&alice)));
    }
}
