use crate::domain::{Comment, ContentItem, User, UserComment};
use crate::permissions::PermissionPredicate;

/// Annotate comments with whether `viewer` may edit them.
///
/// A comment is editable by its author, whose identity may have been recorded
/// as a user id or a username, and by anyone allowed to edit `item`.
pub fn to_user_comments(
    comments: &[Comment],
    viewer: Option<&User>,
    item: &ContentItem,
    permissions: &PermissionPredicate,
) -> Vec<UserComment> {
    if comments.is_empty() {
        return Vec::new();
    }

    let can_edit_item = permissions.can_edit(Some(item), viewer);

    comments
        .iter()
        .map(|comment| UserComment {
            is_editable: can_edit_item || is_author(comment, viewer),
            comment: comment.clone(),
        })
        .collect()
}

fn is_author(comment: &Comment, viewer: Option<&User>) -> bool {
    let Some(viewer) = viewer else {
        return false;
    };
    viewer.is_identified_by(&comment.creator_id)
        || viewer
            .username()
            .is_some_and(|name| name == comment.creator_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentKind, Creator, UserRole};
    use uuid::Uuid;

    fn viewer() -> User {
        let mut user = User::new(
            "alice".into(),
            "Alice".into(),
            "alice@example.com".into(),
            String::new(),
        );
        user.id = Uuid::new_v4();
        user
    }

    fn item() -> ContentItem {
        ContentItem::new(
            ContentKind::Howto,
            "rain-barrel",
            "Rain barrel",
            Creator {
                id: Uuid::new_v4(),
                username: "owner".into(),
                country: None,
            },
        )
    }

    #[test]
    fn author_matched_by_id_is_editable() {
        let alice = viewer();
        let comments = vec![
            Comment::new(alice.id.to_string(), "", "mine"),
            Comment::new(Uuid::new_v4().to_string(), "bob", "not mine"),
        ];

        let out = to_user_comments(&comments, Some(&alice), &item(), &PermissionPredicate::default());

        assert!(out[0].is_editable);
        assert!(!out[1].is_editable);
    }

    #[test]
    fn author_matched_by_username_is_editable() {
        let alice = viewer();
        let comments = vec![
            Comment::new("alice", "", "by username id"),
            Comment::new("someone-else", "alice", "by creator name"),
        ];

        let out = to_user_comments(&comments, Some(&alice), &item(), &PermissionPredicate::default());

        assert!(out.iter().all(|c| c.is_editable));
    }

    #[test]
    fn item_editors_can_edit_every_comment() {
        let admin = viewer().with_roles(vec![UserRole::Admin]);
        let comments = vec![
            Comment::new("bob", "bob", "one"),
            Comment::new("carol", "carol", "two"),
        ];

        let out = to_user_comments(&comments, Some(&admin), &item(), &PermissionPredicate::default());

        assert!(out.iter().all(|c| c.is_editable));
    }

    #[test]
    fn anonymous_viewer_edits_nothing_and_order_is_kept() {
        let comments: Vec<Comment> = (0..5)
            .map(|i| Comment::new(format!("user-{i}"), format!("user-{i}"), format!("comment {i}")))
            .collect();

        let out = to_user_comments(&comments, None, &item(), &PermissionPredicate::default());

        assert_eq!(out.len(), comments.len());
        for (built, raw) in out.iter().zip(&comments) {
            assert_eq!(&built.comment, raw);
            assert!(!built.is_editable);
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let out = to_user_comments(&[], Some(&viewer()), &item(), &PermissionPredicate::default());
        assert!(out.is_empty());
    }
}
