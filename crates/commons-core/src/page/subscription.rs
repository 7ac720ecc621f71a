use std::collections::HashSet;

use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::ports::{ChangedField, ItemChange};

use super::controller::ArticlePage;

/// Change feed narrowed to one item and the fields a page declared.
pub struct PageSubscription {
    item_id: Uuid,
    fields: HashSet<ChangedField>,
    receiver: broadcast::Receiver<ItemChange>,
}

impl PageSubscription {
    /// Next relevant change, or `None` once the store's feed closes.
    pub async fn next(&mut self) -> Option<ItemChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.item_id == self.item_id && self.fields.contains(&change.field) => {
                    return Some(change);
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(item_id = %self.item_id, skipped, "Page subscription lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl ArticlePage {
    /// Declare which item fields this page depends on. `None` until found.
    pub fn subscribe(&self, fields: &[ChangedField]) -> Option<PageSubscription> {
        let item_id = self.item()?.id;
        Some(PageSubscription {
            item_id,
            fields: fields.iter().copied().collect(),
            receiver: self.deps.store.observe(),
        })
    }

    /// Fold a store notification into the view. Returns whether it applied.
    pub fn apply_change(&mut self, change: &ItemChange) -> bool {
        let Some(article) = self.article.as_mut() else {
            return false;
        };
        if article.item.id != change.item_id {
            return false;
        }

        article.counts = change.counts;
        article.item.moderation = change.moderation;

        // Another session of the same member voted or followed.
        let viewer = self.viewer.as_ref().and_then(|viewer| viewer.username());
        let own = change
            .member
            .as_ref()
            .filter(|member| viewer == Some(member.username.as_str()));
        if let Some(member) = own {
            let members = match change.field {
                ChangedField::Votes => Some(&mut article.item.useful_votes),
                ChangedField::Subscribers => Some(&mut article.item.subscribers),
                _ => None,
            };
            if let Some(members) = members {
                if member.present {
                    members.insert(member.username.clone());
                } else {
                    members.remove(&member.username);
                }
            }
        }

        self.render();
        true
    }
}
