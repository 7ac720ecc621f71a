use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::domain::ContentKind;
use crate::error::{DomainError, StoreError};
use crate::ports::AnalyticsEvent;

use super::controller::ArticlePage;

/// User actions a page can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAction {
    ToggleUseful,
    ToggleFollow,
    Moderate,
}

/// Non-fatal failure to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub action: PageAction,
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    Failed(Notice),
}

/// Completion channel of a submitted action. Dropping it is fine: the
/// mutation still runs.
#[derive(Debug)]
pub struct ActionTicket {
    action: PageAction,
    outcome: oneshot::Receiver<Result<(), StoreError>>,
}

impl ActionTicket {
    pub fn action(&self) -> PageAction {
        self.action
    }

    /// Wait for the store to settle the mutation.
    pub async fn outcome(self) -> ActionOutcome {
        match self.outcome.await {
            Ok(Ok(())) => ActionOutcome::Completed,
            Ok(Err(err)) => ActionOutcome::Failed(Notice {
                action: self.action,
                message: err.to_string(),
                retryable: err.is_retryable(),
            }),
            Err(_) => ActionOutcome::Failed(Notice {
                action: self.action,
                message: "action was interrupted before completing".to_string(),
                retryable: true,
            }),
        }
    }
}

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Runs one page's store mutations one at a time, in submission order.
///
/// The worker task is started on first use and exits once the page is gone
/// and the queued jobs have drained.
#[derive(Default)]
pub(super) struct ActionQueue {
    jobs: Option<mpsc::UnboundedSender<Job>>,
}

impl ActionQueue {
    fn worker(&mut self) -> Option<&mpsc::UnboundedSender<Job>> {
        if self.jobs.as_ref().is_none_or(|jobs| jobs.is_closed()) {
            let runtime = Handle::try_current().ok()?;
            let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
            runtime.spawn(async move {
                while let Some(job) = rx.recv().await {
                    job.await;
                }
            });
            self.jobs = Some(tx);
        }
        self.jobs.as_ref()
    }

    fn submit<F>(&mut self, action: PageAction, task: F) -> ActionTicket
    where
        F: Future<Output = Result<(), StoreError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let ticket = ActionTicket {
            action,
            outcome: rx,
        };

        let Some(jobs) = self.worker() else {
            tracing::error!(action = ?action, "No Tokio runtime to run page action");
            let _ = tx.send(Err(StoreError::Unavailable(
                "no async runtime is running".to_string(),
            )));
            return ticket;
        };

        let job: Job = Box::pin(async move {
            let result = task.await;
            if let Err(err) = &result {
                tracing::warn!(action = ?action, error = %err, "Page action failed");
            }
            let _ = tx.send(result);
        });

        // A closed worker drops the job, which reports the action as interrupted.
        let _ = jobs.send(job);
        ticket
    }
}

/// Actions update the page optimistically and queue the store mutation.
/// Mutations from one page reach the store in the order they were made.
/// Outside a Tokio runtime the returned ticket reports a failure.
impl ArticlePage {
    /// Flip the viewer's useful vote.
    ///
    /// Returns `None` without a signed-in viewer that has a username, or
    /// before the item is found.
    pub fn toggle_useful(&mut self, category: &str) -> Option<ActionTicket> {
        let username = self.viewer.as_ref()?.username()?.to_string();
        let article = self.article.as_mut()?;

        let item_id = article.item.id;
        let slug = article.item.slug.clone();
        let had_voted = !article.item.useful_votes.insert(username.clone());
        if had_voted {
            article.item.useful_votes.remove(&username);
            article.counts.voted_useful = article.counts.voted_useful.saturating_sub(1);
        } else {
            article.counts.voted_useful += 1;
        }

        let prefix = self.kind.event_prefix();
        let action = if had_voted {
            format!("{prefix}UsefulRemoved")
        } else {
            format!("{prefix}Useful")
        };
        self.deps
            .analytics
            .track(AnalyticsEvent::new(category, action, slug));

        let store = self.deps.store.clone();
        let ticket = self.actions.submit(PageAction::ToggleUseful, async move {
            store.toggle_vote(item_id, &username).await.map(|_| ())
        });

        self.render();
        Some(ticket)
    }

    /// Subscribe the viewer to the item, or unsubscribe if already following.
    pub fn toggle_follow(&mut self) -> Option<ActionTicket> {
        let username = self.viewer.as_ref()?.username()?.to_string();
        let article = self.article.as_mut()?;

        let item_id = article.item.id;
        let slug = article.item.slug.clone();
        let was_following = article.item.subscribers.remove(&username);
        if was_following {
            article.counts.subscribers = article.counts.subscribers.saturating_sub(1);
        } else {
            article.item.subscribers.insert(username.clone());
            article.counts.subscribers += 1;
        }

        let action = if was_following {
            "Unsubscribed"
        } else {
            "Subscribed"
        };
        self.deps.analytics.track(AnalyticsEvent::new(
            self.kind.event_prefix(),
            action,
            slug,
        ));

        let store = self.deps.store.clone();
        let ticket = self.actions.submit(PageAction::ToggleFollow, async move {
            if was_following {
                store.remove_subscriber(item_id, &username).await
            } else {
                store.add_subscriber(item_id, &username).await
            }
        });

        self.render();
        Some(ticket)
    }

    /// Accept or reject a research item awaiting moderation.
    pub fn moderate(&mut self, accepted: bool) -> Result<ActionTicket, DomainError> {
        if self.kind != ContentKind::Research {
            return Err(DomainError::Validation(
                "moderation is only available on research pages".to_string(),
            ));
        }
        if !self.deps.permissions.can_moderate(self.viewer.as_ref()) {
            return Err(DomainError::Unauthorized);
        }

        let slug = self.route.slug.clone();
        let article = self.article.as_mut().ok_or(DomainError::NotFound {
            entity_type: "research",
            key: slug,
        })?;

        let status = article.item.moderation.decide(accepted)?;
        article.item.moderation = status;
        let item_id = article.item.id;

        tracing::info!(item_id = %item_id, status = ?status, "Research moderated");

        let store = self.deps.store.clone();
        let ticket = self.actions.submit(PageAction::Moderate, async move {
            store.decide_moderation(item_id, accepted).await.map(|_| ())
        });

        self.render();
        Ok(ticket)
    }
}
