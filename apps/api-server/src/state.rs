//! Application state - shared across all handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use commons_core::PermissionPredicate;
use commons_core::page::PageDeps;
use commons_core::ports::{PasswordService, UserRepository};
use commons_core::signup::SignUpService;
use commons_infra::{
    InMemoryContentStore, InMemoryMetadataStore, InMemoryTagCatalog, InMemoryUserRepository,
    SeedData, TracingAnalytics,
};

#[derive(Clone)]
pub struct AppState {
    pub pages: PageDeps,
    pub users: Arc<dyn UserRepository>,
    pub signup: SignUpService,
}

impl AppState {
    /// Build in-memory stores and fill them from `seed`.
    pub async fn from_seed(
        seed: SeedData,
        passwords: Arc<dyn PasswordService>,
    ) -> anyhow::Result<Self> {
        let store = Arc::new(InMemoryContentStore::default());
        let users = Arc::new(InMemoryUserRepository::new());
        let tags = Arc::new(InMemoryTagCatalog::new());

        seed.load_into(&store, &users, &tags, passwords.as_ref())
            .await
            .context("failed to load seed data")?;

        let pages = PageDeps {
            store,
            users: users.clone(),
            tags,
            analytics: Arc::new(TracingAnalytics),
            metadata: Arc::new(InMemoryMetadataStore::new()),
            permissions: PermissionPredicate::default(),
        };

        tracing::info!("Application state initialized");

        Ok(Self {
            pages,
            signup: SignUpService::new(users.clone(), passwords),
            users,
        })
    }

    /// Read the seed document at `path`, or start empty without one.
    pub async fn load(
        seed_file: Option<&Path>,
        passwords: Arc<dyn PasswordService>,
    ) -> anyhow::Result<Self> {
        let seed = match seed_file {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read seed file {}", path.display()))?;
                SeedData::from_json(&raw)
                    .with_context(|| format!("failed to parse seed file {}", path.display()))?
            }
            None => {
                tracing::warn!("SEED_FILE not set. Starting with empty stores.");
                SeedData::default()
            }
        };

        Self::from_seed(seed, passwords).await
    }
}
