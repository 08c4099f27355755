#![deny(missing_docs)]
//! Postgres implementation of the fan-out engine's storage traits.
//!
//! Entity lookups read the application's own tables; notification writes go
//! to the two tables owned by this crate's `migrations/`. All queries are
//! runtime-checked so the crate builds without a reachable database.

use anyhow::Context;
use async_trait::async_trait;
use fanout_env::{required_var, Environment};
use model_notifications::{NotificationMetadata, NotificationRecord, NotificationToggles};
use notification_fanout::store::{
    CommentDetails, CommentRef, CommentScope, EntityStore, NotificationStore,
    NotificationStoreError, PostDetails, PreferencesStore, ProposalDetails, SpaceMember,
    VoteDetails,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub mod create;
pub mod entities;
pub mod preferences;
pub mod reader;

/// Schema migrations for the notification tables, embedded at compile time.
pub static NOTIFICATION_DB_MIGRATIONS: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// The engine's storage collaborators backed by one Postgres pool.
#[derive(Clone)]
pub struct NotificationDb {
    db: Pool<Postgres>,
}

impl NotificationDb {
    /// Wrap an already-connected pool.
    pub fn new(db: Pool<Postgres>) -> Self {
        Self { db }
    }

    /// Connect using `DATABASE_URL`, with the pool sized for the current
    /// environment.
    pub async fn new_from_env() -> anyhow::Result<Self> {
        let database_url = required_var("DATABASE_URL")?;
        let (min_connections, max_connections) = match Environment::new_or_prod() {
            Environment::Production => (5, 30),
            Environment::Develop => (3, 20),
            Environment::Local => (3, 10),
        };
        let db = PgPoolOptions::new()
            .min_connections(min_connections)
            .max_connections(max_connections)
            .connect(&database_url)
            .await
            .context("unable to connect to the database")?;
        Ok(Self::new(db))
    }

    /// The underlying pool, for callers that run their own queries.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.db
    }
}

#[async_trait]
impl EntityStore for NotificationDb {
    async fn space_members(&self, space_id: Uuid) -> anyhow::Result<Vec<SpaceMember>> {
        entities::get_space_members(&self.db, space_id).await
    }

    async fn comment(&self, id: Uuid) -> anyhow::Result<Option<CommentDetails>> {
        entities::get_comment(&self.db, id).await
    }

    async fn find_previous_comment(
        &self,
        scope: CommentScope,
        excluding: Uuid,
    ) -> anyhow::Result<Option<CommentRef>> {
        entities::find_previous_comment(&self.db, scope, excluding).await
    }

    async fn post(&self, id: Uuid) -> anyhow::Result<Option<PostDetails>> {
        entities::get_post(&self.db, id).await
    }

    async fn post_category_subscribers(&self, category_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        entities::get_post_category_subscribers(&self.db, category_id).await
    }

    async fn proposal(&self, id: Uuid) -> anyhow::Result<Option<ProposalDetails>> {
        entities::get_proposal(&self.db, id).await
    }

    async fn bounty_reviewers(&self, bounty_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        entities::get_bounty_reviewers(&self.db, bounty_id).await
    }

    async fn vote(&self, id: Uuid) -> anyhow::Result<Option<VoteDetails>> {
        entities::get_vote(&self.db, id).await
    }
}

#[async_trait]
impl NotificationStore for NotificationDb {
    async fn create_notification(
        &self,
        metadata: NotificationMetadata,
        record: NotificationRecord,
    ) -> Result<Option<Uuid>, NotificationStoreError> {
        create::create_notification(&self.db, &metadata, &record).await
    }
}

#[async_trait]
impl PreferencesStore for NotificationDb {
    async fn notification_toggles(&self, space_id: Uuid) -> anyhow::Result<NotificationToggles> {
        preferences::get_notification_toggles(&self.db, space_id).await
    }
}
