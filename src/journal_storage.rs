pub mod sqlite;
pub use sqlite::SqliteJournals;

use crate::{summary::DateRange, user_storage::UserId};
use time::OffsetDateTime;

#[async_trait::async_trait]
pub trait JournalStorage: Sync + Send {
    async fn categories(&self) -> Result<Vec<Category>, Error>;

    async fn create(&self, user: UserId, entry: &NewJournal) -> Result<JournalId, Error>;

    async fn list(&self, user: UserId) -> Result<Vec<Journal>, Error>;

    async fn get(&self, user: UserId, id: JournalId) -> Result<Journal, Error>;

    async fn update(&self, user: UserId, id: JournalId, entry: &NewJournal) -> Result<(), Error>;

    async fn delete(&self, user: UserId, id: JournalId) -> Result<(), Error>;

    async fn entries_between(
        &self,
        user: UserId,
        range: &DateRange,
    ) -> Result<Vec<EntryStats>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Journal entry not found")]
    NotFound,

    #[error("Unknown category")]
    UnknownCategory,

    #[error("{0}")]
    Generic(Box<dyn std::error::Error + Send + Sync>),
}

impl warp::reject::Reject for Error {}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, derive_more::Display, serde::Serialize, serde::Deserialize,
)]
pub struct JournalId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Journal {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub category: String,
    pub sentiment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated input for creating or rewriting an entry.
#[derive(Debug, Clone)]
pub struct NewJournal {
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub sentiment: Option<String>,
    pub at: OffsetDateTime,
}

/// The columns the analytics need, one row per entry.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EntryStats {
    pub created_at: String,
    pub category: String,
    pub sentiment: Option<String>,
    pub content: String,
}
