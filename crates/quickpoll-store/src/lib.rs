pub mod memory;
pub mod polls;
pub mod votes;

use quickpoll_models::{Poll, Vote};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;

pub type DbPool = sqlx::SqlitePool;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("stored record is not decodable: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("migrations: applied successfully");
    Ok(())
}

/// Poll records keyed by poll id.
///
/// Enum dispatch over the two backends: an in-memory map for tests and
/// embedded hosts, and SQLite for durable deployments. This avoids the
/// dyn-safety limitations of `async fn` in traits.
#[derive(Clone)]
pub enum PollStore {
    Memory(memory::MemoryPolls),
    Sqlite(DbPool),
}

impl PollStore {
    pub fn memory() -> Self {
        Self::Memory(memory::MemoryPolls::new())
    }

    pub fn sqlite(pool: DbPool) -> Self {
        Self::Sqlite(pool)
    }

    /// Insert or fully replace the record for `poll.id`.
    pub async fn put(&self, poll: &Poll) -> Result<(), StoreError> {
        match self {
            Self::Memory(m) => {
                m.put(poll);
                Ok(())
            }
            Self::Sqlite(pool) => polls::upsert_poll(pool, poll).await,
        }
    }

    pub async fn get(&self, poll_id: &str) -> Result<Option<Poll>, StoreError> {
        match self {
            Self::Memory(m) => Ok(m.get(poll_id)),
            Self::Sqlite(pool) => polls::get_poll(pool, poll_id).await,
        }
    }

    /// Delete the record, reporting whether one existed.
    pub async fn delete(&self, poll_id: &str) -> Result<bool, StoreError> {
        match self {
            Self::Memory(m) => Ok(m.delete(poll_id)),
            Self::Sqlite(pool) => polls::delete_poll(pool, poll_id).await,
        }
    }
}

/// Vote records keyed by (poll id, voter id), enumerable by poll id.
#[derive(Clone)]
pub enum VoteStore {
    Memory(memory::MemoryVotes),
    Sqlite(DbPool),
}

impl VoteStore {
    pub fn memory() -> Self {
        Self::Memory(memory::MemoryVotes::new())
    }

    pub fn sqlite(pool: DbPool) -> Self {
        Self::Sqlite(pool)
    }

    /// Store the vote, overwriting any prior vote by the same voter on the
    /// same poll. The overwrite is total: the previous option no longer
    /// counts.
    pub async fn put(&self, vote: &Vote) -> Result<(), StoreError> {
        match self {
            Self::Memory(m) => {
                m.put(vote);
                Ok(())
            }
            Self::Sqlite(pool) => votes::upsert_vote(pool, vote).await,
        }
    }

    pub async fn get(&self, poll_id: &str, voter_id: &str) -> Result<Option<Vote>, StoreError> {
        match self {
            Self::Memory(m) => Ok(m.get(poll_id, voter_id)),
            Self::Sqlite(pool) => votes::get_vote(pool, poll_id, voter_id).await,
        }
    }

    pub async fn list(&self, poll_id: &str) -> Result<Vec<Vote>, StoreError> {
        match self {
            Self::Memory(m) => Ok(m.list(poll_id)),
            Self::Sqlite(pool) => votes::list_votes(pool, poll_id).await,
        }
    }

    /// Remove every vote for the poll, returning how many were deleted.
    pub async fn delete_for_poll(&self, poll_id: &str) -> Result<u64, StoreError> {
        match self {
            Self::Memory(m) => Ok(m.delete_for_poll(poll_id)),
            Self::Sqlite(pool) => votes::delete_votes_for_poll(pool, poll_id).await,
        }
    }
}
