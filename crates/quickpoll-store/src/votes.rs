use crate::{DbPool, StoreError};
use chrono::{DateTime, Utc};
use quickpoll_models::Vote;

#[derive(Debug, Clone, sqlx::FromRow)]
struct VoteRow {
    poll_id: String,
    voter_id: String,
    voter_name: String,
    option: String,
    cast_at: DateTime<Utc>,
}

impl From<VoteRow> for Vote {
    fn from(row: VoteRow) -> Self {
        Vote {
            poll_id: row.poll_id,
            voter_id: row.voter_id,
            voter_name: row.voter_name,
            option: row.option,
            cast_at: row.cast_at,
        }
    }
}

pub async fn upsert_vote(pool: &DbPool, vote: &Vote) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO votes (poll_id, voter_id, voter_name, option, cast_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (poll_id, voter_id)
         DO UPDATE SET voter_name = ?3, option = ?4, cast_at = ?5",
    )
    .bind(&vote.poll_id)
    .bind(&vote.voter_id)
    .bind(&vote.voter_name)
    .bind(&vote.option)
    .bind(vote.cast_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_vote(
    pool: &DbPool,
    poll_id: &str,
    voter_id: &str,
) -> Result<Option<Vote>, StoreError> {
    let row = sqlx::query_as::<_, VoteRow>(
        "SELECT poll_id, voter_id, voter_name, option, cast_at
         FROM votes WHERE poll_id = ?1 AND voter_id = ?2",
    )
    .bind(poll_id)
    .bind(voter_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Vote::from))
}

pub async fn list_votes(pool: &DbPool, poll_id: &str) -> Result<Vec<Vote>, StoreError> {
    let rows = sqlx::query_as::<_, VoteRow>(
        "SELECT poll_id, voter_id, voter_name, option, cast_at
         FROM votes WHERE poll_id = ?1 ORDER BY cast_at ASC",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Vote::from).collect())
}

pub async fn delete_votes_for_poll(pool: &DbPool, poll_id: &str) -> Result<u64, StoreError> {
    let result = sqlx::query("DELETE FROM votes WHERE poll_id = ?1")
        .bind(poll_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
