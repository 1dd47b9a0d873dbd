use crate::{DbPool, StoreError};
use chrono::{DateTime, Utc};
use quickpoll_models::Poll;

#[derive(Debug, Clone, sqlx::FromRow)]
struct PollRow {
    id: String,
    question: String,
    options: String,
    creator_id: String,
    creator_name: String,
    room_id: String,
    message_id: Option<String>,
    deadline: DateTime<Utc>,
    job_handle: Option<String>,
    vote_locked: bool,
    is_public: bool,
    created_at: DateTime<Utc>,
}

impl PollRow {
    fn into_poll(self) -> Result<Poll, StoreError> {
        Ok(Poll {
            id: self.id,
            question: self.question,
            options: serde_json::from_str(&self.options)?,
            creator_id: self.creator_id,
            creator_name: self.creator_name,
            room_id: self.room_id,
            message_id: self.message_id,
            deadline: self.deadline,
            job_handle: self.job_handle,
            vote_locked: self.vote_locked,
            is_public: self.is_public,
            created_at: self.created_at,
        })
    }
}

pub async fn upsert_poll(pool: &DbPool, poll: &Poll) -> Result<(), StoreError> {
    let options = serde_json::to_string(&poll.options)?;
    sqlx::query(
        "INSERT INTO polls (id, question, options, creator_id, creator_name, room_id,
                            message_id, deadline, job_handle, vote_locked, is_public, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT (id) DO UPDATE SET
             question = ?2, options = ?3, creator_id = ?4, creator_name = ?5,
             room_id = ?6, message_id = ?7, deadline = ?8, job_handle = ?9,
             vote_locked = ?10, is_public = ?11",
    )
    .bind(&poll.id)
    .bind(&poll.question)
    .bind(&options)
    .bind(&poll.creator_id)
    .bind(&poll.creator_name)
    .bind(&poll.room_id)
    .bind(&poll.message_id)
    .bind(poll.deadline)
    .bind(&poll.job_handle)
    .bind(poll.vote_locked)
    .bind(poll.is_public)
    .bind(poll.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_poll(pool: &DbPool, poll_id: &str) -> Result<Option<Poll>, StoreError> {
    let row = sqlx::query_as::<_, PollRow>(
        "SELECT id, question, options, creator_id, creator_name, room_id,
                message_id, deadline, job_handle, vote_locked, is_public, created_at
         FROM polls WHERE id = ?1",
    )
    .bind(poll_id)
    .fetch_optional(pool)
    .await?;
    row.map(PollRow::into_poll).transpose()
}

pub async fn delete_poll(pool: &DbPool, poll_id: &str) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM polls WHERE id = ?1")
        .bind(poll_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
