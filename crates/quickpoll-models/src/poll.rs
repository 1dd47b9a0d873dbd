use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single open poll. Exactly one record exists per id while the poll is
/// open; the record is deleted on closure or cancellation, and its absence is
/// the terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub question: String,
    /// Ordered, case-insensitively distinct option labels.
    pub options: Vec<String>,
    pub creator_id: String,
    pub creator_name: String,
    pub room_id: String,
    /// Id of the posted poll message. Set once after the initial render; the
    /// same message is updated in place on every live refresh.
    pub message_id: Option<String>,
    pub deadline: DateTime<Utc>,
    /// Opaque scheduler handle for the pending closure job. Falls back to the
    /// poll id when the scheduler returned no handle.
    pub job_handle: Option<String>,
    /// When true a voter may cast at most one vote for the poll's lifetime.
    pub vote_locked: bool,
    /// When true live tallies are shown in the channel message and refreshed
    /// after each vote.
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}
