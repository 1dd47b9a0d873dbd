use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One voter's choice for one poll. At most one record lives per
/// (poll_id, voter_id); a revote on an unlocked poll replaces it entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub poll_id: String,
    pub voter_id: String,
    pub voter_name: String,
    pub option: String,
    pub cast_at: DateTime<Utc>,
}

/// A verified user identity as handed in by the host platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    pub id: String,
    pub display_name: String,
}
