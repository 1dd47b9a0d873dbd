use dashmap::DashMap;
use quickpoll_models::{Poll, Vote};
use std::sync::Arc;

/// In-memory poll records, keyed by poll id.
#[derive(Clone, Default)]
pub struct MemoryPolls {
    records: Arc<DashMap<String, Poll>>,
}

impl MemoryPolls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, poll: &Poll) {
        self.records.insert(poll.id.clone(), poll.clone());
    }

    pub fn get(&self, poll_id: &str) -> Option<Poll> {
        self.records.get(poll_id).map(|entry| entry.value().clone())
    }

    pub fn delete(&self, poll_id: &str) -> bool {
        self.records.remove(poll_id).is_some()
    }
}

/// In-memory vote records, keyed by (poll id, voter id).
#[derive(Clone, Default)]
pub struct MemoryVotes {
    records: Arc<DashMap<(String, String), Vote>>,
}

impl MemoryVotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, vote: &Vote) {
        self.records.insert(
            (vote.poll_id.clone(), vote.voter_id.clone()),
            vote.clone(),
        );
    }

    pub fn get(&self, poll_id: &str, voter_id: &str) -> Option<Vote> {
        self.records
            .get(&(poll_id.to_string(), voter_id.to_string()))
            .map(|entry| entry.value().clone())
    }

    pub fn list(&self, poll_id: &str) -> Vec<Vote> {
        let mut votes: Vec<Vote> = self
            .records
            .iter()
            .filter(|entry| entry.key().0 == poll_id)
            .map(|entry| entry.value().clone())
            .collect();
        votes.sort_by_key(|v| v.cast_at);
        votes
    }

    pub fn delete_for_poll(&self, poll_id: &str) -> u64 {
        // Counted inside the predicate: the map's total length can shift
        // under concurrent writers to other polls while the retain runs.
        let mut removed = 0u64;
        self.records.retain(|key, _| {
            if key.0 == poll_id {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}
