use serde::{Deserialize, Serialize};

/// Action token carried by a poll button. The wire names are stable: the host
/// platform routes interactions back to the engine by these ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollAction {
    #[serde(rename = "quickpoll_vote")]
    Vote,
    #[serde(rename = "quickpoll_cancel")]
    Cancel,
    #[serde(rename = "quickpoll_refresh")]
    Refresh,
}

/// Value payload of a vote button: which poll, which option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePayload {
    pub poll_id: String,
    pub option: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub action: PollAction,
    /// JSON-encoded [`VotePayload`] for vote buttons, the raw poll id for
    /// cancel and refresh buttons.
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub danger: bool,
}

/// A renderer-agnostic display payload. The host platform maps these onto its
/// own message block format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBlock {
    Section { text: String },
    Actions { elements: Vec<ActionButton> },
}
