pub mod block;
pub mod poll;
pub mod vote;

pub use block::{ActionButton, MessageBlock, PollAction, VotePayload};
pub use poll::Poll;
pub use vote::{Vote, Voter};

/// Maximum number of options a poll may carry.
pub const MAX_OPTIONS: usize = 10;
/// Minimum number of options when an explicit list is supplied.
pub const MIN_OPTIONS: usize = 2;
/// Maximum length of a single option label, in characters.
pub const MAX_OPTION_LENGTH: usize = 50;
/// Maximum poll duration, in minutes (one week).
pub const MAX_TIME_MINUTES: i64 = 10_080;
/// How much of an over-long option is echoed back in the error.
pub const OPTION_PREVIEW_LEN: usize = 20;
