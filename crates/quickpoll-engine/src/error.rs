use crate::notify::DeliveryError;
use quickpoll_models::{MAX_OPTIONS, MAX_OPTION_LENGTH, MAX_TIME_MINUTES, MIN_OPTIONS};
use quickpoll_store::StoreError;
use thiserror::Error;

/// Structural rejections of a creation request. Each variant maps to one
/// user-facing message; none are retried, and no partial state is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("the poll question cannot be empty")]
    EmptyQuestion,
    #[error("too many options ({0}); a poll allows at most {MAX_OPTIONS}")]
    TooManyOptions(usize),
    #[error("a poll needs at least {MIN_OPTIONS} options")]
    TooFewOptions,
    #[error("option \"{0}…\" is longer than {MAX_OPTION_LENGTH} characters")]
    OptionTooLong(String),
    #[error("duplicate option: {0}")]
    DuplicateOption(String),
    #[error("the duration must be a positive whole number of minutes")]
    InvalidDuration,
    #[error("the duration cannot exceed {MAX_TIME_MINUTES} minutes")]
    DurationTooLarge,
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to post the poll message: {0}")]
    Render(#[from] DeliveryError),
}

#[derive(Debug, Error)]
pub enum CancelError {
    #[error("the poll has already ended")]
    AlreadyEnded,
    #[error("only the poll creator can cancel it")]
    NotCreator,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a vote submission. Never an error: the caller must render a
/// distinct notification for each case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded,
    /// The poll is vote-locked and the voter already has a recorded vote.
    RejectedLocked,
    /// The poll is closed, cancelled, or never existed. A finished poll's
    /// record is deleted, so these cases cannot be told apart.
    RejectedEnded,
}
