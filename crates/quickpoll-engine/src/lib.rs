pub mod engine;
pub mod error;
pub mod notify;
pub mod render;
pub mod scheduler;
pub mod tally;
pub mod validate;

pub use engine::{CreatePollRequest, PollEngine};
pub use error::{CancelError, CreateError, ValidationError, VoteOutcome};
pub use notify::{DeliveryError, Notifier, Renderer};
pub use scheduler::{Scheduler, TokioScheduler};
pub use tally::{Tally, Verdict};
