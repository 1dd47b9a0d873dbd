use quickpoll_models::MessageBlock;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("message not found: {0}")]
    MessageNotFound(String),
    #[error("delivery failed: {0}")]
    Failed(String),
}

/// Posts and edits the poll message in the host platform's channel.
///
/// Implemented by the host; tests use a recording mock. Update failures never
/// roll back the engine state transition they were attached to.
///
/// The returned futures must be `Send`: the deadline closure job awaits these
/// methods and runs on the scheduler's worker threads. Implementors can still
/// write plain `async fn`s.
pub trait Renderer: Send + Sync {
    /// Post a new message into `room_id`, returning its message id.
    fn create_message(
        &self,
        room_id: &str,
        blocks: &[MessageBlock],
    ) -> impl Future<Output = Result<String, DeliveryError>> + Send;

    /// Replace the blocks of an existing message in place.
    fn update_message(
        &self,
        message_id: &str,
        blocks: &[MessageBlock],
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Plain-text delivery to a room or directly to a user. The same `Send`
/// requirement as [`Renderer`] applies.
pub trait Notifier: Send + Sync {
    /// Whether `room_id` still resolves to a deliverable room.
    fn resolve_room(&self, room_id: &str)
        -> impl Future<Output = Result<bool, DeliveryError>> + Send;

    fn send_to_room(
        &self,
        room_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;

    fn send_direct(
        &self,
        user_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}
