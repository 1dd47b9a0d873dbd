use crate::error::{CancelError, CreateError, VoteOutcome};
use crate::notify::{Notifier, Renderer};
use crate::render;
use crate::scheduler::Scheduler;
use crate::tally::{self, Tally};
use crate::validate;
use chrono::{Duration, Utc};
use quickpoll_models::{Poll, Vote, Voter};
use quickpoll_store::{PollStore, StoreError, VoteStore};
use uuid::Uuid;

/// Raw creation parameters as handed in by the host surface (slash command or
/// form). `options` may be empty, in which case the poll falls back to
/// Yes/No; `duration` is the unparsed minutes argument.
#[derive(Debug, Clone)]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
    pub duration: String,
    pub vote_locked: bool,
    pub is_public: bool,
    pub creator: Voter,
    pub room_id: String,
}

/// Orchestrates the poll lifecycle: creation, vote acceptance, live refresh,
/// creator cancellation, and deadline closure.
///
/// The engine holds no lock across its operations; concurrent invocations for
/// the same poll are resolved by the stores (last write wins per
/// `(poll_id, voter_id)`, record deletion as the sole arbiter between the two
/// terminal paths).
#[derive(Clone)]
pub struct PollEngine<S, R, N> {
    polls: PollStore,
    votes: VoteStore,
    scheduler: S,
    renderer: R,
    notifier: N,
}

impl<S, R, N> PollEngine<S, R, N>
where
    S: Scheduler + Clone + Send + Sync + 'static,
    R: Renderer + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    pub fn new(polls: PollStore, votes: VoteStore, scheduler: S, renderer: R, notifier: N) -> Self {
        Self {
            polls,
            votes,
            scheduler,
            renderer,
            notifier,
        }
    }

    /// Validate, persist, render, and schedule a new poll.
    ///
    /// The scheduler handle is only known after the message is posted and the
    /// closure job scheduled, so the record is written twice: once bare, once
    /// with the message id and job handle filled in.
    pub async fn create_poll(&self, request: CreatePollRequest) -> Result<Poll, CreateError> {
        let validated =
            validate::validate_poll(&request.question, &request.options, &request.duration)?;

        let now = Utc::now();
        let mut poll = Poll {
            id: Uuid::new_v4().to_string(),
            question: validated.question,
            options: validated.options,
            creator_id: request.creator.id,
            creator_name: request.creator.display_name,
            room_id: request.room_id,
            message_id: None,
            deadline: now + Duration::minutes(validated.minutes),
            job_handle: None,
            vote_locked: request.vote_locked,
            is_public: request.is_public,
            created_at: now,
        };
        self.polls.put(&poll).await?;

        let blocks = render::poll_blocks(&poll, &Tally::empty(&poll.options));
        let message_id = match self.renderer.create_message(&poll.room_id, &blocks).await {
            Ok(message_id) => message_id,
            Err(err) => {
                // A poll without a posted message can never be voted on or
                // cancelled through the UI; drop the record rather than leave
                // it orphaned and never-closing.
                let _ = self.polls.delete(&poll.id).await;
                return Err(err.into());
            }
        };
        poll.message_id = Some(message_id);

        let engine = self.clone();
        let poll_id = poll.id.clone();
        let handle = self.scheduler.schedule_once(poll.deadline, async move {
            if let Err(err) = engine.close_poll(&poll_id).await {
                tracing::error!(poll_id = %poll_id, error = %err, "scheduled poll closure failed");
            }
        });
        // No handle from the scheduler: fall back to the poll id so a later
        // cancel targets a safe miss instead of nothing at all.
        poll.job_handle = Some(handle.unwrap_or_else(|| poll.id.clone()));
        self.polls.put(&poll).await?;

        tracing::info!(
            poll_id = %poll.id,
            room_id = %poll.room_id,
            deadline = %poll.deadline,
            "poll created"
        );
        Ok(poll)
    }

    /// Accept one vote. The submitted label is taken as given; an unknown
    /// label is stored but never surfaces in tallies, which iterate the
    /// poll's declared options.
    pub async fn record_vote(
        &self,
        poll_id: &str,
        option: &str,
        voter: &Voter,
    ) -> Result<VoteOutcome, StoreError> {
        let Some(poll) = self.polls.get(poll_id).await? else {
            return Ok(VoteOutcome::RejectedEnded);
        };

        if poll.vote_locked && self.votes.get(poll_id, &voter.id).await?.is_some() {
            return Ok(VoteOutcome::RejectedLocked);
        }

        let vote = Vote {
            poll_id: poll_id.to_string(),
            voter_id: voter.id.clone(),
            voter_name: voter.display_name.clone(),
            option: option.to_string(),
            cast_at: Utc::now(),
        };
        self.votes.put(&vote).await?;

        if poll.is_public {
            if let Some(message_id) = poll.message_id.clone() {
                // Best effort: a failed refresh never un-records the vote.
                self.refresh_live_results(&poll, &message_id).await;
            }
        }
        Ok(VoteOutcome::Recorded)
    }

    /// Re-render the live tallies of a public poll on demand (the refresh
    /// button). No-op when the poll is gone, private, or not yet rendered.
    pub async fn refresh_poll(&self, poll_id: &str) -> Result<(), StoreError> {
        let Some(poll) = self.polls.get(poll_id).await? else {
            return Ok(());
        };
        if !poll.is_public {
            return Ok(());
        }
        if let Some(message_id) = poll.message_id.clone() {
            self.refresh_live_results(&poll, &message_id).await;
        }
        Ok(())
    }

    async fn refresh_live_results(&self, poll: &Poll, message_id: &str) {
        let votes = match self.votes.list(&poll.id).await {
            Ok(votes) => votes,
            Err(err) => {
                tracing::warn!(poll_id = %poll.id, error = %err, "could not load votes for a live refresh");
                return;
            }
        };
        let tally = Tally::from_votes(&poll.options, &votes);
        let blocks = render::poll_blocks(poll, &tally);
        if let Err(err) = self.renderer.update_message(message_id, &blocks).await {
            tracing::warn!(poll_id = %poll.id, error = %err, "live result refresh failed");
        }
    }

    /// Creator-only early termination. No results are computed; the message
    /// flips to the cancelled view and all records are removed.
    pub async fn cancel_poll(&self, poll_id: &str, requester: &Voter) -> Result<(), CancelError> {
        let Some(poll) = self.polls.get(poll_id).await? else {
            return Err(CancelError::AlreadyEnded);
        };
        if poll.creator_id != requester.id {
            return Err(CancelError::NotCreator);
        }

        // Poll first, votes second: a crash in between leaves inert orphan
        // votes, never a vote-less poll that still looks open.
        self.polls.delete(poll_id).await?;
        self.votes.delete_for_poll(poll_id).await?;

        if let Some(handle) = poll.job_handle.as_deref() {
            if !self.scheduler.cancel(handle) {
                // The closure job may still fire; it tolerates the missing
                // record.
                tracing::warn!(poll_id, handle, "no pending closure job to cancel");
            }
        }

        if let Some(message_id) = poll.message_id.as_deref() {
            let blocks = render::cancelled_blocks(&poll);
            if let Err(err) = self.renderer.update_message(message_id, &blocks).await {
                tracing::warn!(poll_id, error = %err, "could not render the cancelled view");
            }
        }

        if let Err(err) = self
            .notifier
            .send_direct(&requester.id, "Poll cancelled successfully.")
            .await
        {
            tracing::warn!(poll_id, error = %err, "could not confirm the cancellation to the requester");
        }

        tracing::info!(poll_id, "poll cancelled by its creator");
        Ok(())
    }

    /// Deadline closure, invoked only by the scheduler callback. Idempotent
    /// under at-least-once delivery: a missing record means the poll was
    /// already cancelled or closed, and the call is a silent no-op.
    pub async fn close_poll(&self, poll_id: &str) -> Result<(), StoreError> {
        let Some(poll) = self.polls.get(poll_id).await? else {
            tracing::debug!(poll_id, "closure fired for a missing poll, skipping");
            return Ok(());
        };

        match self.notifier.resolve_room(&poll.room_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(poll_id, room_id = %poll.room_id, "poll room is gone, results cannot be delivered");
                return Ok(());
            }
            Err(err) => {
                tracing::error!(poll_id, room_id = %poll.room_id, error = %err, "could not resolve the poll room");
                return Ok(());
            }
        }

        let votes = self.votes.list(poll_id).await?;
        let tally = Tally::from_votes(&poll.options, &votes);
        let verdict = tally.verdict();

        let summary = render::results_summary(&poll, &tally, &verdict);
        if let Err(err) = self.notifier.send_to_room(&poll.room_id, &summary).await {
            tracing::warn!(poll_id, error = %err, "could not post the results summary");
        }

        let voters = tally::voters_by_option(&poll.options, &votes);
        let detailed = render::detailed_results(&poll, &tally, &voters);
        if let Err(err) = self.notifier.send_direct(&poll.creator_id, &detailed).await {
            tracing::warn!(poll_id, error = %err, "could not deliver the detailed breakdown to the creator");
        }

        // Cleanup runs once the sends were attempted, even if one failed, so
        // the poll cannot reopen or be double-closed.
        self.polls.delete(poll_id).await?;
        self.votes.delete_for_poll(poll_id).await?;

        tracing::info!(poll_id, total_votes = tally.total, ?verdict, "poll closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::notify::DeliveryError;
    use chrono::DateTime;
    use quickpoll_models::MessageBlock;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockScheduler {
        scheduled: Arc<Mutex<Vec<DateTime<Utc>>>>,
        cancelled: Arc<Mutex<Vec<String>>>,
        handleless: bool,
    }

    impl MockScheduler {
        fn handleless() -> Self {
            Self {
                handleless: true,
                ..Self::default()
            }
        }
    }

    impl Scheduler for MockScheduler {
        fn schedule_once<F>(&self, fire_at: DateTime<Utc>, _job: F) -> Option<String>
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            let mut scheduled = self.scheduled.lock().unwrap();
            scheduled.push(fire_at);
            if self.handleless {
                None
            } else {
                Some(format!("job-{}", scheduled.len()))
            }
        }

        fn cancel(&self, handle: &str) -> bool {
            self.cancelled.lock().unwrap().push(handle.to_string());
            !self.handleless
        }
    }

    #[derive(Clone, Default)]
    struct MockRenderer {
        created: Arc<Mutex<Vec<(String, Vec<MessageBlock>)>>>,
        updated: Arc<Mutex<Vec<(String, Vec<MessageBlock>)>>>,
        fail_create: Arc<AtomicBool>,
        fail_update: Arc<AtomicBool>,
    }

    impl Renderer for MockRenderer {
        async fn create_message(
            &self,
            room_id: &str,
            blocks: &[MessageBlock],
        ) -> Result<String, DeliveryError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(DeliveryError::Failed("create refused".into()));
            }
            let mut created = self.created.lock().unwrap();
            created.push((room_id.to_string(), blocks.to_vec()));
            Ok(format!("msg-{}", created.len()))
        }

        async fn update_message(
            &self,
            message_id: &str,
            blocks: &[MessageBlock],
        ) -> Result<(), DeliveryError> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(DeliveryError::MessageNotFound(message_id.to_string()));
            }
            self.updated
                .lock()
                .unwrap()
                .push((message_id.to_string(), blocks.to_vec()));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MockNotifier {
        room_messages: Arc<Mutex<Vec<(String, String)>>>,
        direct_messages: Arc<Mutex<Vec<(String, String)>>>,
        missing_rooms: Arc<Mutex<HashSet<String>>>,
        fail_room_sends: Arc<AtomicBool>,
    }

    impl Notifier for MockNotifier {
        async fn resolve_room(&self, room_id: &str) -> Result<bool, DeliveryError> {
            Ok(!self.missing_rooms.lock().unwrap().contains(room_id))
        }

        async fn send_to_room(&self, room_id: &str, text: &str) -> Result<(), DeliveryError> {
            if self.fail_room_sends.load(Ordering::SeqCst) {
                return Err(DeliveryError::Failed("room send refused".into()));
            }
            self.room_messages
                .lock()
                .unwrap()
                .push((room_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn send_direct(&self, user_id: &str, text: &str) -> Result<(), DeliveryError> {
            self.direct_messages
                .lock()
                .unwrap()
                .push((user_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    type TestEngine = PollEngine<MockScheduler, MockRenderer, MockNotifier>;

    struct Harness {
        engine: TestEngine,
        polls: PollStore,
        votes: VoteStore,
        scheduler: MockScheduler,
        renderer: MockRenderer,
        notifier: MockNotifier,
    }

    fn harness() -> Harness {
        harness_with_scheduler(MockScheduler::default())
    }

    fn harness_with_scheduler(scheduler: MockScheduler) -> Harness {
        let polls = PollStore::memory();
        let votes = VoteStore::memory();
        let renderer = MockRenderer::default();
        let notifier = MockNotifier::default();
        let engine = PollEngine::new(
            polls.clone(),
            votes.clone(),
            scheduler.clone(),
            renderer.clone(),
            notifier.clone(),
        );
        Harness {
            engine,
            polls,
            votes,
            scheduler,
            renderer,
            notifier,
        }
    }

    fn voter(id: &str) -> Voter {
        Voter {
            id: id.to_string(),
            display_name: id.to_uppercase(),
        }
    }

    fn request(question: &str, options: &[&str], duration: &str) -> CreatePollRequest {
        CreatePollRequest {
            question: question.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            duration: duration.to_string(),
            vote_locked: false,
            is_public: false,
            creator: voter("creator"),
            room_id: "room-1".to_string(),
        }
    }

    async fn create(harness: &Harness, req: CreatePollRequest) -> Poll {
        harness.engine.create_poll(req).await.expect("create poll")
    }

    #[tokio::test]
    async fn creation_defaults_to_yes_no_and_schedules_the_exact_deadline() {
        let h = harness();
        let poll = create(&h, request("Ship it?", &[], "5")).await;

        assert_eq!(poll.options, vec!["Yes".to_string(), "No".to_string()]);
        assert_eq!(poll.deadline - poll.created_at, Duration::minutes(5));
        assert_eq!(poll.message_id.as_deref(), Some("msg-1"));
        assert_eq!(poll.job_handle.as_deref(), Some("job-1"));

        let stored = h.polls.get(&poll.id).await.unwrap().expect("stored poll");
        assert_eq!(stored.message_id.as_deref(), Some("msg-1"));
        assert_eq!(stored.job_handle.as_deref(), Some("job-1"));

        let scheduled = h.scheduler.scheduled.lock().unwrap();
        assert_eq!(*scheduled, vec![poll.deadline]);
    }

    #[tokio::test]
    async fn rejected_creation_persists_nothing() {
        let h = harness();
        let err = h
            .engine
            .create_poll(request("  ", &[], "5"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateError::Validation(ValidationError::EmptyQuestion)
        ));
        assert!(h.renderer.created.lock().unwrap().is_empty());
        assert!(h.scheduler.scheduled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_option_is_rejected_citing_the_duplicate() {
        let h = harness();
        let err = h
            .engine
            .create_poll(request("Pick", &["Red", "Blue", "Red"], "5"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateError::Validation(ValidationError::DuplicateOption(ref opt)) if opt == "Red"
        ));
    }

    #[tokio::test]
    async fn handleless_scheduler_falls_back_to_the_poll_id() {
        let h = harness_with_scheduler(MockScheduler::handleless());
        let poll = create(&h, request("Ship it?", &[], "5")).await;
        assert_eq!(poll.job_handle.as_deref(), Some(poll.id.as_str()));
    }

    #[tokio::test]
    async fn failed_initial_render_leaves_no_record_behind() {
        let h = harness();
        h.renderer.fail_create.store(true, Ordering::SeqCst);

        let err = h
            .engine
            .create_poll(request("Ship it?", &[], "5"))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::Render(_)));
        assert!(h.scheduler.scheduled.lock().unwrap().is_empty());
        // Nothing to vote on afterwards.
        let outcome = h
            .engine
            .record_vote("whatever", "Yes", &voter("u1"))
            .await
            .unwrap();
        assert_eq!(outcome, VoteOutcome::RejectedEnded);
    }

    #[tokio::test]
    async fn voting_on_an_unknown_poll_reports_ended() {
        let h = harness();
        let outcome = h
            .engine
            .record_vote("never-created", "Yes", &voter("u1"))
            .await
            .unwrap();
        assert_eq!(outcome, VoteOutcome::RejectedEnded);
    }

    #[tokio::test]
    async fn unlocked_revote_overwrites_the_previous_option() {
        let h = harness();
        let poll = create(&h, request("Pick", &["A", "B"], "5")).await;

        let first = h.engine.record_vote(&poll.id, "A", &voter("u1")).await.unwrap();
        let second = h.engine.record_vote(&poll.id, "B", &voter("u1")).await.unwrap();
        assert_eq!(first, VoteOutcome::Recorded);
        assert_eq!(second, VoteOutcome::Recorded);

        let votes = h.votes.list(&poll.id).await.unwrap();
        assert_eq!(votes.len(), 1);
        let tally = Tally::from_votes(&poll.options, &votes);
        assert_eq!(tally.count("A"), 0);
        assert_eq!(tally.count("B"), 1);
    }

    #[tokio::test]
    async fn locked_poll_rejects_a_revote_without_mutation() {
        let h = harness();
        let mut req = request("Pick", &["A", "B"], "5");
        req.vote_locked = true;
        let poll = create(&h, req).await;

        assert_eq!(
            h.engine.record_vote(&poll.id, "A", &voter("u1")).await.unwrap(),
            VoteOutcome::Recorded
        );
        assert_eq!(
            h.engine.record_vote(&poll.id, "B", &voter("u1")).await.unwrap(),
            VoteOutcome::RejectedLocked
        );

        let votes = h.votes.list(&poll.id).await.unwrap();
        let tally = Tally::from_votes(&poll.options, &votes);
        assert_eq!(tally.count("A"), 1);
        assert_eq!(tally.count("B"), 0);
    }

    #[tokio::test]
    async fn public_poll_vote_updates_the_message_in_place() {
        let h = harness();
        let mut req = request("Pick", &["A", "B"], "5");
        req.is_public = true;
        let poll = create(&h, req).await;

        h.engine.record_vote(&poll.id, "A", &voter("u1")).await.unwrap();

        let updated = h.renderer.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].0, "msg-1");
        let MessageBlock::Section { text } = &updated[0].1[0] else {
            panic!("expected a section block");
        };
        assert!(text.contains("**Votes:** A: 1 | B: 0"));
    }

    #[tokio::test]
    async fn private_poll_vote_does_not_touch_the_message() {
        let h = harness();
        let poll = create(&h, request("Pick", &["A", "B"], "5")).await;
        h.engine.record_vote(&poll.id, "A", &voter("u1")).await.unwrap();
        assert!(h.renderer.updated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn a_failed_live_refresh_still_records_the_vote() {
        let h = harness();
        let mut req = request("Pick", &["A", "B"], "5");
        req.is_public = true;
        let poll = create(&h, req).await;
        h.renderer.fail_update.store(true, Ordering::SeqCst);

        let outcome = h.engine.record_vote(&poll.id, "A", &voter("u1")).await.unwrap();
        assert_eq!(outcome, VoteOutcome::Recorded);
        assert_eq!(h.votes.list(&poll.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn refresh_rerenders_public_polls_and_ignores_private_ones() {
        let h = harness();
        let mut req = request("Pick", &["A", "B"], "5");
        req.is_public = true;
        let public = create(&h, req).await;
        let private = create(&h, request("Quiet", &["A", "B"], "5")).await;

        h.engine.refresh_poll(&public.id).await.unwrap();
        h.engine.refresh_poll(&private.id).await.unwrap();
        h.engine.refresh_poll("gone").await.unwrap();

        let updated = h.renderer.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].0, "msg-1");
    }

    #[tokio::test]
    async fn cancel_by_non_creator_changes_nothing() {
        let h = harness();
        let poll = create(&h, request("Pick", &["A", "B"], "5")).await;
        h.engine.record_vote(&poll.id, "A", &voter("u1")).await.unwrap();

        let err = h.engine.cancel_poll(&poll.id, &voter("intruder")).await.unwrap_err();
        assert!(matches!(err, CancelError::NotCreator));

        assert!(h.polls.get(&poll.id).await.unwrap().is_some());
        assert_eq!(h.votes.list(&poll.id).await.unwrap().len(), 1);
        assert!(h.notifier.room_messages.lock().unwrap().is_empty());
        assert!(h.renderer.updated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_of_an_unknown_poll_reports_already_ended() {
        let h = harness();
        let err = h.engine.cancel_poll("gone", &voter("creator")).await.unwrap_err();
        assert!(matches!(err, CancelError::AlreadyEnded));
    }

    #[tokio::test]
    async fn creator_cancellation_cleans_up_and_flips_the_message() {
        let h = harness();
        let poll = create(&h, request("Pick", &["A", "B"], "5")).await;
        h.engine.record_vote(&poll.id, "A", &voter("u1")).await.unwrap();

        h.engine.cancel_poll(&poll.id, &voter("creator")).await.unwrap();

        assert!(h.polls.get(&poll.id).await.unwrap().is_none());
        assert!(h.votes.list(&poll.id).await.unwrap().is_empty());
        assert_eq!(
            *h.scheduler.cancelled.lock().unwrap(),
            vec!["job-1".to_string()]
        );

        let updated = h.renderer.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        let MessageBlock::Section { text } = &updated[0].1[0] else {
            panic!("expected a section block");
        };
        assert!(text.contains("Poll Cancelled"));
        assert!(text.contains("~~Pick~~"));

        let direct = h.notifier.direct_messages.lock().unwrap();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].0, "creator");
    }

    #[tokio::test]
    async fn closure_is_idempotent_under_duplicate_delivery() {
        let h = harness();
        let poll = create(&h, request("Ship it?", &[], "5")).await;
        h.engine.record_vote(&poll.id, "Yes", &voter("u1")).await.unwrap();

        h.engine.close_poll(&poll.id).await.unwrap();
        h.engine.close_poll(&poll.id).await.unwrap();

        assert_eq!(h.notifier.room_messages.lock().unwrap().len(), 1);
        assert_eq!(h.notifier.direct_messages.lock().unwrap().len(), 1);
        assert!(h.polls.get(&poll.id).await.unwrap().is_none());
        assert!(h.votes.list(&poll.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn closure_job_runs_on_a_spawned_task() {
        let h = harness();
        let poll = create(&h, request("Ship it?", &[], "5")).await;
        h.engine.record_vote(&poll.id, "Yes", &voter("u1")).await.unwrap();

        // The deadline job is handed to the scheduler's worker threads, so
        // the whole closure future has to cross a thread boundary.
        let engine = h.engine.clone();
        let poll_id = poll.id.clone();
        tokio::spawn(async move { engine.close_poll(&poll_id).await })
            .await
            .expect("join")
            .expect("close");

        assert!(h.polls.get(&poll.id).await.unwrap().is_none());
        assert_eq!(h.notifier.room_messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn closure_reports_a_tie_for_an_equal_maximum() {
        let h = harness();
        let poll = create(&h, request("Pick", &["Red", "Blue", "Green"], "5")).await;
        for (voter_id, option) in [("u1", "Red"), ("u2", "Red"), ("u3", "Blue"), ("u4", "Blue"), ("u5", "Green")] {
            h.engine.record_vote(&poll.id, option, &voter(voter_id)).await.unwrap();
        }

        h.engine.close_poll(&poll.id).await.unwrap();

        let room = h.notifier.room_messages.lock().unwrap();
        assert!(room[0].1.contains("### Verdict: TIE"));
        assert!(room[0].1.contains("• Red: 2 (40.0%)"));
    }

    #[tokio::test]
    async fn closure_reports_the_single_winner() {
        let h = harness();
        let poll = create(&h, request("Pick", &["Red", "Blue", "Green"], "5")).await;
        for (voter_id, option) in [
            ("u1", "Red"),
            ("u2", "Red"),
            ("u3", "Red"),
            ("u4", "Blue"),
            ("u5", "Blue"),
            ("u6", "Green"),
        ] {
            h.engine.record_vote(&poll.id, option, &voter(voter_id)).await.unwrap();
        }

        h.engine.close_poll(&poll.id).await.unwrap();

        let room = h.notifier.room_messages.lock().unwrap();
        assert!(room[0].1.contains("### Verdict: Red"));

        let direct = h.notifier.direct_messages.lock().unwrap();
        assert_eq!(direct[0].0, "creator");
        assert!(direct[0].1.contains("Red (50.00%): U1, U2, U3"));
    }

    #[tokio::test]
    async fn closure_with_no_votes_reports_zero_percentages() {
        let h = harness();
        let poll = create(&h, request("Ship it?", &[], "5")).await;

        h.engine.close_poll(&poll.id).await.unwrap();

        let room = h.notifier.room_messages.lock().unwrap();
        assert!(room[0].1.contains("• Yes: 0 (0.0%)"));
        assert!(room[0].1.contains("• No: 0 (0.0%)"));
        assert!(room[0].1.contains("### Verdict: No votes"));
    }

    #[tokio::test]
    async fn closure_aborts_without_cleanup_when_the_room_is_gone() {
        let h = harness();
        let poll = create(&h, request("Ship it?", &[], "5")).await;
        h.notifier
            .missing_rooms
            .lock()
            .unwrap()
            .insert("room-1".to_string());

        h.engine.close_poll(&poll.id).await.unwrap();

        assert!(h.polls.get(&poll.id).await.unwrap().is_some());
        assert!(h.notifier.room_messages.lock().unwrap().is_empty());
        assert!(h.notifier.direct_messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn closure_cleanup_proceeds_even_when_the_summary_send_fails() {
        let h = harness();
        let poll = create(&h, request("Ship it?", &[], "5")).await;
        h.engine.record_vote(&poll.id, "Yes", &voter("u1")).await.unwrap();
        h.notifier.fail_room_sends.store(true, Ordering::SeqCst);

        h.engine.close_poll(&poll.id).await.unwrap();

        assert!(h.polls.get(&poll.id).await.unwrap().is_none());
        assert!(h.votes.list(&poll.id).await.unwrap().is_empty());
        // The private breakdown still reached the creator.
        assert_eq!(h.notifier.direct_messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancellation_wins_the_race_and_closure_no_ops() {
        let h = harness();
        let poll = create(&h, request("Ship it?", &[], "5")).await;

        h.engine.cancel_poll(&poll.id, &voter("creator")).await.unwrap();
        h.engine.close_poll(&poll.id).await.unwrap();

        assert!(h.notifier.room_messages.lock().unwrap().is_empty());
        assert!(h.polls.get(&poll.id).await.unwrap().is_none());
    }
}
