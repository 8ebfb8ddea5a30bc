// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for the Kerb booking bot.
//!
//! [`ConversationEngine`] runs one inbound turn end to end: load the
//! sender's session, advance the state machine, write any finalized
//! booking, dispatch the reply, and persist the updated session. The
//! webhook always acknowledges deliveries, so the engine never propagates
//! errors to its caller.

pub mod machine;
pub mod replies;
pub mod timeparse;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use kerb_core::{
    BookingRepository, InboundTurn, KerbError, Reply, ReplyDispatcher, SessionStore,
};

use crate::machine::Outcome;
use crate::replies::RESET_NOTICE;

/// Runs the booking dialog for inbound webhook turns.
pub struct ConversationEngine {
    sessions: Arc<dyn SessionStore>,
    bookings: Arc<dyn BookingRepository>,
    dispatcher: Arc<dyn ReplyDispatcher>,
    history_limit: u32,
}

impl ConversationEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        bookings: Arc<dyn BookingRepository>,
        dispatcher: Arc<dyn ReplyDispatcher>,
        history_limit: u32,
    ) -> Self {
        Self {
            sessions,
            bookings,
            dispatcher,
            history_limit,
        }
    }

    /// Run one inbound turn. Errors are logged and the turn is dropped.
    pub async fn handle_turn(&self, turn: &InboundTurn) {
        if let Err(err) = self.run_turn(turn).await {
            error!(sender = %turn.sender, error = %err, "turn failed");
        }
    }

    async fn run_turn(&self, turn: &InboundTurn) -> Result<(), KerbError> {
        self.sessions
            .ensure_user(&turn.sender, turn.sender_name.as_deref())
            .await?;
        let mut session = self.sessions.create_if_absent(&turn.sender).await?;

        // A stored row whose draft disagrees with its step cannot be
        // advanced safely. Reset and apologize.
        if !session.draft_is_consistent() {
            warn!(sender = %turn.sender, step = %session.step, "inconsistent session draft, resetting");
            session.reset();
            self.sessions.save(&session).await?;
            self.dispatch(&turn.sender, Reply::Text(RESET_NOTICE.to_string()))
                .await;
            self.dispatch(&turn.sender, replies::main_menu()).await;
            return Ok(());
        }

        let outcome = machine::advance(&mut session, turn.input());
        debug!(sender = %turn.sender, step = %session.step, "dialog advanced");

        match outcome {
            Outcome::Menu => self.dispatch(&turn.sender, replies::main_menu()).await,
            Outcome::PromptPickup => {
                self.dispatch(&turn.sender, Reply::Text(replies::PROMPT_PICKUP.to_string()))
                    .await;
            }
            Outcome::PromptDrop => {
                self.dispatch(&turn.sender, Reply::Text(replies::PROMPT_DROP.to_string()))
                    .await;
            }
            Outcome::PromptTime => self.dispatch(&turn.sender, replies::time_menu()).await,
            Outcome::History => {
                let recent = self
                    .bookings
                    .list_recent_by_sender(&turn.sender, self.history_limit)
                    .await?;
                self.dispatch(&turn.sender, Reply::Text(replies::history(&recent)))
                    .await;
            }
            Outcome::Finalize(draft) => {
                let booking = self.bookings.create(&turn.sender, &draft).await?;
                info!(sender = %turn.sender, booking_id = %booking.id, "booking created");
                self.dispatch(&turn.sender, Reply::Text(replies::confirmation(&booking)))
                    .await;
                self.dispatch(&turn.sender, replies::main_menu()).await;
            }
            Outcome::ResetCorrupt => {
                warn!(sender = %turn.sender, "draft missing fields at finalize, resetting");
                self.dispatch(&turn.sender, Reply::Text(RESET_NOTICE.to_string()))
                    .await;
                self.dispatch(&turn.sender, replies::main_menu()).await;
            }
        }

        self.sessions.save(&session).await?;
        Ok(())
    }

    // Dispatch failures must not lose conversation state, so they are
    // logged here instead of propagated.
    async fn dispatch(&self, to: &str, reply: Reply) {
        let result = match &reply {
            Reply::Text(body) => self.dispatcher.send_text(to, body).await,
            Reply::Interactive { prompt, choices } => {
                self.dispatcher.send_interactive(to, prompt, choices).await
            }
        };
        if let Err(err) = result {
            warn!(to = %to, error = %err, "reply dispatch failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kerb_core::Step;
    use kerb_test_utils::{MemoryStore, MockDispatcher};

    fn setup() -> (Arc<MemoryStore>, Arc<MockDispatcher>, ConversationEngine) {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Arc::new(MockDispatcher::new());
        let engine =
            ConversationEngine::new(store.clone(), store.clone(), dispatcher.clone(), 5);
        (store, dispatcher, engine)
    }

    fn turn(body: &str) -> InboundTurn {
        InboundTurn {
            sender: "wa-1".into(),
            body: Some(body.into()),
            selection: None,
            sender_name: Some("Asha".into()),
        }
    }

    fn selection(id: &str) -> InboundTurn {
        InboundTurn {
            sender: "wa-1".into(),
            body: None,
            selection: Some(id.into()),
            sender_name: None,
        }
    }

    async fn run_happy_path(engine: &ConversationEngine) {
        engine.handle_turn(&turn("book cab")).await;
        engine.handle_turn(&turn("Airport")).await;
        engine.handle_turn(&turn("Central Station")).await;
        engine.handle_turn(&turn("now")).await;
    }

    #[tokio::test]
    async fn happy_path_creates_one_booking_and_resets() {
        let (store, dispatcher, engine) = setup();
        run_happy_path(&engine).await;

        let bookings = store.all_bookings().await;
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].pickup, "Airport");
        assert_eq!(bookings[0].drop_off, "Central Station");
        assert_eq!(bookings[0].ride_time, "Now");
        assert_eq!(bookings[0].fare, 20);

        let session = store.get("wa-1").await.unwrap().unwrap();
        assert_eq!(session.step, Step::Idle);
        assert!(session.pickup.is_none());

        // Confirmation text plus the menu that follows it.
        let sent = dispatcher.sent().await;
        let last_two = &sent[sent.len() - 2..];
        assert!(matches!(&last_two[0].reply, Reply::Text(body) if body.contains("Airport")));
        assert!(matches!(&last_two[1].reply, Reply::Interactive { .. }));
    }

    #[tokio::test]
    async fn first_contact_records_user_and_sends_menu() {
        let (store, dispatcher, engine) = setup();
        engine.handle_turn(&turn("hello")).await;

        let user = store.user("wa-1").await.unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Asha"));
        assert!(matches!(
            dispatcher.last_sent().await.unwrap().reply,
            Reply::Interactive { .. }
        ));
    }

    #[tokio::test]
    async fn button_selection_starts_booking() {
        let (store, _dispatcher, engine) = setup();
        engine.handle_turn(&selection("book_cab")).await;
        let session = store.get("wa-1").await.unwrap().unwrap();
        assert_eq!(session.step, Step::AwaitingPickup);
    }

    #[tokio::test]
    async fn empty_input_reprompts_without_advancing() {
        let (store, dispatcher, engine) = setup();
        engine.handle_turn(&turn("book cab")).await;
        dispatcher.clear_sent().await;

        engine.handle_turn(&turn("   ")).await;

        let session = store.get("wa-1").await.unwrap().unwrap();
        assert_eq!(session.step, Step::AwaitingPickup);
        assert_eq!(
            dispatcher.last_sent().await.unwrap().reply,
            Reply::Text(replies::PROMPT_PICKUP.to_string())
        );
    }

    #[tokio::test]
    async fn history_is_limited_and_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Arc::new(MockDispatcher::new());
        let engine = ConversationEngine::new(store.clone(), store.clone(), dispatcher.clone(), 2);

        for _ in 0..3 {
            run_happy_path(&engine).await;
        }
        dispatcher.clear_sent().await;
        engine.handle_turn(&turn("my bookings")).await;

        let Reply::Text(text) = dispatcher.last_sent().await.unwrap().reply else {
            panic!("expected text history");
        };
        // Header plus two entries; the oldest booking is cut off.
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("TEST0003"));
        assert!(text.contains("TEST0002"));
        assert!(!text.contains("TEST0001"));
    }

    #[tokio::test]
    async fn history_without_bookings_explains_how_to_start() {
        let (_store, dispatcher, engine) = setup();
        engine.handle_turn(&turn("my bookings")).await;
        assert_eq!(
            dispatcher.last_sent().await.unwrap().reply,
            Reply::Text(replies::NO_BOOKINGS.to_string())
        );
    }

    #[tokio::test]
    async fn dispatch_failure_still_saves_session() {
        let (store, dispatcher, engine) = setup();
        dispatcher.fail_sends(true);

        engine.handle_turn(&turn("book cab")).await;

        let session = store.get("wa-1").await.unwrap().unwrap();
        assert_eq!(session.step, Step::AwaitingPickup);
        assert_eq!(dispatcher.sent_count().await, 0);
    }

    #[tokio::test]
    async fn storage_failure_is_swallowed() {
        let (store, dispatcher, engine) = setup();
        store.fail_writes(true);
        engine.handle_turn(&turn("book cab")).await;
        assert_eq!(dispatcher.sent_count().await, 0);
    }

    #[tokio::test]
    async fn replayed_flow_creates_a_second_booking() {
        let (store, _dispatcher, engine) = setup();
        run_happy_path(&engine).await;
        run_happy_path(&engine).await;

        let bookings = store.all_bookings().await;
        assert_eq!(bookings.len(), 2);
        assert_ne!(bookings[0].id, bookings[1].id);
    }

    #[tokio::test]
    async fn inconsistent_session_is_reset_with_apology() {
        let (store, dispatcher, engine) = setup();
        let mut session = store.create_if_absent("wa-1").await.unwrap();
        session.step = Step::AwaitingTime;
        // No pickup or drop-off recorded for this step.
        store.save(&session).await.unwrap();

        engine.handle_turn(&turn("now")).await;

        let session = store.get("wa-1").await.unwrap().unwrap();
        assert_eq!(session.step, Step::Idle);
        let sent = dispatcher.sent().await;
        assert!(matches!(&sent[0].reply, Reply::Text(body) if body == RESET_NOTICE));
        assert!(store.all_bookings().await.is_empty());
    }
}
