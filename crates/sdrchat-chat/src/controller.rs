//! Conversation state controller.
//!
//! Sequences bootstrap, greeting fetch, optimistic sends and persistence.
//! State lives in a `watch` channel so renderers see each change as it
//! happens; every mutation is a short synchronous section that never spans an
//! `.await`, and the only suspension points are the two remote calls. The
//! transcript is written to the store after the watch lock is released.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::watch;

use sdrchat_api::ChatApi;
use sdrchat_storage::{
    clear_messages, clear_session, generate_session_id, get_or_create_session_id,
    load_transcript, save_transcript, KeyValueStore,
};
use sdrchat_types::{Message, MESSAGES_KEY};

use crate::state::ConversationState;

/// How replies to overlapping sends are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendOrdering {
    /// Each send overwrites the transcript with the view it captured when it
    /// was issued; the reply that resolves last wins.
    Snapshot,
    /// Only the reply to the most recently issued send is applied; replies
    /// to earlier sends are dropped.
    #[default]
    LatestOnly,
}

impl SendOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendOrdering::Snapshot => "snapshot",
            SendOrdering::LatestOnly => "latest-only",
        }
    }
}

impl fmt::Display for SendOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns the conversation state for one mount of the chat window.
///
/// Cloning is cheap and yields a handle to the same conversation, so sends
/// can be spawned and overlap.
#[derive(Clone)]
pub struct ChatController {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn ChatApi>,
    store: Arc<dyn KeyValueStore>,
    ordering: SendOrdering,
    session_id: String,
    state: watch::Sender<ConversationState>,
    bootstrapped: AtomicBool,
    send_seq: AtomicU64,
    // Numbers transcript changes in mutation order
    change_seq: AtomicU64,
    // Last change number written to the store
    persisted: Mutex<u64>,
    // Set once a newer mount has taken over the store
    retired: AtomicBool,
}

impl ChatController {
    /// Resolves the session identifier; the transcript is not touched until
    /// [`bootstrap`](Self::bootstrap).
    pub fn new(
        api: Arc<dyn ChatApi>,
        store: Arc<dyn KeyValueStore>,
        ordering: SendOrdering,
    ) -> Self {
        let session_id = match get_or_create_session_id(store.as_ref()) {
            Ok(id) => id,
            Err(e) => {
                log::error!("Session storage unavailable, using a temporary id: {}", e);
                generate_session_id()
            }
        };
        let (state, _) = watch::channel(ConversationState::default());

        Self {
            inner: Arc::new(Inner {
                api,
                store,
                ordering,
                session_id,
                state,
                bootstrapped: AtomicBool::new(false),
                send_seq: AtomicU64::new(0),
                change_seq: AtomicU64::new(0),
                persisted: Mutex::new(0),
                retired: AtomicBool::new(false),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn ordering(&self) -> SendOrdering {
        self.inner.ordering
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ConversationState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.inner.state.subscribe()
    }

    /// Restores the saved transcript, or fetches a greeting when there is none.
    ///
    /// Only the first call per controller does anything.
    pub async fn bootstrap(&self) {
        if self.inner.bootstrapped.swap(true, Ordering::SeqCst) {
            return;
        }

        match load_transcript(self.inner.store.as_ref()) {
            Ok(Some(saved)) if !saved.is_empty() => {
                log::info!("Restored {} saved messages", saved.len());
                self.update(|state| state.adopt_saved(saved));
                return;
            }
            Ok(_) => {}
            Err(e) => log::error!("Failed to load saved messages: {}", e),
        }

        self.initialize().await;
    }

    async fn initialize(&self) {
        let mut started = false;
        self.update(|state| started = state.begin_init());
        if !started {
            return;
        }

        let result = self.inner.api.init_chat(&self.inner.session_id).await;
        let latest_only = self.inner.ordering == SendOrdering::LatestOnly;

        self.update(|state| {
            if latest_only && !state.messages.is_empty() {
                // The user already took a turn; the greeting would overwrite it
                log::debug!("Discarding greeting, conversation already started");
                if let Err(e) = &result {
                    log::error!("Init error: {}", e);
                }
                state.discard_init();
                return;
            }

            match result {
                Ok(response) => {
                    log::debug!("Greeting received for {}", self.inner.session_id);
                    state.apply_init_success(response, Utc::now());
                }
                Err(e) => {
                    log::error!("Init error: {}", e);
                    state.apply_init_failure();
                }
            }
        });
    }

    /// Sends a user message.
    ///
    /// Blank input is ignored. The user message shows up in the state before
    /// the request is made and is rolled back if the request fails.
    pub async fn send_message(&self, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            return;
        }

        let seq = self.inner.send_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let user_message = Message::user(content);

        let mut prior = Vec::new();
        let mut sent = Vec::new();
        self.update(|state| {
            prior = state.begin_send(user_message);
            sent = state.messages.clone();
        });

        let outgoing = sent.iter().map(Message::to_api).collect();
        let result = self
            .inner
            .api
            .send_chat(outgoing, &self.inner.session_id)
            .await;

        if self.inner.ordering == SendOrdering::LatestOnly {
            let latest = self.inner.send_seq.load(Ordering::SeqCst);
            if latest != seq {
                log::debug!("Dropping reply to send #{} (latest is #{})", seq, latest);
                return;
            }
        }

        match result {
            Ok(response) => {
                self.update(|state| state.apply_send_success(sent, response, Utc::now()));
            }
            Err(e) => {
                log::error!("Send error: {}", e);
                self.update(|state| state.apply_send_failure(prior));
            }
        }
    }

    /// Replaces this controller with a fresh mount over the same store and
    /// service. This controller stops writing to the store.
    pub fn remount(&self) -> ChatController {
        self.inner.retired.store(true, Ordering::SeqCst);
        ChatController::new(
            self.inner.api.clone(),
            self.inner.store.clone(),
            self.inner.ordering,
        )
    }

    /// Forgets the saved transcript (session kept) and remounts.
    pub fn clear_and_remount(&self) -> ChatController {
        let _persisted = self.retire();
        if let Err(e) = clear_messages(self.inner.store.as_ref()) {
            log::warn!("Failed to clear saved messages: {}", e);
        }
        self.remount()
    }

    /// Forgets the transcript and the session identifier, then remounts
    /// under a new session.
    pub fn reset_session_and_remount(&self) -> ChatController {
        let _persisted = self.retire();
        if let Err(e) = clear_session(self.inner.store.as_ref()) {
            log::warn!("Failed to clear session: {}", e);
        }
        self.remount()
    }

    // Stops store writes; the guard holds off any write already in progress
    fn retire(&self) -> std::sync::MutexGuard<'_, u64> {
        let persisted = self
            .inner
            .persisted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.retired.store(true, Ordering::SeqCst);
        persisted
    }

    fn update(&self, f: impl FnOnce(&mut ConversationState)) {
        let mut changed = None;
        self.inner.state.send_modify(|state| {
            let previous = state.messages.clone();
            f(state);
            if state.messages != previous {
                let change = self.inner.change_seq.fetch_add(1, Ordering::SeqCst) + 1;
                changed = Some((change, state.messages.clone()));
            }
        });

        if let Some((change, messages)) = changed {
            self.persist(change, &messages);
        }
    }

    // A change older than the one already on disk is skipped
    fn persist(&self, change: u64, messages: &[Message]) {
        let mut persisted = self
            .inner
            .persisted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.inner.retired.load(Ordering::SeqCst) || *persisted > change {
            return;
        }

        let store = self.inner.store.as_ref();
        let result = if messages.is_empty() {
            store.remove(MESSAGES_KEY)
        } else {
            save_transcript(store, messages)
        };

        match result {
            Ok(()) => *persisted = change,
            Err(e) => log::warn!("Failed to save messages: {}", e),
        }
    }
}

impl fmt::Debug for ChatController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatController")
            .field("session_id", &self.inner.session_id)
            .field("ordering", &self.inner.ordering)
            .finish()
    }
}
