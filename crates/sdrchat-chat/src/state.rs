//! Conversation state and its pure transitions.
//!
//! Every reaction of the controller to an outcome (greeting received, send
//! started, reply received, call failed) is a method here that only touches
//! the state it is given, so it can be tested without a network or a store.

use chrono::{DateTime, Utc};
use sdrchat_types::{
    ChatResponse, InitChatResponse, Message, QuickReply, Source, INIT_ERROR_MESSAGE,
    SEND_ERROR_MESSAGE,
};

/// Everything the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub loading: bool,
    pub error: Option<String>,
    pub quick_replies: Option<Vec<QuickReply>>,
    pub calendly_url: Option<String>,
    pub initialized: bool,
    /// Citations attached to the latest reply
    pub last_sources: Option<Vec<Source>>,
    /// Backend tool that produced the latest reply
    pub last_tool_used: Option<String>,
    /// The greeting fetch has not resolved yet
    pub init_pending: bool,
    /// A send whose reply will be applied has not resolved yet
    pub send_pending: bool,
}

impl ConversationState {
    /// Adopts a transcript loaded from storage; no greeting will be fetched.
    pub fn adopt_saved(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.initialized = true;
    }

    /// Marks the greeting fetch as started.
    ///
    /// Returns false when it must not start: it already ran for this state,
    /// or there is already a transcript.
    pub fn begin_init(&mut self) -> bool {
        if self.initialized || !self.messages.is_empty() {
            return false;
        }
        self.initialized = true;
        self.init_pending = true;
        self.refresh_loading();
        true
    }

    /// Replaces the transcript with the greeting.
    pub fn apply_init_success(&mut self, response: InitChatResponse, now: DateTime<Utc>) {
        self.messages = vec![Message::assistant_at(response.response, now)];
        self.quick_replies = response.quick_replies;
        self.finish_init();
    }

    pub fn apply_init_failure(&mut self) {
        self.error = Some(INIT_ERROR_MESSAGE.to_string());
        self.finish_init();
    }

    /// Ends the greeting fetch without touching the conversation, for a
    /// greeting that resolves after the user already took a turn.
    pub fn discard_init(&mut self) {
        self.finish_init();
    }

    fn finish_init(&mut self) {
        self.init_pending = false;
        self.refresh_loading();
    }

    fn finish_send(&mut self) {
        self.send_pending = false;
        self.refresh_loading();
    }

    fn refresh_loading(&mut self) {
        self.loading = self.init_pending || self.send_pending;
    }

    /// Applies the optimistic part of a send.
    ///
    /// Clears the per-turn state, appends `user`, raises `loading`, and returns
    /// the transcript as it was before the append (the rollback target).
    pub fn begin_send(&mut self, user: Message) -> Vec<Message> {
        self.quick_replies = None;
        self.calendly_url = None;
        self.error = None;
        self.last_sources = None;
        self.last_tool_used = None;

        let prior = self.messages.clone();
        self.messages.push(user);
        self.send_pending = true;
        self.refresh_loading();
        prior
    }

    /// Replaces the transcript with `sent` plus the assistant reply.
    ///
    /// `sent` is the transcript the request was built from, not the current
    /// one; overlapping sends therefore overwrite each other's view.
    pub fn apply_send_success(
        &mut self,
        sent: Vec<Message>,
        response: ChatResponse,
        now: DateTime<Utc>,
    ) {
        let mut messages = sent;
        messages.push(Message::assistant_at(response.response, now));
        self.messages = messages;

        if let Some(quick_replies) = response.quick_replies {
            self.quick_replies = Some(quick_replies);
        }
        if let Some(calendly_url) = response.calendly_url {
            self.calendly_url = Some(calendly_url);
        }
        self.last_sources = response.sources;
        self.last_tool_used = response.tool_used;
        self.finish_send();
    }

    /// Rolls the transcript back to `prior` and shows the retry message.
    pub fn apply_send_failure(&mut self, prior: Vec<Message>) {
        self.error = Some(SEND_ERROR_MESSAGE.to_string());
        self.messages = prior;
        self.finish_send();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdrchat_types::Role;

    fn greeting() -> InitChatResponse {
        InitChatResponse {
            response: "Hi, I'm Alex".to_string(),
            quick_replies: Some(vec![QuickReply::new("Pricing", "pricing")]),
            is_new_session: true,
        }
    }

    fn user(content: &str) -> Message {
        Message::new(Role::User, content, None)
    }

    #[test]
    fn test_init_success_sets_greeting_and_quick_replies() {
        let mut state = ConversationState::default();
        assert!(state.begin_init());
        assert!(state.loading);

        let now = Utc::now();
        state.apply_init_success(greeting(), now);

        assert_eq!(state.messages, vec![Message::assistant_at("Hi, I'm Alex", now)]);
        assert_eq!(
            state.quick_replies,
            Some(vec![QuickReply::new("Pricing", "pricing")])
        );
        assert!(!state.loading);
        assert!(state.initialized);
    }

    #[test]
    fn test_init_runs_once() {
        let mut state = ConversationState::default();
        assert!(state.begin_init());
        state.apply_init_failure();

        assert!(!state.begin_init());
        assert_eq!(state.error.as_deref(), Some(INIT_ERROR_MESSAGE));
        assert!(state.messages.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn test_saved_transcript_blocks_init() {
        let mut state = ConversationState::default();
        state.adopt_saved(vec![user("hello")]);
        assert!(!state.begin_init());
        assert!(!state.loading);
    }

    #[test]
    fn test_begin_send_clears_turn_state() {
        let mut state = ConversationState {
            messages: vec![Message::new(Role::Assistant, "Hi", None)],
            error: Some(SEND_ERROR_MESSAGE.to_string()),
            quick_replies: Some(vec![QuickReply::new("Pricing", "pricing")]),
            calendly_url: Some("https://calendly.com/x".to_string()),
            last_tool_used: Some("book_demo".to_string()),
            initialized: true,
            ..Default::default()
        };

        let prior = state.begin_send(user("pricing"));

        assert_eq!(prior, vec![Message::new(Role::Assistant, "Hi", None)]);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.quick_replies, None);
        assert_eq!(state.calendly_url, None);
        assert_eq!(state.error, None);
        assert_eq!(state.last_tool_used, None);
        assert!(state.loading);
    }

    #[test]
    fn test_send_success_appends_reply() {
        let mut state = ConversationState::default();
        state.begin_send(user("book a demo"));
        let sent = state.messages.clone();

        let now = Utc::now();
        let response = ChatResponse {
            calendly_url: Some("https://calendly.com/x".to_string()),
            ..ChatResponse::text("Here's my calendar")
        };
        state.apply_send_success(sent, response, now);

        assert_eq!(
            state.messages,
            vec![user("book a demo"), Message::assistant_at("Here's my calendar", now)]
        );
        assert_eq!(state.calendly_url.as_deref(), Some("https://calendly.com/x"));
        assert_eq!(state.quick_replies, None);
        assert!(!state.loading);
    }

    #[test]
    fn test_loading_held_while_greeting_outstanding() {
        let mut state = ConversationState::default();
        assert!(state.begin_init());

        let sent_prior = state.begin_send(user("hello"));
        assert!(sent_prior.is_empty());
        let sent = state.messages.clone();
        state.apply_send_success(sent, ChatResponse::text("reply"), Utc::now());

        // Reply is in but the greeting call is still out
        assert!(state.loading);
        assert_eq!(state.messages.len(), 2);

        state.discard_init();
        assert!(!state.loading);
        assert!(!state.init_pending);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.quick_replies, None);
    }

    #[test]
    fn test_greeting_failure_keeps_loading_for_pending_send() {
        let mut state = ConversationState::default();
        assert!(state.begin_init());
        state.begin_send(user("hello"));

        state.apply_init_failure();
        assert!(state.loading);

        state.apply_send_failure(Vec::new());
        assert!(!state.loading);
    }

    #[test]
    fn test_send_failure_rolls_back() {
        let mut state = ConversationState::default();
        state.adopt_saved(vec![user("earlier")]);

        let prior = state.begin_send(user("lost"));
        state.apply_send_failure(prior);

        assert_eq!(state.messages, vec![user("earlier")]);
        assert_eq!(state.error.as_deref(), Some(SEND_ERROR_MESSAGE));
        assert!(!state.loading);
    }
}
