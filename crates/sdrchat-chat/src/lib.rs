//! Conversation state management for sdrchat
//!
//! [`ChatController`] owns the transcript and the per-turn UI state,
//! [`ConversationState`] holds the pure transitions it applies, and
//! [`ClearConfirm`] implements the two-step "clear chat" gesture.

pub mod clear;
pub mod controller;
pub mod state;

pub use clear::{ClearConfirm, ClearOutcome, ClearState, CLEAR_CONFIRM_WINDOW};
pub use controller::{ChatController, SendOrdering};
pub use state::ConversationState;
