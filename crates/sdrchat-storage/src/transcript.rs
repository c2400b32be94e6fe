//! Transcript persistence and the clear-chat utilities.

use sdrchat_types::{Message, MESSAGES_KEY};

use crate::error::Result;
use crate::session::clear_session_id;
use crate::store::KeyValueStore;

/// Reads the stored transcript.
///
/// `Ok(None)` means nothing was stored. Data that does not parse is reported
/// as [`StoreError::Json`](crate::StoreError::Json) so the caller can log it
/// and carry on as if nothing were stored.
pub fn load_transcript(store: &dyn KeyValueStore) -> Result<Option<Vec<Message>>> {
    match store.get(MESSAGES_KEY)? {
        Some(saved) => Ok(Some(serde_json::from_str(&saved)?)),
        None => Ok(None),
    }
}

/// Writes the full transcript as JSON
pub fn save_transcript(store: &dyn KeyValueStore, messages: &[Message]) -> Result<()> {
    let json = serde_json::to_string(messages)?;
    store.set(MESSAGES_KEY, &json)
}

/// Removes the stored transcript, keeping the session identifier.
pub fn clear_messages(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(MESSAGES_KEY)
}

/// Removes both the transcript and the session identifier.
pub fn clear_session(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(MESSAGES_KEY)?;
    clear_session_id(store)
}

/// True when a parseable, non-empty transcript is stored
pub fn has_messages(store: &dyn KeyValueStore) -> bool {
    matches!(load_transcript(store), Ok(Some(messages)) if !messages.is_empty())
}
