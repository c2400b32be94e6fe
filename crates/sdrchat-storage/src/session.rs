//! Session identifier management.
//!
//! The identifier correlates this profile's conversation with backend-side
//! session state. It is not a credential.

use chrono::Utc;
use sdrchat_types::SESSION_KEY;
use uuid::Uuid;

use crate::error::Result;
use crate::store::KeyValueStore;

const RANDOM_SUFFIX_LEN: usize = 13;

/// Builds `session_{unix_millis}_{random}`
pub fn generate_session_id() -> String {
    let timestamp = Utc::now().timestamp_millis();
    let random: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(RANDOM_SUFFIX_LEN)
        .collect();
    format!("session_{}_{}", timestamp, random)
}

/// Returns the stored identifier, creating and persisting one on first use.
pub fn get_or_create_session_id(store: &dyn KeyValueStore) -> Result<String> {
    if let Some(existing) = store.get(SESSION_KEY)? {
        if !existing.is_empty() {
            return Ok(existing);
        }
    }

    let session_id = generate_session_id();
    store.set(SESSION_KEY, &session_id)?;
    log::info!("Created new session {}", session_id);
    Ok(session_id)
}

/// Forgets the identifier so the next read creates a fresh one.
pub fn clear_session_id(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(SESSION_KEY)
}
