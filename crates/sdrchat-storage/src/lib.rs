//! Persistence for sdrchat
//!
//! A small key-value port with in-memory and file-backed implementations,
//! plus the session identifier and transcript helpers built on top of it.

pub mod error;
pub mod file_store;
pub mod session;
pub mod store;
pub mod transcript;

pub use error::{Result, StoreError};
pub use file_store::JsonFileStore;
pub use session::{clear_session_id, generate_session_id, get_or_create_session_id};
pub use store::{KeyValueStore, MemoryStore};
pub use transcript::{clear_messages, clear_session, has_messages, load_transcript, save_transcript};
