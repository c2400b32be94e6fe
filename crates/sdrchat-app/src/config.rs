use std::path::PathBuf;
use std::time::Duration;

use sdrchat_chat::SendOrdering;

/// Default location of the file that stands in for browser local storage
pub const DEFAULT_STORE_PATH: &str = ".sdrchat/storage.json";

/// Resolved client settings (CLI flags, environment and `.env` combined)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub store_path: PathBuf,
    pub ordering: SendOrdering,
    pub request_timeout: Option<Duration>,
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: sdrchat_api::DEFAULT_API_BASE.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            ordering: SendOrdering::default(),
            request_timeout: None,
            verbose: false,
        }
    }
}
