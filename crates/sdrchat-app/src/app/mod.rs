pub mod repl;
pub mod setup;

pub use repl::run_repl_mode;
pub use setup::{build_api, open_store, setup_from_cli};
