//! Terminal front end for sdrchat
//!
//! Wires the conversation controller to a file-backed store and the HTTP chat
//! service, and renders its state in an interactive REPL.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod render;

pub use cli::{Cli, Commands, OrderingArg};
pub use config::ClientConfig;
