//! Terminal rendering of the conversation state.
//!
//! The terminal is append-only, so [`TerminalView`] remembers what it has
//! already printed and turns each new state into the text that brings the
//! screen up to date.

use chrono::Local;
use colored::Colorize;

use sdrchat_chat::ConversationState;
use sdrchat_types::{Message, QuickReply, Role, Source, DEMO_BOOKING_URL};

const ASSISTANT_NAME: &str = "Alex";

pub fn render_header(session_id: &str, api_base: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "💬 EliseAI SDR Assistant".bright_cyan().bold()));
    out.push_str(&format!(
        "{}\n",
        "Powered by AI • Always here to help".bright_black()
    ));
    out.push_str(&format!(
        "{} {}\n",
        "📅 Book a Demo:".bright_blue(),
        DEMO_BOOKING_URL.underline()
    ));
    out.push_str(&format!(
        "{}\n",
        format!("Session: {} • Service: {}", session_id, api_base).bright_black()
    ));
    out
}

pub fn render_help() -> String {
    let mut out = format!("{} Commands:\n", "💡".bright_yellow());
    out.push_str("  <number>   - Send the numbered quick reply\n");
    out.push_str("  /clear     - Clear the conversation (press twice to confirm)\n");
    out.push_str("  /reset     - Clear the conversation and start a new session\n");
    out.push_str("  /session   - Show the session id\n");
    out.push_str("  /help      - Show this help\n");
    out.push_str("  /quit      - Exit\n");
    out
}

/// Message timestamp as local `HH:MM`, empty when the message has none
pub fn format_time(message: &Message) -> String {
    message
        .timestamp
        .map(|ts| ts.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}

pub fn render_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "You:".bright_green().bold(),
        Role::Assistant => format!("{}:", ASSISTANT_NAME).bright_cyan().bold(),
        Role::System => "System:".bright_black().bold(),
    };
    let time = format_time(message);
    if time.is_empty() {
        format!("{} {}\n", speaker, message.content)
    } else {
        format!("{} {} {}\n", time.bright_black(), speaker, message.content)
    }
}

pub fn render_error(error: &str) -> String {
    format!("{} {}\n", "❌".bright_red(), error.red())
}

pub fn render_typing() -> String {
    format!("{}\n", format!("{} is typing...", ASSISTANT_NAME).bright_black().italic())
}

pub fn render_calendly(url: &str) -> String {
    format!(
        "{} {} {}\n",
        "📅".bright_blue(),
        "Schedule your demo:".bright_blue().bold(),
        url.underline()
    )
}

/// Citations backing the latest reply
pub fn render_sources(sources: &[Source]) -> String {
    let mut out = format!("{} {}\n", "📚".bright_blue(), "Sources:".bright_black());
    for source in sources {
        out.push_str(&format!(
            "  {} {}\n",
            "•".bright_black(),
            format!("{}, {} ({})", source.title, source.author, source.date).bright_black()
        ));
    }
    out
}

pub fn render_tool_used(tool: &str) -> String {
    format!("{}\n", format!("🔧 via {}", tool).bright_black())
}

pub fn render_quick_replies(replies: &[QuickReply]) -> String {
    let mut out = String::new();
    for (i, reply) in replies.iter().enumerate() {
        out.push_str(&format!(
            "  {} {}\n",
            format!("[{}]", i + 1).bright_magenta(),
            reply.label
        ));
    }
    out
}

/// Maps a quick reply number to the reply's value.
///
/// Numbers only count while the replies are on screen (present and not
/// loading); anything else is sent as typed.
pub fn resolve_input(input: &str, state: &ConversationState) -> String {
    let input = input.trim();
    if state.loading {
        return input.to_string();
    }

    let picked = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| state.quick_replies.as_ref()?.get(index));

    match picked {
        Some(reply) => reply.value.clone(),
        None => input.to_string(),
    }
}

/// What has been printed so far
#[derive(Debug, Default)]
pub struct TerminalView {
    printed: Vec<Message>,
    loading: bool,
    error: Option<String>,
    calendly_url: Option<String>,
    sources: Option<Vec<Source>>,
    tool_used: Option<String>,
    quick_replies: Option<Vec<QuickReply>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to print for `state`; empty when nothing visible changed.
    pub fn update(&mut self, state: &ConversationState) -> String {
        let mut out = String::new();

        if state.messages.starts_with(&self.printed) {
            for message in &state.messages[self.printed.len()..] {
                out.push_str(&render_message(message));
            }
        } else if self.printed.starts_with(&state.messages) {
            let withdrawn = self.printed.len() - state.messages.len();
            out.push_str(&format!(
                "{}\n",
                format!("↩ {} message(s) withdrawn", withdrawn).yellow()
            ));
        } else {
            // Another reply overwrote the transcript; show it whole
            out.push_str(&format!("{}\n", "─".repeat(40).bright_black()));
            for message in &state.messages {
                out.push_str(&render_message(message));
            }
        }
        self.printed = state.messages.clone();

        if state.last_tool_used != self.tool_used {
            if let Some(tool) = &state.last_tool_used {
                out.push_str(&render_tool_used(tool));
            }
            self.tool_used = state.last_tool_used.clone();
        }

        if state.last_sources != self.sources {
            if let Some(sources) = state.last_sources.as_deref().filter(|s| !s.is_empty()) {
                out.push_str(&render_sources(sources));
            }
            self.sources = state.last_sources.clone();
        }

        if state.error != self.error {
            if let Some(error) = &state.error {
                out.push_str(&render_error(error));
            }
            self.error = state.error.clone();
        }

        if state.loading && !self.loading {
            out.push_str(&render_typing());
        }
        self.loading = state.loading;

        if state.calendly_url != self.calendly_url {
            if let Some(url) = &state.calendly_url {
                out.push_str(&render_calendly(url));
            }
            self.calendly_url = state.calendly_url.clone();
        }

        let visible = if state.loading {
            None
        } else {
            state.quick_replies.clone()
        };
        if visible != self.quick_replies {
            if let Some(replies) = &visible {
                out.push_str(&render_quick_replies(replies));
            }
        }
        self.quick_replies = visible;

        out
    }
}
