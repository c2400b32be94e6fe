use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use sdrchat_api::ChatApi;
use sdrchat_chat::{ChatController, ClearConfirm, ClearOutcome, CLEAR_CONFIRM_WINDOW};
use sdrchat_storage::KeyValueStore;

use crate::app::setup::{build_api, open_store};
use crate::config::ClientConfig;
use crate::render::{render_header, render_help, resolve_input, TerminalView};

/// Run interactive REPL mode
pub async fn run_repl_mode(config: ClientConfig) -> Result<()> {
    let store: Arc<dyn KeyValueStore> = open_store(&config)?;
    let api: Arc<dyn ChatApi> = Arc::new(build_api(&config)?);

    let mut controller = ChatController::new(api, store, config.ordering);

    print!("{}", render_header(controller.session_id(), &config.api_base));
    println!(
        "{}",
        "Type /help for commands, /quit to exit\n".bright_black()
    );
    if config.verbose {
        println!(
            "{}",
            format!("🔧 DEBUG: reply ordering: {}", controller.ordering()).bright_black()
        );
    }

    let mut renderer = mount(&controller);

    let (line_tx, mut lines) = mpsc::unbounded_channel();
    spawn_line_reader(line_tx);

    let mut clear = ClearConfirm::new();

    while let Some(line) = lines.recv().await {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        match line {
            "/quit" | "/exit" | "quit" | "exit" => {
                println!("{}", "Goodbye!".bright_cyan());
                break;
            }
            "/help" => {
                print!("{}", render_help());
                continue;
            }
            "/session" => {
                println!("{} {}", "🆔".bright_cyan(), controller.session_id());
                continue;
            }
            "/clear" => {
                match clear.press(Instant::now()) {
                    ClearOutcome::Armed => {
                        println!(
                            "{} Type /clear again within {}s to confirm",
                            "⚠️".yellow(),
                            CLEAR_CONFIRM_WINDOW.as_secs()
                        );
                    }
                    ClearOutcome::Confirmed => {
                        log::info!("Clearing conversation for {}", controller.session_id());
                        renderer.abort();
                        controller = controller.clear_and_remount();
                        println!("{} Conversation cleared", "🗑️".bright_green());
                        renderer = mount(&controller);
                    }
                }
                continue;
            }
            "/reset" => {
                log::info!("Resetting session {}", controller.session_id());
                renderer.abort();
                clear.disarm();
                controller = controller.reset_session_and_remount();
                println!(
                    "{} Started a new session: {}",
                    "🔄".bright_green(),
                    controller.session_id()
                );
                renderer = mount(&controller);
                continue;
            }
            _ => {}
        }

        let content = resolve_input(line, &controller.snapshot());
        let sender = controller.clone();
        tokio::spawn(async move {
            sender.send_message(&content).await;
        });
    }

    renderer.abort();
    Ok(())
}

/// Starts rendering `controller` and bootstraps it
fn mount(controller: &ChatController) -> JoinHandle<()> {
    let mut updates = controller.subscribe();
    let renderer = tokio::spawn(async move {
        let mut view = TerminalView::new();
        loop {
            let state = updates.borrow_and_update().clone();
            let out = view.update(&state);
            if !out.is_empty() {
                print!("{}", out);
                let _ = std::io::stdout().flush();
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    });

    let bootstrapping = controller.clone();
    tokio::spawn(async move {
        bootstrapping.bootstrap().await;
    });

    renderer
}

/// Reads lines on a blocking thread so sends and rendering keep running
/// while the user types.
fn spawn_line_reader(lines: mpsc::UnboundedSender<String>) {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("{} Failed to start line editor: {}", "❌".bright_red(), e);
                return;
            }
        };

        let prompt = format!("{} ", "You:".bright_green().bold());
        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    if lines.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("{} Input error: {}", "❌".bright_red(), e);
                    break;
                }
            }
        }
    });
}
