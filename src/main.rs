mod action;
mod api;
mod app;
mod auth;
mod backend;
mod config;
mod error;
mod event;
mod loader;
mod store;
mod tui;
mod types;
mod ui;

use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::api::HttpBackend;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::store::Store;
use crate::tui::EventHandler;

#[derive(Parser, Debug)]
#[command(name = "stall", about = "Terminal client for a group-buy marketplace")]
struct Cli {
    /// Backend base URL, overriding the config file
    #[arg(long)]
    base_url: Option<String>,

    /// Sign in as this user id (remembered for later runs)
    #[arg(long)]
    user: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let config = Config::load();
    let base_url = cli
        .base_url
        .unwrap_or_else(|| config.backend.base_url.clone());
    let token = auth::load_token(&config.backend);

    let backend = HttpBackend::new(&base_url, token)?;

    let store = Store::open_default().ok_or("could not resolve a user data directory")?;
    if let Some(user) = cli.user {
        store.set_current_user_id(user);
    }

    // Run the application
    let result = run(backend, store).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run(backend: HttpBackend, store: Store) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize terminal
    let mut terminal = tui::init()?;

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create app state
    let mut app = App::new(Arc::new(backend), store, action_tx.clone());

    // Create event handler
    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    // Main loop
    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
