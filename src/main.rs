//! Foody - browse recipes by meal and diet type
//!
//! A terminal UI that lists recipes from the Spoonacular API, serving the
//! last fetched result from a local cache when it exists or the network fails.

mod app;
mod ui;

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use foody::cache::{CacheManager, LocalCache};
use foody::cli::{Cli, StartupConfig};
use foody::config::{self, Settings};
use foody::data::RecipeClient;
use foody::network::{self, ConnectivityMonitor, NetworkListener};
use foody::preferences::PreferenceStore;
use foody::retrieval::{RecipeRetriever, RetrievalStatus};

use app::{App, AppState};

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Initialize the tracing subscriber for logging
///
/// The interface owns the terminal, so logs go to `foody.log` in the cache
/// directory. In `--print` mode they go to stderr. Use RUST_LOG to control
/// the level (e.g., RUST_LOG=debug).
fn init_tracing(print_only: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if print_only {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
        return None;
    }

    let dir = config::log_dir()?;
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Logging disabled: cannot create {}: {}", dir.display(), e);
        return None;
    }

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, config::LOG_FILE));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match app.state {
        AppState::Loading => {
            ui::render_loading(frame);
        }
        AppState::RecipeList => {
            ui::render_recipe_list(frame, app);
        }
        AppState::FilterSheet => {
            ui::render_recipe_list(frame, app);
            ui::render_filter_sheet(frame, app);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Runs one load and prints the recipe titles
///
/// Fallback recipes are still printed when the fetch fails, but the error
/// makes the process exit unsuccessfully.
async fn run_print(retriever: &RecipeRetriever, force_refresh: bool) -> Result<(), String> {
    match retriever.load_once(force_refresh).await {
        RetrievalStatus::Success(recipes) => {
            for recipe in recipes.iter() {
                println!("{}", recipe.title);
            }
            Ok(())
        }
        RetrievalStatus::Error { message, cached } => {
            for recipe in cached.iter() {
                println!("{}", recipe.title);
            }
            Err(message)
        }
        RetrievalStatus::Loading => Err("load ended without a result".to_string()),
    }
}

/// Runs the terminal interface until the user quits
async fn run_tui(mut app: App, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    // Connectivity: initial probe, then periodic probes feeding the listener
    let listener = Arc::new(NetworkListener::new());
    if settings.monitor.enabled {
        let initially_connected = network::probe(
            &settings.monitor.probe_addr,
            settings.monitor.probe_timeout,
        )
        .await;
        if let Some(stream) = listener.check_network_availability(initially_connected) {
            app.watch_connectivity(stream);
        }
    }
    let monitor = ConnectivityMonitor::spawn(settings.monitor.clone(), Arc::clone(&listener));

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    loop {
        app.process_messages();
        app.dispatch_pending_load();
        app.tick();

        // Render UI
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    monitor.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let startup_config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    let settings = Settings::from_cli(&cli);

    let _log_guard = init_tracing(startup_config.print_only);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting foody");

    if !settings.has_api_key() {
        warn!("No API key configured, only cached recipes are available");
    }

    // Collaborators
    let cache_manager = CacheManager::new();
    if cache_manager.is_none() {
        warn!("No cache directory available, recipes are kept in memory only");
    }
    let cache = Arc::new(LocalCache::open(cache_manager));
    let preferences = Arc::new(PreferenceStore::open());
    let source = Arc::new(RecipeClient::with_base_url(
        settings.api_key.clone(),
        settings.api_url.clone(),
    ));
    let retriever = Arc::new(RecipeRetriever::new(
        source,
        cache.clone(),
        preferences.clone(),
    ));

    let mut app = App::new(Arc::clone(&retriever), preferences, cache);
    app.apply_startup_config(&startup_config);

    if startup_config.print_only {
        if let Err(message) = run_print(&retriever, startup_config.force_refresh).await {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
        return Ok(());
    }

    run_tui(app, &settings).await
}
