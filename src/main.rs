//! Pomodoro session sync CLI.
//!
//! One timer shared across devices:
//! - `start`/`break`/`stop` mutate the session and push it everywhere
//! - `status`/`widget` read the local mirror without touching the network
//! - `run` keeps a live countdown while syncing in the background

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{CommandFactory, Parser};
use tokio::sync::Mutex;
use tokio::time::Duration;

use pomosync::cli::{Cli, Commands, Display};
use pomosync::companion::{CompanionListener, SocketCompanion};
use pomosync::config::AppConfig;
use pomosync::mirror::FileMirror;
use pomosync::remote::HttpRemoteStore;
use pomosync::session::SessionManager;
use pomosync::sync::SyncEngine;
use pomosync::widget::build_timeline;

/// Fully-wired manager for this platform.
type AppManager = SessionManager<FileMirror, Option<HttpRemoteStore>, Option<SocketCompanion>>;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    // Set verbose logging if requested
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path).context("Failed to load configuration")?,
        None => AppConfig::load().context("Failed to load configuration")?,
    };

    match cli.command {
        Some(Commands::Start(args)) => {
            let mut manager = build_manager(&config)?;
            load_mirror(&mut manager);
            manager.start(false, args.minutes * 60).await?;
            Display::show_started(manager.state(), Utc::now());
        }
        Some(Commands::Break(args)) => {
            let mut manager = build_manager(&config)?;
            load_mirror(&mut manager);
            manager.start(true, args.minutes * 60).await?;
            Display::show_started(manager.state(), Utc::now());
        }
        Some(Commands::Stop) => {
            let mut manager = build_manager(&config)?;
            load_mirror(&mut manager);
            manager.stop().await;
            Display::show_stopped();
        }
        Some(Commands::Status) => {
            let mut manager = build_manager(&config)?;
            load_mirror(&mut manager);
            Display::show_status(manager.state(), Utc::now());
        }
        Some(Commands::Run) => {
            run_sync_loop(&config).await?;
        }
        Some(Commands::Widget) => {
            let mut manager = build_manager(&config)?;
            load_mirror(&mut manager);
            let timeline = build_timeline(manager.state(), Utc::now());
            Display::show_timeline(&timeline);
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Wires a manager with the capabilities the configuration enables.
fn build_manager(config: &AppConfig) -> Result<AppManager> {
    let mirror = FileMirror::new(
        config
            .mirror
            .resolved_group_dir()
            .context("Failed to resolve the mirror directory")?,
    );

    let remote = if config.remote.enabled {
        Some(
            HttpRemoteStore::new(
                &config.remote.base_url,
                &config.remote.container,
                &config.remote.record_id,
            )
            .context("Failed to create the remote store client")?,
        )
    } else {
        None
    };

    let companion = if config.companion.enabled {
        Some(SocketCompanion::new(
            config
                .companion
                .resolved_socket_path()
                .context("Failed to resolve the companion socket path")?,
            config
                .companion
                .resolved_context_path()
                .context("Failed to resolve the companion context path")?,
        ))
    } else {
        None
    };

    Ok(SessionManager::new(mirror, remote, companion))
}

/// Seeds the manager from the local mirror, starting idle when it fails.
fn load_mirror(manager: &mut AppManager) {
    if let Err(e) = manager.load_from_mirror() {
        tracing::warn!(error = %e, "Local mirror read failed, starting idle");
    }
}

/// Runs the sync loop with a live countdown until Ctrl-C.
async fn run_sync_loop(config: &AppConfig) -> Result<()> {
    let mut manager = build_manager(config)?;
    load_mirror(&mut manager);

    // This process is the companion's peer, so it also listens.
    let listener = if config.companion.enabled {
        let socket_path = config
            .companion
            .resolved_socket_path()
            .context("Failed to resolve the companion socket path")?;
        Some(CompanionListener::bind(&socket_path).context("Failed to bind the companion socket")?)
    } else {
        None
    };

    let catch_up = manager.companion().clone();
    let manager = Arc::new(Mutex::new(manager));

    let mut engine = SyncEngine::new(manager.clone(), Duration::from_secs(config.sync.poll_seconds));
    let trigger = engine.trigger_handle();

    // Catch up on a context slot written while this device was off, then
    // force one refresh instead of waiting out the first poll interval.
    if let Some(companion) = &catch_up {
        engine.catch_up_context(companion).await;
    }
    trigger.foreground();

    let sync_task = tokio::spawn(async move {
        engine.run(listener).await;
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(config.sync.tick_seconds));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let manager = manager.lock().await;
                Display::show_countdown(manager.state(), Utc::now());
            }
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                println!();
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    sync_task.abort();
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
