//! liri-menu - restaurant menu renderer
//!
//! `render` runs one render cycle and prints (or writes) the HTML,
//! `serve` exposes fragments over HTTP, `cache clear` drops cached payloads.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use liri_common::config::{ConfigResolver, TomlConfig};
use liri_menu::cache::CacheStore;
use liri_menu::mount::{PageDocument, SectionOutcome};
use liri_menu::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for liri-menu
#[derive(Parser, Debug)]
#[command(name = "liri-menu")]
#[command(about = "Restaurant menu renderer")]
#[command(version)]
struct Args {
    /// Config file (overrides LIRI_MENU_CONFIG and the default location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one render cycle and print the page HTML
    Render {
        /// Only render this section (display name or mount suffix)
        #[arg(short, long)]
        section: Option<String>,

        /// Write one <section>.html per section into this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Serve menu fragments over HTTP
    Serve {
        /// Address to bind (overrides [server] bind)
        #[arg(short, long, env = "LIRI_MENU_BIND")]
        bind: Option<String>,
    },

    /// Manage the payload cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Remove every cached payload
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = ConfigResolver::new(args.config.clone());
    let config = resolver.load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("liri_menu={0},liri_common={0}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting liri-menu v{}", env!("CARGO_PKG_VERSION"));
    match resolver.config_path() {
        Some(path) => info!("Configuration: {}", path.display()),
        None => info!("Configuration: compiled defaults"),
    }

    match args.command {
        Command::Render { section, out } => render(&config, section.as_deref(), out.as_deref()).await,
        Command::Serve { bind } => serve(&config, bind).await,
        Command::Cache {
            action: CacheAction::Clear,
        } => {
            let removed = CacheStore::from_config(&config.cache).clear();
            info!(removed, "Cleared payload cache");
            println!("Removed {} cached payload(s)", removed);
            Ok(())
        }
    }
}

async fn render(config: &TomlConfig, section: Option<&str>, out: Option<&Path>) -> Result<()> {
    let state = AppState::from_config(config)?;

    let only = match section {
        Some(name) => Some(
            state
                .find_section(name)
                .cloned()
                .with_context(|| format!("Unknown section '{}'", name))?,
        ),
        None => None,
    };

    let (page, report) = state.render(only.as_ref()).await;
    for (name, outcome) in &report.sections {
        if let SectionOutcome::Error(message) = outcome {
            warn!(section = %name, "Section failed: {}", message);
        }
    }

    match out {
        Some(dir) => write_sections(&state, &page, only.as_ref().map(|s| s.name.as_str()), dir)?,
        None => {
            let html = match &only {
                Some(section) => page.section_html(&section.mount).unwrap_or_default(),
                None => page.to_html(),
            };
            println!("{}", html);
        }
    }

    info!(
        sections = report.sections.len(),
        failed = report.failed(),
        "Render cycle complete"
    );
    Ok(())
}

/// One `<section>.html` file per rendered section
fn write_sections(state: &AppState, page: &PageDocument, only: Option<&str>, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    for section in state.sections.iter() {
        if only.is_some_and(|name| name != section.name) {
            continue;
        }
        let Some(html) = page.section_html(&section.mount) else {
            continue;
        };
        let file_name = format!("{}.html", section.name.replace(char::is_whitespace, "-"));
        let path = dir.join(file_name);
        std::fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(section = %section.name, path = %path.display(), "Wrote section");
    }
    Ok(())
}

async fn serve(config: &TomlConfig, bind: Option<String>) -> Result<()> {
    let state = AppState::from_config(config)?;
    info!(
        sections = state.sections.len(),
        language = %state.controller.language(),
        "Menu pipeline ready"
    );
    let app = build_router(state);

    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("liri-menu listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
