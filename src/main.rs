// folio - headless runtime and terminal preview for a portfolio page
//
// Hosts the page's client-side behavior without a browser: the document lives
// in memory, timers run on a virtual clock, and events come from a replay
// script or from the terminal preview.
//
// Architecture:
// - dom / viewport / observer: document model, geometry, intersection observers
// - scheduler: deferred tasks keyed by virtual time
// - animate / notify / scroll / nav / theme / lazy / tracking: page components
// - runtime: owns the page, routes events, runs timers, absorbs faults
// - tui (ratatui): interactive preview driven by a tokio select! loop

mod animate;
mod cli;
mod config;
mod demo;
mod dom;
mod events;
mod lazy;
mod linkedin;
mod logging;
mod nav;
mod notify;
mod observer;
mod page;
mod runtime;
mod scheduler;
mod scroll;
mod startup;
mod storage;
mod theme;
mod tracking;
mod tui;
mod viewport;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use logging::{LogBuffer, LogSink};
use page::PageDef;
use runtime::Page;
use std::path::{Path, PathBuf};
use storage::{FileStore, KeyValueStore, MemoryStore};
use viewport::Viewport;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { show, reset, path }) => cli::handle_config(show, reset, path),
        Some(Commands::Run {
            page,
            script,
            viewport,
            memory_store,
            summary,
        }) => run_headless(&page, script.as_deref(), viewport, memory_store, summary),
        Some(Commands::Preview { page, memory_store }) => {
            run_preview(page.as_deref(), memory_store).await
        }
        None => run_preview(None, false).await,
    }
}

/// Load a page, replay a script and print the final snapshot to stdout
fn run_headless(
    page_path: &Path,
    script: Option<&Path>,
    viewport: Option<(f64, f64)>,
    memory_store: bool,
    summary: bool,
) -> Result<()> {
    Config::ensure_config_exists();
    let mut config = Config::load(None)?;
    if let Some((width, height)) = viewport {
        config.layout.viewport_width = width;
        config.layout.viewport_height = height;
    }

    // Keep the guard alive until exit so file logs flush
    let _file_guard = logging::init(&config.logging, LogSink::Stderr, &LogBuffer::new())?;

    cli::require_file(page_path, "Page")?;
    let def = PageDef::load(page_path)?;
    let events = match script {
        Some(path) => {
            cli::require_file(path, "Script")?;
            events::load_script(path)?
        }
        None => Vec::new(),
    };

    let mut page = load_page(&def, &config, memory_store)?;
    startup::print_startup(&page_path.display().to_string(), &page.wiring());

    let skipped = runtime::replay(&mut page, &events);
    tracing::info!(
        "Replayed {} event(s), {} skipped, {} fault(s), t={}ms",
        events.len(),
        skipped,
        page.faults(),
        page.now().as_millis()
    );

    let mut snapshot =
        serde_json::to_value(page.snapshot()).context("Failed to serialize snapshot")?;
    if summary {
        if let Some(map) = snapshot.as_object_mut() {
            map.remove("document");
        }
    }
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Open the interactive preview on a page file or the bundled demo
async fn run_preview(page_path: Option<&Path>, memory_store: bool) -> Result<()> {
    Config::ensure_config_exists();
    let config = Config::load(None)?;

    // The preview owns the screen: logs go to the in-memory buffer
    let log_buffer = LogBuffer::new();
    let _file_guard = logging::init(&config.logging, LogSink::Buffer, &log_buffer)?;

    let (def, label) = match page_path {
        Some(path) => {
            cli::require_file(path, "Page")?;
            (PageDef::load(path)?, path.display().to_string())
        }
        None => (demo::demo_page()?, "built-in demo".to_string()),
    };

    let page = load_page(&def, &config, memory_store)?;
    tracing::info!("Previewing {}", label);

    tui::run_preview(page, &config, log_buffer).await
}

fn load_page(def: &PageDef, config: &Config, memory_store: bool) -> Result<Page> {
    let layout = &config.layout;
    let doc = def.build(layout.viewport_width)?;
    let viewport = Viewport::new(layout.viewport_width, layout.viewport_height);
    let store = open_store(&config.storage.path, memory_store);

    let page = Page::load(doc, config, viewport, store)?;
    startup::log_welcome(def.title.as_deref());
    Ok(page)
}

/// Open the configured store. An unreadable or corrupt file is not fatal:
/// the page runs on an in-memory store and preferences start from defaults.
fn open_store(path: &Path, memory: bool) -> Box<dyn KeyValueStore> {
    if memory {
        return Box::new(MemoryStore::new());
    }
    match FileStore::open(PathBuf::from(path)) {
        Ok(store) => {
            tracing::debug!("Storage: {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!("Storage unavailable, using memory: {:#}", e);
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ColorScheme;

    #[test]
    fn test_corrupt_storage_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut config = Config::default();
        config.storage.path = path.clone();
        let page = load_page(&demo::demo_page().unwrap(), &config, false).unwrap();
        assert_eq!(page.color_scheme(), Some(ColorScheme::Light));
        assert_eq!(page.faults(), 0);

        // The corrupt file is left for the user to inspect
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_readable_storage_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = open_store(&path, false);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }
}
