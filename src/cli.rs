// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - run: headless replay of a page and an event script, prints a JSON snapshot
// - preview: interactive terminal preview (the default)
// - config --show|--path|--reset: configuration management

use crate::config::{parse_viewport_size, Config, VERSION};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// folio - headless runtime and terminal preview for portfolio pages
#[derive(Parser)]
#[command(name = "folio")]
#[command(version = VERSION)]
#[command(about = "Headless runtime and terminal preview for portfolio pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a page, replay events and print the final state as JSON
    Run {
        /// Page description (.toml or .json)
        page: PathBuf,

        /// JSON Lines event script
        #[arg(long)]
        script: Option<PathBuf>,

        /// Viewport size, e.g. 390x844
        #[arg(long, value_parser = parse_viewport_arg)]
        viewport: Option<(f64, f64)>,

        /// Keep storage in memory instead of the configured file
        #[arg(long)]
        memory_store: bool,

        /// Print only the page state, without the document tree
        #[arg(long)]
        summary: bool,
    },

    /// Open the interactive terminal preview
    Preview {
        /// Page description; the built-in demo page when omitted
        page: Option<PathBuf>,

        /// Keep storage in memory instead of the configured file
        #[arg(long)]
        memory_store: bool,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn parse_viewport_arg(s: &str) -> Result<(f64, f64), String> {
    parse_viewport_size(s).ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))
}

/// Handle `folio config`
pub fn handle_config(show: bool, reset: bool, path: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show()
    } else if reset {
        handle_config_reset()
    } else {
        // No flag provided, show help
        println!("Usage: folio config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow!("Could not determine config path"))?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::load(None)?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow!("Could not determine config path"))?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read confirmation")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    // Write the default config (using Config's single source of truth)
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

/// Fail early with a readable message when a path argument does not exist
pub fn require_file(path: &std::path::Path, what: &str) -> Result<()> {
    if !path.is_file() {
        bail!("{} not found: {}", what, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "folio",
            "run",
            "page.toml",
            "--script",
            "events.jsonl",
            "--viewport",
            "390x844",
            "--memory-store",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Run {
                page,
                script,
                viewport,
                memory_store,
                summary,
            }) => {
                assert_eq!(page, PathBuf::from("page.toml"));
                assert_eq!(script, Some(PathBuf::from("events.jsonl")));
                assert_eq!(viewport, Some((390.0, 844.0)));
                assert!(memory_store);
                assert!(!summary);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_bad_viewport_is_rejected() {
        assert!(Cli::try_parse_from(["folio", "run", "p.toml", "--viewport", "big"]).is_err());
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["folio"]).unwrap();
        assert!(cli.command.is_none());
    }
}
