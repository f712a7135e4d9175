//! atomic-diff - print item-level diff records between two JSON lists

mod config;
mod json;
mod render;

use anyhow::{Context, Result};
use atomic_diff_core::AtomicDiffEngine;
use clap::Parser;
use config::{Config, OutputFormat};
use json::JsonCallback;
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "atomic-diff")]
#[command(author, version, about = "Item-level diff between two JSON arrays")]
struct Args {
    /// JSON file holding the old list
    old: PathBuf,

    /// JSON file holding the new list
    new: PathBuf,

    /// JSON pointer to the identity field (e.g. /id)
    #[arg(short, long)]
    key: Option<String>,

    /// Report moved items as removals and insertions
    #[arg(long)]
    no_moves: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Config file (defaults to <config_dir>/atomic-diff/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(key) = &self.key {
            config.key = key.clone();
        }
        if self.no_moves {
            config.detect_moves = false;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        config
    }
}

fn read_list(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.apply(Config::load(args.config.as_deref())?);
    tracing::debug!(?config, "loaded configuration");

    let old = read_list(&args.old)?;
    let new = read_list(&args.new)?;

    let callback = JsonCallback::new(&config.key);
    let result = AtomicDiffEngine::new()
        .with_detect_moves(config.detect_moves)
        .calculate(&old, &new, &callback);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match config.format {
        OutputFormat::Text => render::write_text(&mut out, &result, &callback)?,
        OutputFormat::Json => render::write_json(&mut out, &result)?,
    }
    out.flush()?;
    Ok(())
}
