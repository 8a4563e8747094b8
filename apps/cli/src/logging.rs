use std::path::Path;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, filter::Targets, fmt, prelude::*};

/// Events with this target also go to the transition journal file.
pub const JOURNAL_TARGET: &str = "journal";

/// Stderr output filtered by `RUST_LOG` or `level`, plus an append-only
/// `transitions.log` in `journal_dir` when given.
pub fn init(level: &str, journal_dir: Option<&Path>) -> Result<()> {
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)));

    let journal = match journal_dir {
        Some(dir) => Some(journal_layer(dir)?),
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr)
        .with(journal)
        .try_init()
        .context("Failed to install tracing subscriber")
}

fn journal_layer<S>(dir: &Path) -> Result<impl tracing_subscriber::Layer<S>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create journal directory: {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("transitions")
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("Failed to open journal in {}", dir.display()))?;

    Ok(fmt::layer()
        .with_ansi(false)
        .with_writer(appender)
        .with_filter(Targets::new().with_target(JOURNAL_TARGET, Level::INFO)))
}
