#![cfg_attr(not(windows), allow(dead_code))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use resizer_window_state::{Desktop, Selection, Transition};

mod commands;
mod config;
mod logging;
mod session;

use commands::{ResizeArgs, TargetArgs};
use config::Config;

#[derive(Parser)]
#[command(name = "window-resizer")]
#[command(about = "Resize, maximize, fullscreen and restore other applications' windows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Overrides the config file's log level; `RUST_LOG` wins over both
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Don't append to the transition journal
    #[arg(long, global = true)]
    no_journal: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List windows that can be targeted
    List {
        #[arg(long)]
        json: bool,
    },

    /// Print a window's geometry, monitor and DPI
    Info {
        #[command(flatten)]
        target: TargetArgs,

        #[arg(long)]
        json: bool,
    },

    Resize {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        size: ResizeArgs,
    },

    Maximize {
        #[command(flatten)]
        target: TargetArgs,
    },

    Minimize {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Borderless fullscreen on the window's monitor
    Fullscreen {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Restore a maximized or minimized window
    Restore {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Interactive loop that keeps undo history between commands
    Session {
        #[command(flatten)]
        target: TargetArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref())?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log.level);
    let journal_dir = (config.log.journal && !cli.no_journal)
        .then(|| config.journal_directory())
        .flatten();
    logging::init(level, journal_dir.as_deref())?;

    run_native(cli.command, &config)
}

#[cfg(windows)]
fn run_native(command: Commands, config: &Config) -> Result<()> {
    use resizer_window_state::platform::{Win32Desktop, enable_per_monitor_dpi_awareness};

    enable_per_monitor_dpi_awareness();
    run(Win32Desktop, command, config)
}

#[cfg(not(windows))]
fn run_native(_command: Commands, _config: &Config) -> Result<()> {
    anyhow::bail!("window-resizer only supports Windows")
}

fn run<D: Desktop + Clone>(desktop: D, command: Commands, config: &Config) -> Result<()> {
    let options = config.transition_options();
    let mut out = std::io::stdout().lock();

    match command {
        Commands::List { json } => commands::list(desktop, json, &mut out),
        Commands::Info { target, json } => {
            let selection = commands::select(desktop, &target)?;
            commands::info(&selection, &options, json, &mut out)
        }
        Commands::Resize { target, size } => {
            let transition = size.transition()?;
            let mut selection = commands::select(desktop, &target)?;
            commands::apply(&mut selection, transition, &size.options(options), &mut out)
        }
        Commands::Maximize { target } => {
            let mut selection = commands::select(desktop, &target)?;
            commands::apply(&mut selection, Transition::Maximize, &options, &mut out)
        }
        Commands::Minimize { target } => {
            let mut selection = commands::select(desktop, &target)?;
            commands::apply(&mut selection, Transition::Minimize, &options, &mut out)
        }
        Commands::Fullscreen { target } => {
            let mut selection = commands::select(desktop, &target)?;
            commands::apply(&mut selection, Transition::Fullscreen, &options, &mut out)
        }
        Commands::Restore { target } => {
            // A fresh session has no record, so undo is a plain restore.
            let mut selection = commands::select(desktop, &target)?;
            commands::undo(&mut selection, options.activate, &mut out)
        }
        Commands::Session { target } => {
            let mut selection = if target.is_empty() {
                let mut selection = Selection::new(desktop);
                selection.refresh()?;
                selection
            } else {
                commands::select(desktop, &target)?
            };

            commands::write_targets(selection.targets(), selection.selected_index(), false, &mut out)?;
            session::run(&mut selection, &options, std::io::stdin().lock(), &mut out)
        }
    }
}
