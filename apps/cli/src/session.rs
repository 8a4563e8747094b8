use std::io::{BufRead, Write};

use anyhow::{Result, anyhow, bail};
use resizer_window_state::{Desktop, Selection, Transition, TransitionOptions};
use tracing::warn;

use crate::commands;

const HELP: &str = "\
list            show the window list
refresh         re-enumerate windows, keeping the selection when possible
select N        work on entry N of the list
size W H        resize the outer frame
client W H      resize so the client area is W x H
max | min       maximize or minimize
full            borderless fullscreen on the current monitor
undo            revert the last change
show            print the selected window's geometry
help            this text
quit            leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Refresh,
    Select(usize),
    Apply(Transition),
    Undo,
    Show,
    Help,
    Quit,
}

impl std::str::FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("Empty command");
        };
        let args = words.collect::<Vec<_>>();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("list" | "ls", []) => Self::List,
            ("refresh", []) => Self::Refresh,
            ("select", [index]) => Self::Select(
                index
                    .parse()
                    .map_err(|_| anyhow!("'{index}' is not a list index"))?,
            ),
            ("size", [w, h]) => Self::Apply(Transition::WindowSize(size(w, h)?)),
            ("client", [w, h]) => Self::Apply(Transition::ClientSize(size(w, h)?)),
            ("max", []) => Self::Apply(Transition::Maximize),
            ("min", []) => Self::Apply(Transition::Minimize),
            ("full", []) => Self::Apply(Transition::Fullscreen),
            ("undo", []) => Self::Undo,
            ("show", []) => Self::Show,
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            (verb, _) => bail!("Unknown command or wrong arguments: '{verb}', try 'help'"),
        };

        Ok(command)
    }
}

fn size(width: &str, height: &str) -> Result<resizer_window_state::Size> {
    let parse = |value: &str| {
        value
            .parse::<i32>()
            .map_err(|_| anyhow!("'{value}' is not a number"))
    };
    commands::parse_size(parse(width)?, parse(height)?)
}

/// Reads commands from `input` until `quit` or end of input. Failed commands are reported
/// and the loop carries on.
pub fn run<D: Desktop + Clone>(
    selection: &mut Selection<D>,
    options: &TransitionOptions,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            let command = line.parse::<Command>();
            match command.and_then(|command| execute(selection, options, command, out)) {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => {
                    warn!("{e:#}");
                    writeln!(out, "error: {e:#}")?;
                }
            }
        }

        write!(out, "> ")?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}

/// Returns `false` once the loop should stop.
fn execute<D: Desktop + Clone>(
    selection: &mut Selection<D>,
    options: &TransitionOptions,
    command: Command,
    out: &mut impl Write,
) -> Result<bool> {
    match command {
        Command::List => {
            commands::write_targets(selection.targets(), selection.selected_index(), false, out)?
        }
        Command::Refresh => {
            selection.refresh()?;
            commands::write_targets(selection.targets(), selection.selected_index(), false, out)?;
        }
        Command::Select(index) => {
            selection
                .select(index)
                .map_err(|_| anyhow!("No entry {index}, the list has {}", selection.targets().len()))?;
            commands::info(selection, options, false, out)?;
        }
        Command::Apply(transition) => commands::apply(selection, transition, options, out)?,
        Command::Undo => commands::undo(selection, options.activate, out)?,
        Command::Show => commands::info(selection, options, false, out)?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(false),
    }

    Ok(true)
}
