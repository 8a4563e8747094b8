use std::io::Write;

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use resizer_window_state::{
    Desktop, Rect, Selection, Size, Target, Transition, TransitionOptions, UndoOutcome,
    WindowHandle, WindowMetrics, geometry, monitor,
};
use serde::Serialize;

#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct TargetArgs {
    /// Process id owning the window
    #[arg(long)]
    pub pid: Option<u32>,

    /// Process name, with or without `.exe`
    #[arg(long)]
    pub process: Option<String>,
}

impl TargetArgs {
    pub fn is_empty(&self) -> bool {
        self.pid.is_none() && self.process.is_none()
    }

    /// First entry owned by the requested process.
    pub fn find(&self, targets: &[Target]) -> Option<usize> {
        if let Some(pid) = self.pid {
            return targets.iter().position(|t| t.process.pid == pid);
        }

        let wanted = self.process.as_deref()?;
        let wanted = strip_exe(wanted);
        targets
            .iter()
            .position(|t| strip_exe(&t.process.name).eq_ignore_ascii_case(wanted))
    }

    fn describe(&self) -> String {
        match (&self.pid, &self.process) {
            (Some(pid), _) => format!("pid {pid}"),
            (None, Some(name)) => format!("process '{name}'"),
            (None, None) => "nothing".to_string(),
        }
    }
}

fn strip_exe(name: &str) -> &str {
    let len = name.len();
    if len > 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".exe") {
        &name[..len - 4]
    } else {
        name
    }
}

#[derive(Args, Debug, Clone)]
pub struct ResizeArgs {
    #[arg(long)]
    pub width: i32,

    #[arg(long)]
    pub height: i32,

    /// Treat the size as the client area instead of the outer frame
    #[arg(long)]
    pub client: bool,

    /// Keep the top-left corner instead of the centre
    #[arg(long)]
    pub no_center: bool,

    /// Don't bring the window to the foreground
    #[arg(long)]
    pub no_activate: bool,
}

impl ResizeArgs {
    pub fn transition(&self) -> Result<Transition> {
        let size = parse_size(self.width, self.height)?;
        Ok(if self.client {
            Transition::ClientSize(size)
        } else {
            Transition::WindowSize(size)
        })
    }

    pub fn options(&self, base: TransitionOptions) -> TransitionOptions {
        TransitionOptions {
            center: base.center && !self.no_center,
            activate: base.activate && !self.no_activate,
            ..base
        }
    }
}

pub fn parse_size(width: i32, height: i32) -> Result<Size> {
    if width <= 0 || height <= 0 {
        bail!("Size must be positive, got {width}x{height}");
    }
    Ok(Size::new(width, height))
}

/// Enumerates windows and selects the one `target` asks for.
pub fn select<D: Desktop + Clone>(desktop: D, target: &TargetArgs) -> Result<Selection<D>> {
    if target.is_empty() {
        bail!("Pass --pid or --process to pick a window");
    }

    let mut selection = Selection::new(desktop);
    selection.refresh().context("Failed to enumerate windows")?;

    let index = target
        .find(selection.targets())
        .ok_or_else(|| anyhow!("No window found for {}", target.describe()))?;
    selection.select(index)?;

    Ok(selection)
}

#[derive(Serialize)]
struct ListEntry<'a> {
    index: usize,
    #[serde(flatten)]
    target: &'a Target,
}

pub fn list<D: Desktop + Clone>(desktop: D, json: bool, out: &mut impl Write) -> Result<()> {
    let mut selection = Selection::new(desktop);
    selection.refresh().context("Failed to enumerate windows")?;
    write_targets(selection.targets(), None, json, out)
}

pub fn write_targets(
    targets: &[Target],
    selected: Option<usize>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    if json {
        let entries = targets
            .iter()
            .enumerate()
            .map(|(index, target)| ListEntry { index, target })
            .collect::<Vec<_>>();
        serde_json::to_writer_pretty(&mut *out, &entries)?;
        writeln!(out)?;
        return Ok(());
    }

    if targets.is_empty() {
        writeln!(out, "No windows")?;
        return Ok(());
    }

    for (index, target) in targets.iter().enumerate() {
        let marker = if selected == Some(index) { '*' } else { ' ' };
        writeln!(
            out,
            "{marker}{index:>3}  {:>6}  {:>2}  {:<24} {}",
            target.process.pid, target.process.session_id, target.process.name, target.label
        )?;
    }

    Ok(())
}

#[derive(Serialize)]
struct WindowReport {
    handle: WindowHandle,
    window: Rect,
    #[serde(flatten)]
    metrics: WindowMetrics,
    monitor: Rect,
    work_area: Rect,
    dpi: Option<u32>,
    undo_available: bool,
}

fn report<D: Desktop + Clone>(
    selection: &Selection<D>,
    options: &TransitionOptions,
) -> Result<WindowReport> {
    let session = selection
        .session()
        .ok_or_else(|| anyhow!("No window selected"))?;
    let desktop = session.desktop();
    let handle = session.handle();

    let screen = monitor::monitor_from_window(desktop, handle, options.monitor_fallback)?;

    Ok(WindowReport {
        handle,
        window: geometry::window_rect(desktop, handle)?,
        metrics: session.metrics()?,
        monitor: monitor::bounds(desktop, screen)?,
        work_area: monitor::work_area(desktop, screen)?,
        dpi: desktop.dpi_for_window(handle),
        undo_available: session.undo_available(),
    })
}

pub fn info<D: Desktop + Clone>(
    selection: &Selection<D>,
    options: &TransitionOptions,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let report = report(selection, options)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "handle:    {}", report.handle)?;
    writeln!(out, "window:    {}", report.window)?;
    writeln!(out, "outer:     {}", report.metrics.outer)?;
    writeln!(out, "client:    {}", report.metrics.client)?;
    writeln!(out, "monitor:   {}", report.monitor)?;
    writeln!(out, "work area: {}", report.work_area)?;
    match report.dpi {
        Some(dpi) => writeln!(out, "dpi:       {dpi}")?,
        None => writeln!(out, "dpi:       unknown")?,
    }
    writeln!(
        out,
        "undo:      {}",
        if report.undo_available { "available" } else { "none" }
    )?;

    Ok(())
}

pub fn apply<D: Desktop + Clone>(
    selection: &mut Selection<D>,
    transition: Transition,
    options: &TransitionOptions,
    out: &mut impl Write,
) -> Result<()> {
    selection
        .apply(transition, options)
        .with_context(|| format!("Failed to apply {transition}"))?;

    match transition {
        Transition::Minimize => writeln!(out, "Applied {transition}")?,
        _ => {
            let metrics = selection.metrics()?;
            writeln!(
                out,
                "Applied {transition}: outer {}, client {}",
                metrics.outer, metrics.client
            )?;
        }
    }

    Ok(())
}

pub fn undo<D: Desktop + Clone>(
    selection: &mut Selection<D>,
    activate: bool,
    out: &mut impl Write,
) -> Result<()> {
    let outcome = selection.undo(activate).context("Failed to undo")?;

    let message = match outcome {
        UndoOutcome::LeftFullscreen => "Left fullscreen",
        UndoOutcome::RestoredGeometry => "Restored previous size and position",
        UndoOutcome::RestoredShowState => "Restored window",
    };
    writeln!(out, "{message}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resizer_window_state::{
        ProcessIdentity, Rect,
        platform::fake::{FakeDesktop, FakeWindow},
    };

    fn desktop() -> FakeDesktop {
        let desktop = FakeDesktop::new();
        desktop.add_window(
            FakeWindow::new(Rect::new(100, 100, 900, 700))
                .with_process("Untitled - Notepad", ProcessIdentity::new(10, 1, "notepad")),
        );
        desktop.add_window(
            FakeWindow::new(Rect::new(0, 0, 640, 480))
                .with_process("Paint", ProcessIdentity::new(20, 1, "mspaint")),
        );
        desktop
    }

    fn target(pid: Option<u32>, process: Option<&str>) -> TargetArgs {
        TargetArgs {
            pid,
            process: process.map(str::to_string),
        }
    }

    #[test]
    fn finds_target_by_pid_or_name() {
        let mut selection = Selection::new(desktop());
        selection.refresh().unwrap();
        let targets = selection.targets();

        assert_eq!(target(Some(20), None).find(targets), Some(1));
        assert_eq!(target(None, Some("NOTEPAD.EXE")).find(targets), Some(0));
        assert_eq!(target(None, Some("mspaint")).find(targets), Some(1));
        assert_eq!(target(None, Some("calc")).find(targets), None);
        assert_eq!(target(None, None).find(targets), None);
    }

    #[test]
    fn select_requires_a_target() {
        let err = select(desktop(), &TargetArgs::default()).err().unwrap();
        assert!(err.to_string().contains("--pid"));

        let err = select(desktop(), &target(Some(99), None)).err().unwrap();
        assert!(err.to_string().contains("pid 99"));
    }

    #[test]
    fn resize_flags_override_config() {
        let args = ResizeArgs {
            width: 800,
            height: 600,
            client: true,
            no_center: true,
            no_activate: false,
        };

        assert_eq!(
            args.transition().unwrap(),
            Transition::ClientSize(Size::new(800, 600))
        );

        let options = args.options(TransitionOptions::default());
        assert!(!options.center);
        assert!(options.activate);

        let quiet = TransitionOptions {
            activate: false,
            ..Default::default()
        };
        assert!(!args.options(quiet).activate);
    }

    #[test]
    fn non_positive_sizes_are_rejected() {
        assert!(parse_size(0, 600).is_err());
        assert!(parse_size(800, -1).is_err());
        assert_eq!(parse_size(1, 1).unwrap(), Size::new(1, 1));
    }

    #[test]
    fn apply_reports_new_metrics() {
        let desktop = desktop();
        let mut selection = select(desktop, &target(Some(10), None)).unwrap();
        let mut out = vec![];

        apply(
            &mut selection,
            Transition::WindowSize(Size::new(400, 300)),
            &TransitionOptions::default(),
            &mut out,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Applied window-size 400x300: outer 400x300, client 384x261\n"
        );
    }

    #[test]
    fn json_listing_includes_index_and_process() {
        let mut out = vec![];
        list(desktop(), true, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["index"], 0);
        assert_eq!(value[1]["process"]["pid"], 20);
        assert_eq!(value[1]["label"], "Paint");
    }

    #[test]
    fn text_listing_marks_selection() {
        let mut selection = Selection::new(desktop());
        selection.refresh().unwrap();
        let mut out = vec![];

        write_targets(selection.targets(), Some(1), false, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("   0"));
        assert!(lines[1].starts_with("*  1"));
        assert!(lines[1].ends_with("Paint"));
    }

    #[test]
    fn info_describes_window_and_monitor() {
        let selection = select(desktop(), &target(None, Some("notepad"))).unwrap();
        let mut out = vec![];

        info(&selection, &TransitionOptions::default(), false, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("outer:     800x600"));
        assert!(text.contains("client:    784x561"));
        assert!(text.contains("monitor:   (0, 0) 1920x1080"));
        assert!(text.contains("work area: (0, 0) 1920x1040"));
        assert!(text.contains("dpi:       96"));
    }

    #[test]
    fn json_info_reports_the_monitor_the_window_is_on() {
        let desktop = desktop();
        desktop.add_monitor(Rect::new(1920, 0, 3840, 1200), 48);
        desktop.add_window(
            FakeWindow::new(Rect::new(2000, 100, 2640, 580))
                .with_process("Calc", ProcessIdentity::new(30, 1, "calc")),
        );
        let selection = select(desktop, &target(Some(30), None)).unwrap();
        let mut out = vec![];

        info(&selection, &TransitionOptions::default(), true, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["monitor"]["left"], 1920);
        assert_eq!(value["work_area"]["bottom"], 1152);
        assert_eq!(value["outer"]["width"], 640);
        assert_eq!(value["client"]["height"], 441);
        assert_eq!(value["undo_available"], false);
    }
}
