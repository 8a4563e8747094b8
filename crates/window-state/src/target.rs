use serde::Serialize;
use tracing::info;

use crate::{
    Desktop, Error, Result, Transition, TransitionOptions, UndoOutcome, WindowHandle,
    WindowSession, geometry::WindowMetrics,
};

/// Who owns a window. Handles get recycled, so a selection is matched on this instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ProcessIdentity {
    pub pid: u32,
    pub session_id: u32,
    pub name: String,
}

impl ProcessIdentity {
    pub fn new(pid: u32, session_id: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            session_id,
            name: name.into(),
        }
    }
}

/// One row of the selectable window list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Target {
    pub handle: WindowHandle,
    pub label: String,
    pub process: ProcessIdentity,
}

/// The window list and the one window currently being worked on.
pub struct Selection<D: Desktop + Clone> {
    desktop: D,
    targets: Vec<Target>,
    selected: Option<(ProcessIdentity, WindowSession<D>)>,
}

impl<D: Desktop + Clone> Selection<D> {
    pub fn new(desktop: D) -> Self {
        Self {
            desktop,
            targets: vec![],
            selected: None,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn selected(&self) -> Option<&ProcessIdentity> {
        self.selected.as_ref().map(|(identity, _)| identity)
    }

    pub fn selected_index(&self) -> Option<usize> {
        let identity = self.selected()?;
        self.targets.iter().position(|t| &t.process == identity)
    }

    pub fn session(&self) -> Option<&WindowSession<D>> {
        self.selected.as_ref().map(|(_, session)| session)
    }

    /// Re-enumerates windows, then [`Selection::replace_targets`].
    pub fn refresh(&mut self) -> Result<()> {
        let targets = self.desktop.targets()?;
        self.replace_targets(targets);
        Ok(())
    }

    /// Swaps in a new window list. The current selection survives when its owner is still
    /// listed, otherwise the first entry is selected.
    pub fn replace_targets(&mut self, targets: Vec<Target>) {
        self.targets = targets;

        let still_listed = self
            .selected
            .as_ref()
            .and_then(|(identity, _)| self.targets.iter().position(|t| &t.process == identity));

        match still_listed {
            Some(index) => {
                let handle = self.targets[index].handle;
                if let Some((_, session)) = self
                    .selected
                    .as_mut()
                    .filter(|(_, session)| session.handle() != handle)
                {
                    session.retarget(handle);
                }
            }
            None if self.targets.is_empty() => self.switch_to(None),
            None => self.switch_to(Some(0)),
        }
    }

    /// Selects `index`. Picking another window drops the undo record of the previous one.
    pub fn select(&mut self, index: usize) -> Result<()> {
        let target = self
            .targets
            .get(index)
            .ok_or(Error::InvalidTarget(WindowHandle::NULL))?;

        if self.selected() == Some(&target.process) {
            return Ok(());
        }

        self.switch_to(Some(index));
        Ok(())
    }

    fn switch_to(&mut self, index: Option<usize>) {
        if let Some((identity, _)) = self.selected.as_ref().filter(|(_, s)| s.undo_available()) {
            info!(
                process = %identity.name,
                pid = identity.pid,
                "Discarding pending undo after switching windows"
            );
        }

        self.selected = index.map(|i| {
            let target = &self.targets[i];
            (
                target.process.clone(),
                WindowSession::new(self.desktop.clone(), target.handle),
            )
        });
    }

    fn session_mut(&mut self) -> Result<&mut WindowSession<D>> {
        self.selected
            .as_mut()
            .map(|(_, session)| session)
            .ok_or(Error::InvalidTarget(WindowHandle::NULL))
    }

    pub fn apply(&mut self, transition: Transition, options: &TransitionOptions) -> Result<()> {
        self.session_mut()?.apply(transition, options)
    }

    pub fn undo(&mut self, activate: bool) -> Result<UndoOutcome> {
        self.session_mut()?.undo(activate)
    }

    pub fn undo_available(&self) -> bool {
        self.session().is_some_and(|s| s.undo_available())
    }

    pub fn metrics(&self) -> Result<WindowMetrics> {
        self.session()
            .ok_or(Error::InvalidTarget(WindowHandle::NULL))?
            .metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Rect, Size,
        platform::fake::{FakeDesktop, FakeWindow},
    };

    fn window(desktop: &FakeDesktop, label: &str, pid: u32, name: &str) -> WindowHandle {
        desktop.add_window(
            FakeWindow::new(Rect::new(0, 0, 800, 600))
                .with_process(label, ProcessIdentity::new(pid, 1, name)),
        )
    }

    fn resize(selection: &mut Selection<FakeDesktop>) {
        selection
            .apply(
                Transition::WindowSize(Size::new(400, 300)),
                &TransitionOptions::default(),
            )
            .unwrap();
    }

    #[test]
    fn identity_equality_needs_pid_session_and_name() {
        let a = ProcessIdentity::new(10, 1, "notepad.exe");

        assert_eq!(a, ProcessIdentity::new(10, 1, "notepad.exe"));
        assert_ne!(a, ProcessIdentity::new(10, 2, "notepad.exe"));
        assert_ne!(a, ProcessIdentity::new(11, 1, "notepad.exe"));
        assert_ne!(a, ProcessIdentity::new(10, 1, "mspaint.exe"));
    }

    #[test]
    fn refresh_selects_first_entry_initially() {
        let desktop = FakeDesktop::new();
        window(&desktop, "Notes", 10, "notepad.exe");
        window(&desktop, "Paint", 20, "mspaint.exe");

        let mut selection = Selection::new(desktop);
        selection.refresh().unwrap();

        assert_eq!(selection.targets().len(), 2);
        assert_eq!(selection.selected_index(), Some(0));
        assert!(!selection.undo_available());
    }

    #[test]
    fn refresh_keeps_selection_and_undo_across_new_handles() {
        let desktop = FakeDesktop::new();
        window(&desktop, "Notes", 10, "notepad.exe");
        let paint = window(&desktop, "Paint", 20, "mspaint.exe");

        let mut selection = Selection::new(desktop.clone());
        selection.refresh().unwrap();
        selection.select(1).unwrap();
        resize(&mut selection);

        // The app recreates its main window under a new handle.
        desktop.close(paint);
        let reopened = window(&desktop, "Paint", 20, "mspaint.exe");
        selection.refresh().unwrap();

        assert_eq!(selection.selected_index(), Some(1));
        assert_eq!(selection.session().unwrap().handle(), reopened);
        assert!(selection.undo_available());
    }

    #[test]
    fn refresh_falls_back_to_first_entry_when_owner_is_gone() {
        let desktop = FakeDesktop::new();
        window(&desktop, "Notes", 10, "notepad.exe");
        let paint = window(&desktop, "Paint", 20, "mspaint.exe");

        let mut selection = Selection::new(desktop.clone());
        selection.refresh().unwrap();
        selection.select(1).unwrap();
        resize(&mut selection);

        desktop.close(paint);
        selection.refresh().unwrap();

        assert_eq!(
            selection.selected(),
            Some(&ProcessIdentity::new(10, 1, "notepad.exe"))
        );
        assert!(!selection.undo_available());
    }

    #[test]
    fn switching_windows_discards_pending_undo() {
        let desktop = FakeDesktop::new();
        window(&desktop, "Notes", 10, "notepad.exe");
        window(&desktop, "Paint", 20, "mspaint.exe");

        let mut selection = Selection::new(desktop);
        selection.refresh().unwrap();
        resize(&mut selection);
        assert!(selection.undo_available());

        selection.select(0).unwrap();
        assert!(selection.undo_available());

        selection.select(1).unwrap();
        assert!(!selection.undo_available());

        selection.select(0).unwrap();
        assert!(!selection.undo_available());
    }

    #[test]
    fn empty_list_clears_selection() {
        let desktop = FakeDesktop::new();
        let notes = window(&desktop, "Notes", 10, "notepad.exe");

        let mut selection = Selection::new(desktop.clone());
        selection.refresh().unwrap();
        desktop.close(notes);
        selection.refresh().unwrap();

        assert_eq!(selection.selected(), None);
        assert!(selection.undo(true).unwrap_err().is_invalid_target());
        assert!(selection.select(0).is_err());
    }

    #[test]
    fn metrics_follow_the_selected_window() {
        let desktop = FakeDesktop::new();
        window(&desktop, "Notes", 10, "notepad.exe");

        let mut selection = Selection::new(desktop);
        selection.refresh().unwrap();
        resize(&mut selection);

        let metrics = selection.metrics().unwrap();
        assert_eq!(metrics.outer, Size::new(400, 300));
        assert_eq!(metrics.client, Size::new(384, 261));
    }
}
