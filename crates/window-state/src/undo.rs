use tracing::{debug, info};

use crate::{
    Desktop, Error, Placement, Result, ShowState, TransitionRecord, WindowSession, geometry,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UndoOutcome {
    /// Style, geometry and menu from before fullscreen were put back.
    LeftFullscreen,
    /// The outer rectangle from before the last resize was put back.
    RestoredGeometry,
    /// There was nothing recorded; the window was only asked to restore itself.
    RestoredShowState,
}

impl<D: Desktop> WindowSession<D> {
    /// Inverts the last transition exactly once. Without a record this falls back to the
    /// OS restore, which is what undoes a maximize or minimize.
    pub fn undo(&mut self, activate: bool) -> Result<UndoOutcome> {
        let handle = self.handle;
        geometry::ensure_alive(&self.desktop, handle)?;
        let before = self.desktop.window_rect(handle).ok();

        let outcome = match self.record {
            Some(TransitionRecord::Fullscreened { rect, chrome }) => {
                self.revert_fullscreen(rect, chrome)?;
                UndoOutcome::LeftFullscreen
            }
            Some(TransitionRecord::Sized(rect)) => {
                self.show(ShowState::Restore)?;
                self.desktop.set_window_pos(
                    handle,
                    Placement {
                        rect,
                        keep_position: false,
                        activate,
                    },
                )?;
                UndoOutcome::RestoredGeometry
            }
            None => {
                debug!(%handle, "{}, restoring show state", Error::NoUndoAvailable);
                self.show(ShowState::Restore)?;
                UndoOutcome::RestoredShowState
            }
        };

        self.record = None;

        if activate {
            self.activate();
        }

        let after = self.desktop.window_rect(handle).ok();
        info!(
            target: "journal",
            %handle,
            mode = "undo",
            before = %before.map(|r| r.to_string()).unwrap_or_default(),
            after = %after.map(|r| r.to_string()).unwrap_or_default(),
            "Undid transition"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MenuHandle, Rect, Size, StyleBits, Transition, TransitionOptions,
        platform::fake::{Call, FakeDesktop, FakeWindow},
    };

    const MENU: MenuHandle = MenuHandle(0x99);

    fn session() -> (FakeDesktop, WindowSession<FakeDesktop>) {
        let desktop = FakeDesktop::new();
        let handle = desktop.add_window(
            FakeWindow::new(Rect::new(100, 100, 500, 400))
                .with_border(Size::new(16, 39))
                .with_menu(MENU),
        );
        (desktop.clone(), WindowSession::new(desktop, handle))
    }

    #[test]
    fn undo_restores_geometry_to_the_pixel() {
        let (desktop, mut session) = session();
        let handle = session.handle();
        let options = TransitionOptions::default();

        session
            .apply(Transition::ClientSize(Size::new(801, 603)), &options)
            .unwrap();
        assert_ne!(desktop.rect_of(handle), Rect::new(100, 100, 500, 400));

        assert_eq!(session.undo(true).unwrap(), UndoOutcome::RestoredGeometry);
        assert_eq!(desktop.rect_of(handle), Rect::new(100, 100, 500, 400));
        assert!(!session.undo_available());
    }

    #[test]
    fn undo_of_uncentered_resize_is_exact_playback() {
        let (desktop, mut session) = session();
        let handle = session.handle();
        let options = TransitionOptions {
            center: false,
            ..Default::default()
        };

        session
            .apply(Transition::WindowSize(Size::new(1201, 901)), &options)
            .unwrap();
        desktop.take_calls();

        session.undo(false).unwrap();

        assert_eq!(
            desktop.take_calls(),
            vec![
                Call::ShowWindow(ShowState::Restore),
                Call::SetWindowPos(Placement {
                    rect: Rect::new(100, 100, 500, 400),
                    keep_position: false,
                    activate: false,
                }),
            ]
        );
        assert_eq!(desktop.rect_of(handle), Rect::new(100, 100, 500, 400));
    }

    #[test]
    fn fullscreen_round_trip_restores_rect_style_and_menu() {
        let (desktop, mut session) = session();
        let handle = session.handle();
        let style = desktop.style_of(handle);

        session
            .apply(Transition::Fullscreen, &TransitionOptions::default())
            .unwrap();
        assert_eq!(desktop.style_of(handle), StyleBits::FULLSCREEN);

        assert_eq!(session.undo(true).unwrap(), UndoOutcome::LeftFullscreen);
        assert_eq!(desktop.rect_of(handle), Rect::new(100, 100, 500, 400));
        assert_eq!(desktop.style_of(handle), style);
        assert_eq!(desktop.menu_of(handle), Some(MENU));
        assert_eq!(session.metrics().unwrap().client, Size::new(384, 261));
    }

    #[test]
    fn undo_without_record_only_restores_show_state() {
        let (desktop, mut session) = session();

        assert_eq!(
            session.undo(false).unwrap(),
            UndoOutcome::RestoredShowState
        );
        assert_eq!(
            desktop.take_calls(),
            vec![Call::ShowWindow(ShowState::Restore)]
        );
    }

    #[test]
    fn second_undo_is_a_plain_restore() {
        let (desktop, mut session) = session();

        session
            .apply(
                Transition::WindowSize(Size::new(300, 300)),
                &TransitionOptions::default(),
            )
            .unwrap();
        session.undo(false).unwrap();
        desktop.take_calls();

        assert_eq!(
            session.undo(false).unwrap(),
            UndoOutcome::RestoredShowState
        );
        assert_eq!(
            desktop.take_calls(),
            vec![Call::ShowWindow(ShowState::Restore)]
        );
        assert_eq!(
            desktop.rect_of(session.handle()),
            Rect::new(100, 100, 500, 400)
        );
    }

    #[test]
    fn undo_after_minimize_restores_it() {
        let (desktop, mut session) = session();
        let handle = session.handle();

        session
            .apply(Transition::Minimize, &TransitionOptions::default())
            .unwrap();
        session.undo(true).unwrap();

        assert_eq!(desktop.show_state(handle), ShowState::Restore);
        assert_eq!(desktop.rect_of(handle), Rect::new(100, 100, 500, 400));
    }

    #[test]
    fn failed_undo_keeps_the_record() {
        let (desktop, mut session) = session();

        session
            .apply(
                Transition::WindowSize(Size::new(300, 300)),
                &TransitionOptions::default(),
            )
            .unwrap();
        desktop.fail_next("SetWindowPos");

        assert!(session.undo(true).is_err());
        assert!(session.undo_available());
        assert_eq!(session.undo(true).unwrap(), UndoOutcome::RestoredGeometry);
    }

    #[test]
    fn undo_on_closed_window_is_an_invalid_target() {
        let (desktop, mut session) = session();
        session
            .apply(Transition::Fullscreen, &TransitionOptions::default())
            .unwrap();
        desktop.close(session.handle());

        assert!(session.undo(true).unwrap_err().is_invalid_target());
    }
}
