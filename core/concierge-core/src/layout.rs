//! Top-level layout selection.
//!
//! [`select_view`] is the whole policy: the login gate wins over any layout
//! choice. [`LayoutWatcher`] re-runs it whenever the session or the viewport
//! publishes, and reports only real changes of view.

use serde::Serialize;
use tokio::sync::watch;

use crate::session::SessionState;
use crate::viewport::ViewportClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Anonymous,
    MobileAuthenticated,
    DesktopAuthenticated,
}

pub fn select_view(authenticated: bool, viewport: ViewportClass) -> View {
    match (authenticated, viewport) {
        (false, _) => View::Anonymous,
        (true, ViewportClass::Mobile) => View::MobileAuthenticated,
        (true, ViewportClass::Desktop) => View::DesktopAuthenticated,
    }
}

enum Wake {
    Session(bool),
    Viewport(bool),
}

/// Observes session and viewport channels and yields view changes.
#[derive(Debug)]
pub struct LayoutWatcher {
    session: watch::Receiver<SessionState>,
    viewport: watch::Receiver<ViewportClass>,
    session_open: bool,
    viewport_open: bool,
    current: View,
}

impl LayoutWatcher {
    pub fn new(
        mut session: watch::Receiver<SessionState>,
        mut viewport: watch::Receiver<ViewportClass>,
    ) -> Self {
        let current = select_view(
            session.borrow_and_update().authenticated,
            *viewport.borrow_and_update(),
        );
        Self {
            session,
            viewport,
            session_open: true,
            viewport_open: true,
            current,
        }
    }

    pub fn current(&self) -> View {
        self.current
    }

    /// Waits until the selected view differs from [`current`](Self::current).
    ///
    /// Returns `None` once both sources have been dropped.
    pub async fn next_change(&mut self) -> Option<View> {
        loop {
            let wake = tokio::select! {
                changed = self.session.changed(), if self.session_open => Wake::Session(changed.is_ok()),
                changed = self.viewport.changed(), if self.viewport_open => Wake::Viewport(changed.is_ok()),
                else => return None,
            };
            match wake {
                Wake::Session(open) => self.session_open = open,
                Wake::Viewport(open) => self.viewport_open = open,
            }

            let next = select_view(
                self.session.borrow_and_update().authenticated,
                *self.viewport.borrow_and_update(),
            );
            if next != self.current {
                tracing::debug!(from = ?self.current, to = ?next, "Layout changed");
                self.current = next;
                return Some(next);
            }
        }
    }
}
