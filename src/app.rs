//! # Application Shell
//!
//! Owns the session, the persistence backend and the root frame, and runs
//! the two lifecycle transitions that touch saved state:
//!
//! - [`App::launch`] creates and registers the root frame, restores the
//!   previous session when the process was terminated while suspended, and
//!   navigates to the home page when nothing was restored.
//! - [`App::suspend`] saves the current page and the frame history, then
//!   writes the whole session out under a suspend deferral.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ColonnadeError;
use crate::layout::columns::ColumnsLayout;
use crate::layout::Size;
use crate::navigation::{Frame, PageRegistry};
use crate::pages::{ALL_GROUPS, GROUPED_ITEMS};
use crate::session::persistence::{SessionPersistence, SuspendingOperation};
use crate::session::{SessionSnapshot, SessionState};

/// Session key of the root frame.
pub const ROOT_FRAME_KEY: &str = "AppFrame";

/// How the previous run of the process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionState {
    NotRunning,
    Running,
    Suspended,
    /// Suspended, then terminated by the system. Only this state restores.
    Terminated,
    ClosedByUser,
}

pub struct App {
    session: SessionState,
    persistence: Box<dyn SessionPersistence>,
    registry: Rc<PageRegistry>,
    root_frame: Option<Frame>,
    state: ExecutionState,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("state", &self.state)
            .field("root_frame", &self.root_frame)
            .finish()
    }
}

impl App {
    pub fn new(registry: PageRegistry, persistence: impl SessionPersistence + 'static) -> Self {
        Self {
            session: SessionState::new(),
            persistence: Box::new(persistence),
            registry: Rc::new(registry),
            root_frame: None,
            state: ExecutionState::NotRunning,
        }
    }

    /// Bring the app up. Launching an app that is already running only
    /// marks it running.
    ///
    /// A session that cannot be restored is discarded. Failing to show the
    /// home page is the one fatal condition.
    pub fn launch(&mut self, previous: ExecutionState) -> Result<(), ColonnadeError> {
        let Self {
            session,
            persistence,
            registry,
            root_frame,
            state,
        } = self;

        if root_frame.is_none() {
            let mut frame = Frame::new(registry.clone());
            session.register_frame(frame.id(), ROOT_FRAME_KEY)?;

            if previous == ExecutionState::Terminated {
                restore_session(session, persistence.as_mut(), &mut frame);
            }

            if frame.current_entry().is_none() {
                frame.navigate(session, GROUPED_ITEMS, Value::from(ALL_GROUPS))?;
            }
            *root_frame = Some(frame);
        }

        *state = ExecutionState::Running;
        info!(?previous, "launched");
        Ok(())
    }

    /// Save everything under a deferral taken from `operation`.
    ///
    /// The deferral is completed whether or not the save succeeds.
    pub fn suspend(&mut self, operation: &SuspendingOperation) -> Result<(), ColonnadeError> {
        let deferral = operation.get_deferral();
        if let Some(frame) = self.root_frame.as_mut() {
            frame.save_navigation(&mut self.session);
        }
        let snapshot = self.session.snapshot();
        let result = self.persistence.save_all(&snapshot);
        deferral.complete();

        match &result {
            Ok(()) => {
                self.state = ExecutionState::Suspended;
                debug!(frames = snapshot.frames.len(), "session saved");
            }
            Err(e) => warn!(error = %e, "failed to save session"),
        }
        result
    }

    /// Back to running after a suspend that did not end in termination.
    pub fn resume(&mut self) {
        self.state = ExecutionState::Running;
    }

    pub fn execution_state(&self) -> ExecutionState {
        self.state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn root_frame(&self) -> Option<&Frame> {
        self.root_frame.as_ref()
    }

    /// Navigate the root frame. Does nothing before launch.
    pub fn navigate(&mut self, page_type: &str, parameter: Value) -> Result<(), ColonnadeError> {
        match self.root_frame.as_mut() {
            Some(frame) => frame.navigate(&mut self.session, page_type, parameter),
            None => Ok(()),
        }
    }

    pub fn go_back(&mut self) -> Result<bool, ColonnadeError> {
        match self.root_frame.as_mut() {
            Some(frame) => frame.go_back(&mut self.session),
            None => Ok(false),
        }
    }

    pub fn go_forward(&mut self) -> Result<bool, ColonnadeError> {
        match self.root_frame.as_mut() {
            Some(frame) => frame.go_forward(&mut self.session),
            None => Ok(false),
        }
    }

    /// Lay out whatever paginated content the current page hosts.
    pub fn layout_current(&mut self, available: Size) -> Option<ColumnsLayout> {
        self.root_frame
            .as_mut()?
            .current_page_mut()?
            .layout(available)
    }
}

/// Restore the saved session into `session` and rebuild `frame`'s history.
/// Any failure leaves both empty.
fn restore_session(
    session: &mut SessionState,
    persistence: &mut dyn SessionPersistence,
    frame: &mut Frame,
) {
    let snapshot = match persistence.restore_all() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "could not restore session, starting fresh");
            return;
        }
    };
    session.restore(snapshot);
    match frame.restore_navigation(session) {
        Ok(restored) => debug!(restored, "navigation restored"),
        Err(e) => {
            warn!(error = %e, "could not restore navigation, starting fresh");
            session.restore(SessionSnapshot::default());
        }
    }
}
