//! # Navigation
//!
//! A [`Frame`] hosts one current page and remembers how the user got there.
//!
//! ```text
//!   back stack           current          forward stack
//!  [Page-0, Page-1] ──▶  Page-2   ◀──  [Page-3]
//! ```
//!
//! The back-stack depth doubles as the current page's session key, so every
//! transition runs the page state protocol against the frame's entry in
//! [`SessionState`]:
//!
//! - leaving a page saves its state under its key;
//! - a *new* navigation drops the state cached at the new depth and beyond,
//!   then loads the page without prior state;
//! - going back or forward (or re-creating the page after a restore) hands
//!   the cached state back to the page.

mod page;

pub use page::{Page, PageHost, PageRegistry};

#[cfg(test)]
pub(crate) use page::tests as page_tests;

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ColonnadeError;
use crate::session::{FrameId, SessionState};

/// How the current page was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationMode {
    /// A fresh forward navigation.
    New,
    Back,
    Forward,
    /// The page was re-created in place, e.g. after a restore.
    Refresh,
}

/// A position in the history: which page, with which parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    pub page_type: String,
    #[serde(default)]
    pub parameter: Value,
}

impl PageEntry {
    pub fn new(page_type: impl Into<String>, parameter: Value) -> Self {
        Self {
            page_type: page_type.into(),
            parameter,
        }
    }
}

/// Serializable form of a frame's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationHistory {
    #[serde(default)]
    pub back_stack: Vec<PageEntry>,
    #[serde(default)]
    pub current: Option<PageEntry>,
    #[serde(default)]
    pub forward_stack: Vec<PageEntry>,
}

/// A navigation context: one current page plus back/forward history.
#[derive(Debug)]
pub struct Frame {
    id: FrameId,
    registry: Rc<PageRegistry>,
    back_stack: Vec<PageEntry>,
    forward_stack: Vec<PageEntry>,
    current: Option<PageHost>,
}

impl Frame {
    pub fn new(registry: Rc<PageRegistry>) -> Self {
        Self {
            id: FrameId::next(),
            registry,
            back_stack: Vec::new(),
            forward_stack: Vec::new(),
            current: None,
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Number of entries behind the current page.
    pub fn back_stack_depth(&self) -> usize {
        self.back_stack.len()
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }

    pub fn current_entry(&self) -> Option<&PageEntry> {
        self.current.as_ref().map(PageHost::entry)
    }

    pub fn current_host(&self) -> Option<&PageHost> {
        self.current.as_ref()
    }

    pub fn current_page(&self) -> Option<&dyn Page> {
        self.current.as_ref().map(PageHost::page)
    }

    pub fn current_page_mut(&mut self) -> Option<&mut dyn Page> {
        self.current.as_mut().map(PageHost::page_mut)
    }

    /// Navigate forward to a new instance of `page_type`.
    ///
    /// Fails without touching the history when the page type is unknown.
    pub fn navigate(
        &mut self,
        session: &mut SessionState,
        page_type: &str,
        parameter: Value,
    ) -> Result<(), ColonnadeError> {
        let page = self.registry.create(page_type)?;
        if let Some(previous) = self.leave_current(session) {
            self.back_stack.push(previous);
        }
        self.forward_stack.clear();
        debug!(page = page_type, depth = self.back_stack.len(), "navigate");
        self.enter(session, page, PageEntry::new(page_type, parameter), NavigationMode::New);
        Ok(())
    }

    /// Returns false when there is nothing to go back to.
    pub fn go_back(&mut self, session: &mut SessionState) -> Result<bool, ColonnadeError> {
        let Some(target) = self.back_stack.last() else {
            return Ok(false);
        };
        let page = self.registry.create(&target.page_type)?;
        let Some(target) = self.back_stack.pop() else {
            return Ok(false);
        };
        if let Some(previous) = self.leave_current(session) {
            self.forward_stack.push(previous);
        }
        self.enter(session, page, target, NavigationMode::Back);
        Ok(true)
    }

    /// Returns false when there is nothing to go forward to.
    pub fn go_forward(&mut self, session: &mut SessionState) -> Result<bool, ColonnadeError> {
        let Some(target) = self.forward_stack.last() else {
            return Ok(false);
        };
        let page = self.registry.create(&target.page_type)?;
        let Some(target) = self.forward_stack.pop() else {
            return Ok(false);
        };
        if let Some(previous) = self.leave_current(session) {
            self.back_stack.push(previous);
        }
        self.enter(session, page, target, NavigationMode::Forward);
        Ok(true)
    }

    /// Go back until the first page of the history is current.
    pub fn go_home(&mut self, session: &mut SessionState) -> Result<(), ColonnadeError> {
        while self.go_back(session)? {}
        Ok(())
    }

    pub fn navigation_history(&self) -> NavigationHistory {
        NavigationHistory {
            back_stack: self.back_stack.clone(),
            current: self.current_entry().cloned(),
            forward_stack: self.forward_stack.clone(),
        }
    }

    /// Save the current page's state and the history into the session.
    ///
    /// The current page stays current.
    pub fn save_navigation(&mut self, session: &mut SessionState) {
        let frame_state = session.state_for_frame(self.id);
        if let Some(current) = self.current.as_mut() {
            current.leave(frame_state);
        }
        frame_state.navigation = Some(self.navigation_history());
    }

    /// Rebuild the history saved in the session and re-create its current
    /// page. Returns false when the session holds no history.
    pub fn restore_navigation(
        &mut self,
        session: &mut SessionState,
    ) -> Result<bool, ColonnadeError> {
        let Some(history) = session.state_for_frame(self.id).navigation.clone() else {
            return Ok(false);
        };
        let Some(current) = history.current else {
            return Ok(false);
        };
        let page = self.registry.create(&current.page_type)?;
        self.back_stack = history.back_stack;
        self.forward_stack = history.forward_stack;
        self.current = None;
        debug!(
            page = %current.page_type,
            depth = self.back_stack.len(),
            "restoring navigation"
        );
        self.enter(session, page, current, NavigationMode::Refresh);
        Ok(true)
    }

    fn leave_current(&mut self, session: &mut SessionState) -> Option<PageEntry> {
        let mut current = self.current.take()?;
        current.leave(session.state_for_frame(self.id));
        Some(current.into_entry())
    }

    fn enter(
        &mut self,
        session: &mut SessionState,
        page: Box<dyn Page>,
        entry: PageEntry,
        mode: NavigationMode,
    ) {
        let mut host = PageHost::new(page, entry);
        host.enter(session.state_for_frame(self.id), self.back_stack.len(), mode);
        self.current = Some(host);
    }
}
