//! # Session State
//!
//! The process-wide cache of per-page state, grouped by navigation frame.
//!
//! Each frame owns a mapping from page key to a [`PageState`] dictionary.
//! The page key is derived from the frame's back-stack depth
//! (`"Page-0"`, `"Page-1"`, ...), so the entry follows the *position* in the
//! history, not the page type. The rules for when entries are created,
//! overwritten, pruned and handed back live in
//! [`crate::navigation::PageHost`].
//!
//! Frames that are registered under a name take part in suspend/resume:
//! [`SessionState::snapshot`] captures every registered frame as one
//! serializable unit and [`SessionState::restore`] puts it back. Moving the
//! bytes to durable storage is the job of a
//! [`persistence::SessionPersistence`] implementation.

pub mod persistence;

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ColonnadeError;
use crate::navigation::NavigationHistory;

/// State saved by one page. Values are JSON, so anything stored here
/// survives serialization.
pub type PageState = serde_json::Map<String, Value>;

pub const PAGE_KEY_PREFIX: &str = "Page-";

/// The session key for the page at back-stack depth `depth`.
pub fn page_key(depth: usize) -> String {
    format!("{PAGE_KEY_PREFIX}{depth}")
}

/// Inverse of [`page_key`].
pub fn page_depth(key: &str) -> Option<usize> {
    key.strip_prefix(PAGE_KEY_PREFIX)?.parse().ok()
}

/// Identity of a navigation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        FrameId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Everything cached for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameState {
    /// Page key -> state saved by the page at that depth.
    #[serde(default)]
    pub pages: BTreeMap<String, PageState>,
    /// The frame's history, captured on suspend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationHistory>,
}

impl FrameState {
    /// Drop the entries for `depth` and every deeper position.
    ///
    /// Returns how many entries were removed.
    pub fn prune_from(&mut self, depth: usize) -> usize {
        let before = self.pages.len();
        self.pages
            .retain(|key, _| page_depth(key).map_or(true, |d| d < depth));
        before - self.pages.len()
    }
}

/// A serializable capture of every registered frame, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub frames: BTreeMap<String, FrameState>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<String, ColonnadeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ColonnadeError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Per-frame state for the whole process.
#[derive(Debug, Default)]
pub struct SessionState {
    frames: HashMap<FrameId, FrameState>,
    /// Session key -> registered frame.
    registered: BTreeMap<String, FrameId>,
    /// Restored state whose frame has not registered yet.
    pending: BTreeMap<String, FrameState>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state owned by `frame`, created empty on first use.
    pub fn state_for_frame(&mut self, frame: FrameId) -> &mut FrameState {
        self.frames.entry(frame).or_default()
    }

    pub fn frame_state(&self, frame: FrameId) -> Option<&FrameState> {
        self.frames.get(&frame)
    }

    /// Make `frame` part of the persisted session under `name`.
    ///
    /// If a restored session already holds state for `name`, the frame
    /// takes it over.
    pub fn register_frame(&mut self, frame: FrameId, name: &str) -> Result<(), ColonnadeError> {
        if self.registered.contains_key(name) {
            return Err(ColonnadeError::FrameAlreadyRegistered(name.to_string()));
        }
        if let Some(existing) = self.registered_name(frame) {
            return Err(ColonnadeError::FrameAlreadyRegistered(existing.to_string()));
        }
        self.registered.insert(name.to_string(), frame);
        if let Some(state) = self.pending.remove(name) {
            debug!(frame = name, "frame picked up restored state");
            self.frames.insert(frame, state);
        }
        Ok(())
    }

    /// Forget `frame` and everything cached for it.
    pub fn unregister_frame(&mut self, frame: FrameId) {
        self.registered.retain(|_, id| *id != frame);
        self.frames.remove(&frame);
    }

    pub fn registered_name(&self, frame: FrameId) -> Option<&str> {
        self.registered
            .iter()
            .find(|(_, id)| **id == frame)
            .map(|(name, _)| name.as_str())
    }

    /// Capture every registered frame (plus restored state still waiting
    /// for its frame) as one unit.
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut frames = self.pending.clone();
        for (name, id) in &self.registered {
            frames.insert(
                name.clone(),
                self.frames.get(id).cloned().unwrap_or_default(),
            );
        }
        SessionSnapshot { frames }
    }

    /// Replace the session with `snapshot`.
    ///
    /// Registered frames get the state saved under their name, or nothing
    /// if the snapshot has none. Other entries wait for their frame.
    pub fn restore(&mut self, mut snapshot: SessionSnapshot) {
        for (name, id) in &self.registered {
            let state = snapshot.frames.remove(name).unwrap_or_default();
            self.frames.insert(*id, state);
        }
        self.pending = snapshot.frames;
        debug!(
            registered = self.registered.len(),
            pending = self.pending.len(),
            "session restored"
        );
    }
}
