//! Saving and restoring the session as a whole.
//!
//! [`SessionPersistence`] is the boundary to durable storage. The session is
//! always written and read as a single JSON document; a restore that fails
//! for any reason is reported as a [`RestoreError`] so the caller can fall
//! back to an empty session.
//!
//! Suspension is two-phase: the platform hands out a
//! [`SuspendingOperation`], the app takes a [`SuspendDeferral`] from it,
//! performs the save and then completes the deferral. A save in progress
//! cannot be cancelled.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;

use super::SessionSnapshot;
use crate::error::ColonnadeError;

/// Why a saved session could not be brought back.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("no saved session")]
    Missing,
    #[error("saved session is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

pub trait SessionPersistence {
    fn save_all(&mut self, snapshot: &SessionSnapshot) -> Result<(), ColonnadeError>;

    fn restore_all(&mut self) -> Result<SessionSnapshot, RestoreError>;
}

/// Keeps the serialized session in memory.
///
/// Clones share storage, so a clone handed to a fresh `App` sees what the
/// previous one saved, the same way a relaunched process would.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    bytes: Rc<RefCell<Option<Vec<u8>>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously serialized bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Rc::new(RefCell::new(Some(bytes))),
        }
    }

    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.bytes.borrow().clone()
    }
}

impl SessionPersistence for MemoryPersistence {
    fn save_all(&mut self, snapshot: &SessionSnapshot) -> Result<(), ColonnadeError> {
        let bytes = serde_json::to_vec(snapshot)?;
        *self.bytes.borrow_mut() = Some(bytes);
        Ok(())
    }

    fn restore_all(&mut self) -> Result<SessionSnapshot, RestoreError> {
        let stored = self.bytes.borrow();
        let bytes = stored.as_deref().ok_or(RestoreError::Missing)?;
        serde_json::from_slice(bytes).map_err(RestoreError::Corrupt)
    }
}

/// Handed out by the platform when the app is about to be suspended.
#[derive(Debug, Clone, Default)]
pub struct SuspendingOperation {
    outstanding: Rc<Cell<usize>>,
}

impl SuspendingOperation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the platform to wait until the returned deferral is completed.
    pub fn get_deferral(&self) -> SuspendDeferral {
        self.outstanding.set(self.outstanding.get() + 1);
        SuspendDeferral {
            outstanding: self.outstanding.clone(),
        }
    }

    /// True once every deferral taken has been completed.
    pub fn is_complete(&self) -> bool {
        self.outstanding.get() == 0
    }
}

/// Completing the deferral tells the platform suspension may proceed.
#[must_use = "the platform waits until the deferral is completed"]
#[derive(Debug)]
pub struct SuspendDeferral {
    outstanding: Rc<Cell<usize>>,
}

impl SuspendDeferral {
    pub fn complete(self) {
        self.outstanding
            .set(self.outstanding.get().saturating_sub(1));
    }
}
