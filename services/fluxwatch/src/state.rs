//! Synchronization state of a mounted view

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::resource::Resource;

/// Everything the view renders from: the synchronized list plus its status
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncState {
    pub resources: Vec<Resource>,
    pub error: Option<String>,
    pub query: String,
    pub adding: bool,
    /// Non-silent syncs currently in flight
    pending_loads: usize,
    /// Sequence number of the newest sync response applied so far
    applied_seq: u64,
    /// Bumped on every mutation
    revision: u64,
}

impl SyncState {
    pub fn loading(&self) -> bool {
        self.pending_loads > 0
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn begin_load(&mut self) {
        self.pending_loads += 1;
    }

    pub fn end_load(&mut self) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
    }

    /// Full-replace reconciliation: the response becomes the list verbatim
    ///
    /// With `seq` set, a response older than one already applied is dropped
    /// and `false` is returned.
    pub fn replace_resources(&mut self, resources: Vec<Resource>, seq: Option<u64>) -> bool {
        if let Some(seq) = seq {
            if seq < self.applied_seq {
                return false;
            }
            self.applied_seq = seq;
        }
        self.resources = resources;
        self.error = None;
        true
    }

    /// Whether a response tagged `seq` is older than one already applied
    pub fn is_stale(&self, seq: u64) -> bool {
        seq < self.applied_seq
    }

    /// Record a failure; the current list stays as it is
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub(crate) fn touch(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SyncState>>;

pub fn new_state_handle() -> StateHandle {
    Arc::new(RwLock::new(SyncState::default()))
}
