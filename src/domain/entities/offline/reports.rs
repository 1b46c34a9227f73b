use crate::domain::value_objects::QueuedRequestId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub examined: usize,
    pub expired: Vec<QueuedRequestId>,
    /// Entries that were expired but could not be deleted this round.
    pub failed: Vec<QueuedRequestId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFailure {
    pub request_id: QueuedRequestId,
    /// HTTP status when the server answered; `None` for transport errors.
    pub status: Option<u16>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub delivered: Vec<QueuedRequestId>,
    pub expired: Vec<QueuedRequestId>,
    pub aborted_at: Option<ReplayFailure>,
    /// Entries left in the store after the pass.
    pub remaining: usize,
    pub skipped_offline: bool,
}

impl ReplayReport {
    pub fn skipped() -> Self {
        Self {
            skipped_offline: true,
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.aborted_at.is_none() && !self.skipped_offline
    }
}
