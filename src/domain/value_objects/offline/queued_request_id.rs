use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned key of a queued request. Ordering follows enqueue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueuedRequestId(i64);

impl QueuedRequestId {
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err("Queued request id must be positive".to_string());
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn first() -> Self {
        Self(1)
    }

    /// Id assigned to the entry appended after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for QueuedRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<QueuedRequestId> for i64 {
    fn from(id: QueuedRequestId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_ids() {
        assert!(QueuedRequestId::new(0).is_err());
        assert!(QueuedRequestId::new(-3).is_err());
        assert_eq!(QueuedRequestId::new(7).unwrap().value(), 7);
    }
}
