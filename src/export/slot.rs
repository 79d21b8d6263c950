use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{ReelError, ReelResult};

/// Admission control for exports of one presentation.
///
/// At most one export holds the slot. A second request is rejected with [`ReelError::Busy`]
/// instead of queueing. Clones share the same slot, so a view can poll [`ExportSlot::is_busy`]
/// while a worker thread exports.
#[derive(Clone, Debug, Default)]
pub struct ExportSlot {
    busy: Arc<AtomicBool>,
}

impl ExportSlot {
    /// A free slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an export currently holds the slot.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the slot. The claim is released when the guard drops.
    pub fn try_acquire(&self) -> ReelResult<SlotGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ReelError::Busy)?;
        Ok(SlotGuard {
            busy: Arc::clone(&self.busy),
        })
    }
}

/// Held for the duration of one export.
#[derive(Debug)]
pub struct SlotGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/slot.rs"]
mod tests;
