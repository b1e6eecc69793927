use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    Idle,
    Signing,
    Processing,
}

impl FlowStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => FlowStatus::Signing,
            2 => FlowStatus::Processing,
            _ => FlowStatus::Idle,
        }
    }
}

/// Busy indicator for one submit control. At most one invocation runs at a time.
#[derive(Default)]
pub struct FlowState {
    status: AtomicU8,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> FlowStatus {
        FlowStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Marks the flow as signing, or refuses if an invocation is outstanding.
    pub fn begin(&self) -> Result<FlowGuard<'_>, AppError> {
        self.status
            .compare_exchange(
                FlowStatus::Idle as u8,
                FlowStatus::Signing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| AppError::Busy)?;
        Ok(FlowGuard { state: self })
    }
}

/// Returns the flow to idle when dropped, whatever the outcome.
pub struct FlowGuard<'a> {
    state: &'a FlowState,
}

impl FlowGuard<'_> {
    pub fn processing(&self) {
        self.state
            .status
            .store(FlowStatus::Processing as u8, Ordering::Release);
    }
}

impl Drop for FlowGuard<'_> {
    fn drop(&mut self) {
        self.state.status.store(FlowStatus::Idle as u8, Ordering::Release);
    }
}
