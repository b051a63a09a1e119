//! Usage gate seam. The engine consults a gate before any work and records
//! one unit on success; quota storage belongs to the implementor.

use crate::error::ReconError;

/// Default number of runs a metered user gets.
pub const DEFAULT_USAGE_LIMIT: u32 = 5;

/// Quota policy: another run is allowed while usage is below the limit.
pub fn within_quota(current_usage: u32, limit: u32) -> bool {
    current_usage < limit
}

pub trait UsageGate {
    /// Current (used, limit) pair.
    fn usage(&self) -> Result<(u32, u32), ReconError>;

    /// Record one consumed run.
    fn increment(&mut self) -> Result<(), ReconError>;

    fn allow(&self) -> Result<bool, ReconError> {
        let (used, limit) = self.usage()?;
        Ok(within_quota(used, limit))
    }
}

/// In-process counter; the reference gate for library callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryGate {
    pub used: u32,
    pub limit: u32,
}

impl MemoryGate {
    pub fn new(limit: u32) -> Self {
        Self { used: 0, limit }
    }
}

impl Default for MemoryGate {
    fn default() -> Self {
        Self::new(DEFAULT_USAGE_LIMIT)
    }
}

impl UsageGate for MemoryGate {
    fn usage(&self) -> Result<(u32, u32), ReconError> {
        Ok((self.used, self.limit))
    }

    fn increment(&mut self) -> Result<(), ReconError> {
        self.used = self.used.saturating_add(1);
        Ok(())
    }
}

/// Gate that always allows and records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmetered;

impl UsageGate for Unmetered {
    fn usage(&self) -> Result<(u32, u32), ReconError> {
        Ok((0, u32::MAX))
    }

    fn increment(&mut self) -> Result<(), ReconError> {
        Ok(())
    }
}
