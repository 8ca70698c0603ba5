use serde::{Deserialize, Serialize};

/// Session counters, owned by the engine and read at shutdown
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub frozen_count: u64,
    pub reclaimed_mb: u64,
    pub thaw_count: u64,
    pub sentinel_recoveries: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    // Successful suspend only; dry-run and failed suspends never land here
    pub fn record_freeze(&mut self, memory_mb: f64) {
        self.frozen_count += 1;
        self.reclaimed_mb += memory_mb.max(0.0).floor() as u64;
    }

    pub fn record_thaw(&mut self) {
        self.thaw_count += 1;
    }

    pub fn record_sentinel_recovery(&mut self) {
        self.sentinel_recoveries += 1;
    }
}
