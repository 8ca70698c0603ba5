//! Bounded history of foreground applications
//!
//! A fixed number of slots plus a round-robin write cursor. Lookups are a
//! linear scan by PID; at this size that is cheaper than any index and
//! keeps the thaw-before-evict ordering easy to follow.

use crate::types::{ThawDirective, ThawReason, TrackedApp};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Default number of tracked applications
pub const DEFAULT_CAPACITY: usize = 7;

#[derive(Debug, Clone)]
pub struct AppHistory {
    slots: Vec<Option<TrackedApp>>,
    cursor: usize,
}

impl Default for AppHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AppHistory {
    /// Create an empty history; a capacity of 0 is bumped to 1
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot the next new application will claim
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw slot view, in slot order
    pub fn slots(&self) -> &[Option<TrackedApp>] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedApp> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedApp> {
        self.slots.iter_mut().flatten()
    }

    pub fn get(&self, pid: u32) -> Option<&TrackedApp> {
        self.iter().find(|app| app.pid == pid)
    }

    pub fn frozen_count(&self) -> usize {
        self.iter().filter(|app| app.is_frozen).count()
    }

    /// Record `pid` as the foreground application at `now`
    ///
    /// Algorithm:
    /// 1. Known PID: refresh its timestamp; if it was frozen, clear the flag
    ///    and hand back a thaw directive
    /// 2. Known PID with a different start token: the OS reused the PID, so
    ///    the slot is re-initialised for the new process (the process we
    ///    suspended is gone, nothing to thaw)
    /// 3. New PID: claim the cursor slot, handing back a thaw directive for
    ///    the evicted app if it was frozen, then advance the cursor
    pub fn update(
        &mut self,
        pid: u32,
        name: &str,
        start_token: Option<u64>,
        now: DateTime<Utc>,
    ) -> Option<ThawDirective> {
        if let Some(app) = self.slots.iter_mut().flatten().find(|app| app.pid == pid) {
            if !app.same_process(start_token) {
                warn!(
                    "PID {} was reused ({} -> {}), resetting its slot",
                    pid, app.name, name
                );
                *app = TrackedApp::new(pid, name, start_token, now);
                return None;
            }

            app.last_active = now;
            if app.is_frozen {
                app.is_frozen = false;
                return Some(ThawDirective {
                    pid,
                    name: app.name.clone(),
                    reason: ThawReason::UserReturned,
                });
            }
            return None;
        }

        let slot = &mut self.slots[self.cursor];
        let evicted = match slot.as_ref() {
            Some(old) if old.is_frozen => Some(ThawDirective {
                pid: old.pid,
                name: old.name.clone(),
                reason: ThawReason::Evicted,
            }),
            Some(old) => {
                debug!("Evicting idle slot {} ({}, PID {})", self.cursor, old.name, old.pid);
                None
            }
            None => None,
        };

        *slot = Some(TrackedApp::new(pid, name, start_token, now));
        self.cursor = (self.cursor + 1) % self.slots.len();

        evicted
    }

    /// Drop the slot holding `pid` without any directive
    pub fn release(&mut self, pid: u32) -> Option<TrackedApp> {
        self.slots
            .iter_mut()
            .find(|slot| slot.as_ref().map(|app| app.pid) == Some(pid))
            .and_then(Option::take)
    }
}
