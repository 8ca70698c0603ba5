use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest display name kept in a slot
pub const MAX_NAME_LEN: usize = 255;

/// One tracked application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedApp {
    pub pid: u32,
    pub name: String,
    pub last_active: DateTime<Utc>,
    pub is_frozen: bool,
    /// Process start time captured when the slot was claimed
    pub start_token: Option<u64>,
}

impl TrackedApp {
    pub fn new(pid: u32, name: &str, start_token: Option<u64>, now: DateTime<Utc>) -> Self {
        Self {
            pid,
            name: truncate_name(name),
            last_active: now,
            is_frozen: false,
            start_token,
        }
    }

    /// Whole seconds since this app was last in the foreground
    pub fn idle_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_active).num_seconds()
    }

    // Idle time exceeds the threshold?
    pub fn idle_exceeds(&self, now: DateTime<Utc>, timeout_secs: u64) -> bool {
        self.idle_secs(now) > timeout_secs as i64
    }

    /// Same process as the one we tracked, as far as start tokens can tell
    pub fn same_process(&self, start_token: Option<u64>) -> bool {
        match (self.start_token, start_token) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => true,
        }
    }
}

fn truncate_name(name: &str) -> String {
    match name.char_indices().nth(MAX_NAME_LEN) {
        Some((idx, _)) => name[..idx].to_string(),
        None => name.to_string(),
    }
}

/// Why a process is being thawed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThawReason {
    /// The user brought it back to the foreground
    UserReturned,
    /// Its slot was reclaimed for a new application
    Evicted,
    /// Sentinel recovery
    Sentinel,
    /// Orderly shutdown
    Shutdown,
}

/// Resume `pid`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThawDirective {
    pub pid: u32,
    pub name: String,
    pub reason: ThawReason,
}

/// Suspend `pid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeDirective {
    pub pid: u32,
    pub name: String,
    pub memory_mb: f64,
    pub idle_secs: i64,
    pub outcome: FreezeOutcome,
}

/// What happened to a freeze directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreezeOutcome {
    Frozen,
    /// Reported only, dry-run mode
    DryRun,
    /// Suspend failed, retried on a later tick
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_tracked_app_creation() {
        let app = TrackedApp::new(1234, "firefox", Some(99), at(100));

        assert_eq!(app.pid, 1234);
        assert_eq!(app.name, "firefox");
        assert_eq!(app.last_active, at(100));
        assert!(!app.is_frozen);
        assert_eq!(app.start_token, Some(99));
    }

    #[test]
    fn test_idle_exceeds_is_strict() {
        let app = TrackedApp::new(1, "firefox", None, at(0));

        assert_eq!(app.idle_secs(at(10)), 10);
        assert!(!app.idle_exceeds(at(10), 10)); // Equal is not exceeding
        assert!(app.idle_exceeds(at(11), 10));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let long = "x".repeat(MAX_NAME_LEN + 40);
        let app = TrackedApp::new(1, &long, None, at(0));
        assert_eq!(app.name.chars().count(), MAX_NAME_LEN);

        let wide = "é".repeat(MAX_NAME_LEN + 1);
        let app = TrackedApp::new(1, &wide, None, at(0));
        assert_eq!(app.name.chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_same_process() {
        let app = TrackedApp::new(1, "firefox", Some(500), at(0));

        assert!(app.same_process(Some(500)));
        assert!(!app.same_process(Some(501)));
        assert!(app.same_process(None));

        let unknown = TrackedApp::new(1, "firefox", None, at(0));
        assert!(unknown.same_process(Some(501)));
    }
}
