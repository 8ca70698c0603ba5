//! End-of-session report
//!
//! Printed to the terminal, logged, and exported as JSON next to the logs.

use colored::*;
use serde::{Deserialize, Serialize};
use snoozr_core::SessionStats;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;

/// File name of the JSON export inside the log directory
pub const REPORT_FILE: &str = "session.json";

/// Complete statistics snapshot for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Timestamp when the session ended
    pub timestamp: u64,

    /// Runtime duration in seconds
    pub runtime_secs: u64,

    /// Apps successfully frozen
    pub apps_frozen: u64,

    /// Resident memory of frozen apps at freeze time, in whole MB
    pub ram_reclaimed_mb: u64,

    /// Apps thawed for any reason
    pub thaws: u64,

    /// Sentinel recoveries that released at least one app
    pub sentinel_recoveries: u64,

    /// Session ran without suspending anything
    pub dry_run: bool,
}

impl SessionReport {
    pub fn new(stats: &SessionStats, runtime: Duration, dry_run: bool) -> Self {
        Self {
            timestamp: Self::current_timestamp(),
            runtime_secs: runtime.as_secs(),
            apps_frozen: stats.frozen_count,
            ram_reclaimed_mb: stats.reclaimed_mb,
            thaws: stats.thaw_count,
            sentinel_recoveries: stats.sentinel_recoveries,
            dry_run,
        }
    }

    /// Get current timestamp
    pub fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs()
    }

    pub fn uptime(&self) -> String {
        humantime::format_duration(Duration::from_secs(self.runtime_secs)).to_string()
    }

    /// Boxed summary for the terminal
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        lines.push("╔═══════════════════════════════════════════════════════════╗".to_string());
        lines.push("║                   snoozr Session Report                   ║".to_string());
        lines.push("╚═══════════════════════════════════════════════════════════╝".to_string());

        if self.dry_run {
            lines.push(format!("   {}", "DRY-RUN: nothing was suspended".yellow()));
        }
        lines.push(format!("   Uptime:              {}", self.uptime()));
        lines.push(format!(
            "   Apps frozen:         {}",
            self.apps_frozen.to_string().cyan()
        ));
        lines.push(format!(
            "   RAM reclaimed:       {}",
            format!("{} MB", self.ram_reclaimed_mb).green().bold()
        ));
        lines.push(format!("   Thaws:               {}", self.thaws));
        lines.push(format!("   Sentinel recoveries: {}", self.sentinel_recoveries));

        lines.join("\n")
    }

    pub fn log(&self) {
        info!(
            "Session report: {} apps frozen, {} MB reclaimed, {} thaws, {} sentinel recoveries, uptime {}{}",
            self.apps_frozen,
            self.ram_reclaimed_mb,
            self.thaws,
            self.sentinel_recoveries,
            self.uptime(),
            if self.dry_run { " (dry-run)" } else { "" }
        );
    }

    /// Write the report as JSON into `log_dir`, returning the file path
    pub fn export(&self, log_dir: &Path) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(log_dir)?;
        let path = log_dir.join(REPORT_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}
