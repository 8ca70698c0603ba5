use crate::{
    filter::{Exemption, SafetyFilter},
    history::{AppHistory, DEFAULT_CAPACITY},
    platform::ProcessControl,
    sentinel::{Observation, Sentinel, SentinelSettings},
    stats::SessionStats,
    types::{FreezeDirective, FreezeOutcome, ThawDirective, ThawReason},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Attempts at resuming an evicted app before it is given up on
pub const MAX_THAW_ATTEMPTS: u32 = 10;

/// Runtime thresholds for the idle scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Freeze apps idle for longer than this
    pub idle_timeout_secs: u64,

    /// Only freeze apps using more than this much resident memory
    pub min_memory_mb: u64,

    /// Report freeze candidates without suspending them
    pub dry_run: bool,

    /// Number of history slots
    pub history_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 10,
            min_memory_mb: 50,
            dry_run: false,
            history_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Result of a sentinel recovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelReport {
    pub observed: String,
    pub thawed: Vec<ThawDirective>,
    pub blind_streak: u32,
    /// The observation layer has been blind long enough to alert the operator
    pub persistent_blindness: bool,
}

/// Everything that happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub active_pid: Option<u32>,
    pub active_name: Option<String>,
    pub thaws: Vec<ThawDirective>,
    pub freezes: Vec<FreezeDirective>,
    pub sentinel: Option<SentinelReport>,
}

/// Evicted app whose resume failed; no longer in the history
#[derive(Debug, Clone)]
struct PendingThaw {
    directive: ThawDirective,
    attempts: u32,
}

/// Freeze/thaw engine
///
/// Owns the application history and the session statistics. One `tick`
/// per polling interval; `shutdown` thaws everything exactly once.
///
/// A failed resume is never forgotten: tracked apps stay marked frozen,
/// evicted ones go to a pending list retried every tick and at shutdown.
pub struct FreezeEngine<P: ProcessControl> {
    platform: P,
    filter: SafetyFilter,
    sentinel: Sentinel,
    settings: EngineSettings,
    history: AppHistory,
    pending_thaws: Vec<PendingThaw>,
    stats: SessionStats,
    shut_down: bool,
}

impl<P: ProcessControl> FreezeEngine<P> {
    /// Create new engine
    ///
    /// # Arguments
    /// * `platform` - Process inspection and signal delivery
    /// * `filter` - Built-in blacklist plus the loaded whitelist
    /// * `settings` - Idle timeout, memory floor, dry-run, history size
    /// * `sentinel` - Names treated as sentinel proxies
    pub fn new(
        platform: P,
        filter: SafetyFilter,
        settings: EngineSettings,
        sentinel: SentinelSettings,
    ) -> Self {
        Self {
            platform,
            filter,
            sentinel: Sentinel::new(sentinel),
            history: AppHistory::new(settings.history_capacity),
            pending_thaws: Vec::new(),
            settings,
            stats: SessionStats::new(),
            shut_down: false,
        }
    }

    /// Perform one polling tick
    ///
    /// 1. Retry resumes of evicted apps that failed earlier
    /// 2. Poll the foreground PID and resolve its name
    /// 3. Sentinel proxies trigger a thaw-all and are never tracked
    /// 4. Other names go through the safety filter into the history,
    ///    thawing the app if it was frozen
    /// 5. Scan the rest of the history for idle apps to freeze
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();
        report.thaws = self.retry_pending_thaws();

        let active_pid = self.platform.active_pid().filter(|pid| *pid > 0);
        report.active_pid = active_pid;

        if let Some(pid) = active_pid {
            let name = self.platform.process_name(pid);

            report.sentinel = self.sentinel_check(&name, now);
            if report.sentinel.is_none() {
                report.thaws.extend(self.observe_app(pid, &name, now));
            }

            report.active_name = Some(name);
        }

        report.freezes = self.scan_idle(now, active_pid);
        report
    }

    /// Run sentinel recovery if `observed_name` is a proxy
    ///
    /// Returns true when the name was a proxy and recovery ran, whether or
    /// not anything was frozen.
    pub fn maybe_recover(&mut self, observed_name: &str, now: DateTime<Utc>) -> bool {
        self.sentinel_check(observed_name, now).is_some()
    }

    fn sentinel_check(&mut self, name: &str, now: DateTime<Utc>) -> Option<SentinelReport> {
        let observation = self.sentinel.observe(name);

        let (blind_streak, persistent_blindness) = match observation {
            Observation::Application => return None,
            Observation::ShellSurface => (0, false),
            Observation::Blind { streak, persistent } => {
                if persistent {
                    error!(
                        "Observation layer is blind: foreground reported as '{}' for {} ticks in a row. \
                         Window introspection permissions are probably missing",
                        name, streak
                    );
                } else {
                    debug!("Blind observation #{} ('{}')", streak, name);
                }
                (streak, persistent)
            }
        };

        let thawed = self.speculative_thaw(now);
        Some(SentinelReport {
            observed: name.to_string(),
            thawed,
            blind_streak,
            persistent_blindness,
        })
    }

    /// Thaw every frozen app and restart its idle clock
    ///
    /// A no-op when nothing is frozen.
    pub fn speculative_thaw(&mut self, now: DateTime<Utc>) -> Vec<ThawDirective> {
        let thawed = self.thaw_frozen(ThawReason::Sentinel, Some(now));
        if !thawed.is_empty() {
            self.stats.record_sentinel_recovery();
        }
        thawed
    }

    /// Filter and record a foreground application
    pub fn observe_app(&mut self, pid: u32, name: &str, now: DateTime<Utc>) -> Option<ThawDirective> {
        if let Some(exemption) = self.filter.exemption(name) {
            match exemption {
                Exemption::Builtin(token) => {
                    debug!("Ignoring '{}' (matches built-in list: '{}')", name, token)
                }
                Exemption::Whitelist(token) => {
                    debug!("Ignoring '{}' (matches whitelist: '{}')", name, token)
                }
            }
            return None;
        }

        if self.platform.is_own_ancestor(pid) {
            debug!("Ignoring '{}' (PID {} launched snoozr)", name, pid);
            return None;
        }

        let start_token = self.platform.start_token(pid);
        if self.history.get(pid).is_none() {
            info!("Tracking new app: {} (PID {})", name, pid);
        }

        let directive = self.history.update(pid, name, start_token, now)?;
        if self.execute_thaw(&directive) {
            return Some(directive);
        }

        match directive.reason {
            // The slot is gone already
            ThawReason::Evicted => self.pending_thaws.push(PendingThaw {
                directive,
                attempts: 1,
            }),
            _ => self.mark_frozen(directive.pid),
        }
        None
    }

    /// Scan tracked apps and freeze the idle ones
    ///
    /// For every occupied, unfrozen slot other than `active_pid`:
    /// 1. Read resident memory; skip the slot this tick on failure
    /// 2. Skip if memory does not exceed the floor
    /// 3. Freeze if idle time exceeds the timeout
    pub fn scan_idle(&mut self, now: DateTime<Utc>, active_pid: Option<u32>) -> Vec<FreezeDirective> {
        let Self {
            platform,
            settings,
            history,
            stats,
            ..
        } = self;

        let mut directives = Vec::new();
        let mut stale = Vec::new();

        for app in history.iter_mut() {
            if app.is_frozen || Some(app.pid) == active_pid {
                continue;
            }

            let memory_mb = match platform.resident_memory_bytes(app.pid) {
                Ok(bytes) => bytes as f64 / BYTES_PER_MB,
                Err(e) => {
                    debug!("Skipping {} (PID {}): {}", app.name, app.pid, e);
                    continue;
                }
            };

            if memory_mb <= settings.min_memory_mb as f64 {
                continue;
            }

            if !app.idle_exceeds(now, settings.idle_timeout_secs) {
                continue;
            }
            let idle_secs = app.idle_secs(now);

            if !app.same_process(platform.start_token(app.pid)) {
                warn!(
                    "PID {} no longer belongs to {}, dropping it from history",
                    app.pid, app.name
                );
                stale.push(app.pid);
                continue;
            }

            let outcome = if settings.dry_run {
                info!(
                    "[DRY-RUN] Would have frozen {} (PID {}). Saving {:.0} MB",
                    app.name, app.pid, memory_mb
                );
                // Restart the clock so the same candidate is not reported every tick
                app.last_active = now;
                FreezeOutcome::DryRun
            } else {
                info!(
                    "{} (PID {}) inactive for {}. Freezing!",
                    app.name,
                    app.pid,
                    humantime::format_duration(Duration::from_secs(idle_secs.max(0) as u64))
                );

                match platform.suspend(app.pid) {
                    Ok(()) => {
                        app.is_frozen = true;
                        stats.record_freeze(memory_mb);
                        info!(
                            "Froze {} (+{:.0} MB). Session: {} freezes, {} MB reclaimed",
                            app.name, memory_mb, stats.frozen_count, stats.reclaimed_mb
                        );
                        FreezeOutcome::Frozen
                    }
                    Err(e) => {
                        warn!("Failed to freeze {} (PID {}): {}", app.name, app.pid, e);
                        FreezeOutcome::Failed
                    }
                }
            };

            directives.push(FreezeDirective {
                pid: app.pid,
                name: app.name.clone(),
                memory_mb,
                idle_secs,
                outcome,
            });
        }

        for pid in stale {
            history.release(pid);
        }

        directives
    }

    /// Thaw everything and return the final statistics
    ///
    /// Only the first call does any work.
    pub fn shutdown(&mut self) -> SessionStats {
        if self.shut_down {
            return self.stats;
        }
        self.shut_down = true;

        let mut restored = self.retry_pending_thaws();
        restored.extend(self.thaw_frozen(ThawReason::Shutdown, None));

        let stuck = self.history.frozen_count() + self.pending_thaws.len();
        if stuck == 0 {
            info!("All processes restored ({} thawed on shutdown)", restored.len());
        } else {
            error!(
                "{} thawed on shutdown, {} could not be resumed (send SIGCONT manually)",
                restored.len(),
                stuck
            );
        }

        self.stats
    }

    /// Evicted apps still waiting for a successful resume
    pub fn pending_thaw_count(&self) -> usize {
        self.pending_thaws.len()
    }

    fn retry_pending_thaws(&mut self) -> Vec<ThawDirective> {
        let mut thawed = Vec::new();

        for mut pending in std::mem::take(&mut self.pending_thaws) {
            if self.execute_thaw(&pending.directive) {
                thawed.push(pending.directive);
                continue;
            }

            pending.attempts += 1;
            if pending.attempts >= MAX_THAW_ATTEMPTS {
                error!(
                    "Giving up on resuming {} (PID {}) after {} attempts",
                    pending.directive.name, pending.directive.pid, pending.attempts
                );
            } else {
                self.pending_thaws.push(pending);
            }
        }

        thawed
    }

    /// Thaw every frozen tracked app, returning the ones actually resumed
    ///
    /// Apps whose resume fails stay marked frozen so a later return,
    /// sentinel or shutdown tries again.
    fn thaw_frozen(&mut self, reason: ThawReason, now: Option<DateTime<Utc>>) -> Vec<ThawDirective> {
        let mut directives = Vec::new();

        for app in self.history.iter_mut().filter(|app| app.is_frozen) {
            app.is_frozen = false;
            if let Some(now) = now {
                app.last_active = now;
            }
            directives.push(ThawDirective {
                pid: app.pid,
                name: app.name.clone(),
                reason,
            });
        }

        let mut thawed = Vec::with_capacity(directives.len());
        for directive in directives {
            if self.execute_thaw(&directive) {
                thawed.push(directive);
            } else {
                self.mark_frozen(directive.pid);
            }
        }

        thawed
    }

    fn mark_frozen(&mut self, pid: u32) {
        if let Some(app) = self.history.iter_mut().find(|app| app.pid == pid) {
            app.is_frozen = true;
        }
    }

    /// Send SIGCONT for `directive`, true on success
    fn execute_thaw(&mut self, directive: &ThawDirective) -> bool {
        let ThawDirective { pid, name, reason } = directive;

        match self.platform.resume(*pid) {
            Ok(()) => {
                self.stats.record_thaw();
                match reason {
                    ThawReason::UserReturned => {
                        info!("Welcome back, {} (PID {}). Thawed", name, pid)
                    }
                    ThawReason::Evicted => {
                        warn!("History full! Evicted frozen app {} (PID {}), thawed first", name, pid)
                    }
                    ThawReason::Sentinel => {
                        info!("[SENTINEL] UI struggle detected! Emergency thaw: {} (PID {})", name, pid)
                    }
                    ThawReason::Shutdown => {
                        info!("[RESTORE] Emergency thaw: {} (PID {})", name, pid)
                    }
                }
                true
            }
            Err(e) => {
                warn!("Failed to thaw {} (PID {}): {}, will retry", name, pid, e);
                false
            }
        }
    }

    pub fn history(&self) -> &AppHistory {
        &self.history
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn filter(&self) -> &SafetyFilter {
        &self.filter
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}
