use crate::notify::Notifier;
use chrono::{DateTime, Utc};
use snoozr_core::{FreezeEngine, ProcessControl, SessionStats};
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Foreground monitor
///
/// Drives the freeze engine at a fixed cadence until cancelled, then thaws
/// everything. Wall-clock time is derived from the tokio clock so the loop
/// can be tested with paused time.
pub struct FocusMonitor<P: ProcessControl> {
    engine: FreezeEngine<P>,
    notifier: Notifier,
    interval: Duration,
    epoch: DateTime<Utc>,
    started: Instant,
    ticks: u64,
}

impl<P: ProcessControl> FocusMonitor<P> {
    /// Create new monitor
    ///
    /// # Arguments
    /// * `engine` - Configured freeze engine
    /// * `notifier` - Desktop notifications for tick outcomes
    /// * `interval` - Polling interval (e.g., 1s)
    pub fn new(engine: FreezeEngine<P>, notifier: Notifier, interval: Duration) -> Self {
        Self {
            engine,
            notifier,
            interval,
            epoch: Utc::now(),
            started: Instant::now(),
            ticks: 0,
        }
    }

    /// Current time on the monitor's clock
    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.epoch + elapsed
    }

    /// Run until `shutdown` is cancelled and return the final statistics
    ///
    /// The first tick happens immediately. All frozen apps are thawed
    /// before this returns.
    pub async fn run(&mut self, shutdown: CancellationToken) -> SessionStats {
        info!(
            "Monitoring foreground every {}",
            humantime::format_duration(self.interval)
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown requested after {} ticks, restoring processes...", self.ticks);
                    break;
                }

                _ = ticker.tick() => {
                    self.check();
                }
            }
        }

        self.engine.shutdown()
    }

    /// Perform a single tick
    pub fn check(&mut self) {
        self.ticks += 1;
        let report = self.engine.tick(self.now());

        if let Some(sentinel) = &report.sentinel {
            debug!(
                "Sentinel tick #{}: '{}' released {} apps",
                self.ticks,
                sentinel.observed,
                sentinel.thawed.len()
            );
        } else if report.active_pid.is_none() && self.ticks == 1 {
            warn!("No foreground application detected, only idle scans will run");
        }

        self.notifier.notify_tick(&report);
    }

    pub fn engine(&self) -> &FreezeEngine<P> {
        &self.engine
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Cancel `token` on SIGINT or SIGTERM
pub fn spawn_signal_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => info!("Received {}", name),
            Err(e) => warn!("Signal listener failed: {}, shutting down", e),
        }
        token.cancel();
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use snoozr_core::{EngineSettings, Error, Result, SafetyFilter, SentinelSettings};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use tokio::time::sleep;

    const MB: u64 = 1024 * 1024;

    #[derive(Clone, Default)]
    struct SharedPlatform {
        active: Rc<Cell<Option<u32>>>,
        suspended: Rc<RefCell<Vec<u32>>>,
        resumed: Rc<RefCell<Vec<u32>>>,
    }

    impl ProcessControl for SharedPlatform {
        fn active_pid(&self) -> Option<u32> {
            self.active.get()
        }

        fn process_name(&self, pid: u32) -> String {
            match pid {
                1001 => "firefox".to_string(),
                1002 => "gimp".to_string(),
                _ => "Unknown".to_string(),
            }
        }

        fn suspend(&self, pid: u32) -> Result<()> {
            self.suspended.borrow_mut().push(pid);
            Ok(())
        }

        fn resume(&self, pid: u32) -> Result<()> {
            self.resumed.borrow_mut().push(pid);
            Ok(())
        }

        fn resident_memory_bytes(&self, pid: u32) -> Result<u64> {
            match pid {
                1001 | 1002 => Ok(60 * MB),
                _ => Err(Error::Platform(format!("Process {} not found", pid))),
            }
        }
    }

    fn monitor(platform: SharedPlatform) -> FocusMonitor<SharedPlatform> {
        let engine = FreezeEngine::new(
            platform,
            SafetyFilter::default(),
            EngineSettings::default(),
            SentinelSettings::default(),
        );
        FocusMonitor::new(engine, Notifier::new(false), Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_tokio_time() {
        let monitor = monitor(SharedPlatform::default());
        let before = monitor.now();

        sleep(Duration::from_secs(30)).await;

        assert_eq!((monitor.now() - before).num_seconds(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_app_frozen_then_restored_on_shutdown() {
        let platform = SharedPlatform::default();
        platform.active.set(Some(1001));
        let mut monitor = monitor(platform.clone());

        let token = CancellationToken::new();
        let driver = {
            let token = token.clone();
            let active = platform.active.clone();
            async move {
                sleep(Duration::from_millis(500)).await;
                active.set(Some(1002));
                sleep(Duration::from_secs(12)).await;
                token.cancel();
            }
        };

        let (stats, ()) = tokio::join!(monitor.run(token), driver);

        assert_eq!(*platform.suspended.borrow(), vec![1001]);
        assert_eq!(*platform.resumed.borrow(), vec![1001]);
        assert_eq!(stats.frozen_count, 1);
        assert_eq!(stats.reclaimed_mb, 60);
        assert_eq!(stats.thaw_count, 1);
        assert!(monitor.engine().is_shut_down());
        assert!(monitor.ticks() >= 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start_still_shuts_down() {
        let mut monitor = monitor(SharedPlatform::default());
        let token = CancellationToken::new();
        token.cancel();

        let stats = monitor.run(token).await;

        assert_eq!(stats, SessionStats::default());
        assert_eq!(monitor.ticks(), 0);
        assert!(monitor.engine().is_shut_down());
    }
}
