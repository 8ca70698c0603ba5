//! Sentinel observation classifier
//!
//! Some foreground names are proxies for "the user is looking at a system
//! surface", usually because the window they actually want is frozen and
//! cannot be raised. The engine answers those with a thaw-all.

#[cfg(target_os = "linux")]
use crate::platform::PLACEHOLDER_NAME;
use serde::{Deserialize, Serialize};

/// Screen lockers; the user sees these while their real window is frozen
#[cfg(target_os = "linux")]
pub const DEFAULT_SHELL_SURFACES: &[&str] =
    &["xscreensaver", "i3lock", "light-locker", "xsecurelock"];

/// Unreadable foreground processes come back with the placeholder name
#[cfg(target_os = "linux")]
pub const DEFAULT_BLIND_MARKER: &str = PLACEHOLDER_NAME;

#[cfg(not(target_os = "linux"))]
pub const DEFAULT_SHELL_SURFACES: &[&str] = &["loginwindow", "Dock"];

/// Reported by the window server when screen-recording permission is missing
#[cfg(not(target_os = "linux"))]
pub const DEFAULT_BLIND_MARKER: &str = "WindowManager";

pub const DEFAULT_BLIND_THRESHOLD: u32 = 5;

/// Which names count as sentinel proxies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentinelSettings {
    /// Shell/login surfaces that trigger an ordinary sentinel recovery
    pub shell_surfaces: Vec<String>,

    /// Name reported when the observation layer cannot see the real window
    pub blind_marker: String,

    /// Consecutive blind observations before blindness is reported as persistent
    pub blind_threshold: u32,
}

impl SentinelSettings {
    pub fn new(shell_surfaces: &[&str], blind_marker: &str) -> Self {
        Self {
            shell_surfaces: shell_surfaces.iter().map(|s| s.to_string()).collect(),
            blind_marker: blind_marker.to_string(),
            blind_threshold: DEFAULT_BLIND_THRESHOLD,
        }
    }
}

impl Default for SentinelSettings {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL_SURFACES, DEFAULT_BLIND_MARKER)
    }
}

/// Classification of one foreground observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// A real application, goes through the filter and history
    Application,
    /// A shell surface
    ShellSurface,
    /// The blindness marker; `persistent` once the streak reaches the threshold
    Blind { streak: u32, persistent: bool },
}

impl Observation {
    pub fn is_proxy(&self) -> bool {
        !matches!(self, Observation::Application)
    }
}

/// Tracks the consecutive-blindness streak across ticks
#[derive(Debug, Clone, Default)]
pub struct Sentinel {
    settings: SentinelSettings,
    blind_streak: u32,
}

impl Sentinel {
    pub fn new(settings: SentinelSettings) -> Self {
        Self {
            settings,
            blind_streak: 0,
        }
    }

    pub fn settings(&self) -> &SentinelSettings {
        &self.settings
    }

    pub fn blind_streak(&self) -> u32 {
        self.blind_streak
    }

    /// Classify `name` and advance the blindness streak
    ///
    /// Any name other than the blind marker resets the streak. Reaching the
    /// threshold reports persistence once and starts counting again.
    pub fn observe(&mut self, name: &str) -> Observation {
        if name == self.settings.blind_marker {
            self.blind_streak += 1;
            let streak = self.blind_streak;
            let persistent = streak >= self.settings.blind_threshold.max(1);
            if persistent {
                self.blind_streak = 0;
            }
            return Observation::Blind { streak, persistent };
        }

        self.blind_streak = 0;
        if self.settings.shell_surfaces.iter().any(|s| s == name) {
            Observation::ShellSurface
        } else {
            Observation::Application
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop_sentinel() -> Sentinel {
        Sentinel::new(SentinelSettings::new(&["loginwindow", "Dock"], "WindowManager"))
    }

    #[test]
    fn test_default_settings() {
        let settings = SentinelSettings::default();

        assert_eq!(settings.shell_surfaces, DEFAULT_SHELL_SURFACES);
        assert_eq!(settings.blind_marker, DEFAULT_BLIND_MARKER);
        assert_eq!(settings.blind_threshold, 5);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_defaults_treat_placeholder_as_blind() {
        let mut sentinel = Sentinel::default();

        assert_eq!(
            sentinel.observe(PLACEHOLDER_NAME),
            Observation::Blind {
                streak: 1,
                persistent: false
            }
        );
        assert_eq!(sentinel.observe("i3lock"), Observation::ShellSurface);
        assert_eq!(sentinel.observe("firefox"), Observation::Application);
    }

    #[test]
    fn test_classification() {
        let mut sentinel = desktop_sentinel();

        assert_eq!(sentinel.observe("firefox"), Observation::Application);
        assert_eq!(sentinel.observe("Dock"), Observation::ShellSurface);
        assert_eq!(sentinel.observe("loginwindow"), Observation::ShellSurface);
        assert!(sentinel.observe("WindowManager").is_proxy());
    }

    #[test]
    fn test_proxy_match_is_exact() {
        let mut sentinel = desktop_sentinel();

        assert_eq!(sentinel.observe("Dockerd"), Observation::Application);
        assert_eq!(sentinel.observe("MyWindowManager"), Observation::Application);
    }

    #[test]
    fn test_blindness_becomes_persistent_on_fifth_tick() {
        let mut sentinel = desktop_sentinel();

        for expected in 1..5 {
            assert_eq!(
                sentinel.observe("WindowManager"),
                Observation::Blind {
                    streak: expected,
                    persistent: false
                }
            );
        }

        assert_eq!(
            sentinel.observe("WindowManager"),
            Observation::Blind {
                streak: 5,
                persistent: true
            }
        );

        // Streak restarts after the alert
        assert_eq!(sentinel.blind_streak(), 0);
        assert_eq!(
            sentinel.observe("WindowManager"),
            Observation::Blind {
                streak: 1,
                persistent: false
            }
        );
    }

    #[test]
    fn test_other_names_reset_streak() {
        let mut sentinel = desktop_sentinel();

        sentinel.observe("WindowManager");
        sentinel.observe("WindowManager");
        assert_eq!(sentinel.blind_streak(), 2);

        sentinel.observe("Dock");
        assert_eq!(sentinel.blind_streak(), 0);

        sentinel.observe("WindowManager");
        sentinel.observe("firefox");
        assert_eq!(sentinel.blind_streak(), 0);
    }

    #[test]
    fn test_custom_settings() {
        let mut sentinel = Sentinel::new(SentinelSettings {
            shell_surfaces: vec!["gnome-shell".to_string()],
            blind_marker: "Unknown".to_string(),
            blind_threshold: 2,
        });

        assert_eq!(sentinel.observe("gnome-shell"), Observation::ShellSurface);
        assert_eq!(sentinel.observe("Dock"), Observation::Application);
        sentinel.observe("Unknown");
        assert_eq!(
            sentinel.observe("Unknown"),
            Observation::Blind {
                streak: 2,
                persistent: true
            }
        );
    }
}
