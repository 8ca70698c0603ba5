//! snoozr Daemon
//!
//! Runs the freeze engine against the live desktop: configuration,
//! whitelist, notifications, signal handling and the session report.

pub mod config;
#[cfg(unix)]
pub mod daemonize;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod setup;
pub mod stats;
pub mod whitelist;

pub use config::Config;
pub use monitor::{spawn_signal_listener, FocusMonitor};
pub use notify::Notifier;
pub use stats::SessionReport;
