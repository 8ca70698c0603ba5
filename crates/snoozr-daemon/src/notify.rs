//! Best-effort desktop notifications

use snoozr_core::{FreezeOutcome, TickReport};
use std::process::Stdio;
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::debug;

const TITLE: &str = "snoozr";

/// Notification text for everything worth telling the user about in a tick
pub fn tick_messages(report: &TickReport) -> Vec<String> {
    let mut messages: Vec<String> = report
        .freezes
        .iter()
        .filter(|freeze| freeze.outcome == FreezeOutcome::Frozen)
        .map(|freeze| format!("Froze {} (+{:.0} MB RAM)", freeze.name, freeze.memory_mb))
        .collect();

    if let Some(sentinel) = &report.sentinel {
        if !sentinel.thawed.is_empty() {
            messages.push("Unlock complete. Apps thawed for access.".to_string());
        }
        if sentinel.persistent_blindness {
            messages.push(
                "Cannot see the focused window. Check window introspection permissions."
                    .to_string(),
            );
        }
    }

    messages
}

/// Sends notifications through the desktop's command-line notifier
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn notify_tick(&self, report: &TickReport) {
        if !self.enabled {
            return;
        }
        for message in tick_messages(report) {
            self.send(&message);
        }
    }

    /// Fire and forget; failures only show up in debug logs
    ///
    /// The child is never awaited. tokio reaps it in the background, which
    /// needs a runtime, so outside one nothing is sent.
    pub fn send(&self, message: &str) {
        if !self.enabled {
            return;
        }

        if Handle::try_current().is_err() {
            debug!("No tokio runtime, dropping notification");
            return;
        }

        let Some(mut command) = notify_command(message) else {
            debug!("No notifier available on this platform");
            return;
        };

        spawn_detached(&mut command);
    }
}

fn spawn_detached(command: &mut Command) {
    let result = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false)
        .spawn();

    if let Err(e) = result {
        debug!("Failed to run notifier: {}", e);
    }
}

#[cfg(target_os = "macos")]
fn notify_command(message: &str) -> Option<Command> {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        escape_applescript(message),
        TITLE
    );
    let mut command = Command::new("osascript");
    command.arg("-e").arg(script);
    Some(command)
}

#[cfg(target_os = "macos")]
fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(all(unix, not(target_os = "macos")))]
fn notify_command(message: &str) -> Option<Command> {
    let mut command = Command::new("notify-send");
    command.arg(TITLE).arg(message);
    Some(command)
}

#[cfg(not(unix))]
fn notify_command(_message: &str) -> Option<Command> {
    None
}
