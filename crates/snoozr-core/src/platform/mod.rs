//! Process inspection and signal delivery
//!
//! The engine only talks to the [`ProcessControl`] trait. One native
//! implementation is selected at build time.

use crate::Result;

#[cfg(unix)]
pub mod unix;

#[cfg(target_os = "linux")]
pub mod x11;

#[cfg(unix)]
pub use unix::NativeProcessControl;

/// Name reported for processes that cannot be inspected
pub const PLACEHOLDER_NAME: &str = "Unknown";

/// Capabilities the engine needs from the operating system
pub trait ProcessControl {
    /// PID of the frontmost application, `None` when it cannot be determined
    fn active_pid(&self) -> Option<u32>;

    /// Best-effort display name; [`PLACEHOLDER_NAME`] when inaccessible
    fn process_name(&self, pid: u32) -> String;

    /// Suspend execution of `pid`
    fn suspend(&self, pid: u32) -> Result<()>;

    /// Resume execution of `pid`; harmless on a running process
    fn resume(&self, pid: u32) -> Result<()>;

    /// Resident memory in bytes
    fn resident_memory_bytes(&self, pid: u32) -> Result<u64>;

    /// Opaque start time used to tell a reused PID apart
    fn start_token(&self, _pid: u32) -> Option<u64> {
        None
    }

    /// True for the processes this tool was launched from (shell, terminal)
    fn is_own_ancestor(&self, _pid: u32) -> bool {
        false
    }
}
