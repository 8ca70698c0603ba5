use crate::{Error, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// Signal-based freeze/thaw
pub struct SignalExecutor;

impl SignalExecutor {
    /// Check if process exists
    ///
    /// Uses kill(pid, 0) - doesn't signal the process, only checks existence
    pub fn process_exists(pid: u32) -> Result<bool> {
        let process_pid = Pid::from_raw(pid as i32);

        match kill(process_pid, None) {
            Ok(_) => Ok(true),
            Err(nix::errno::Errno::ESRCH) => Ok(false),
            Err(nix::errno::Errno::EPERM) => Ok(true), // No permission, but process exists
            Err(e) => Err(Error::Signal(format!(
                "Failed to check process {}: {}",
                pid, e
            ))),
        }
    }

    /// Freeze process (SIGSTOP)
    ///
    /// Refuses init and the calling process itself.
    pub fn freeze_process(pid: u32) -> Result<()> {
        if pid <= 1 || pid == std::process::id() {
            return Err(Error::Signal(format!("Refusing to freeze PID {}", pid)));
        }

        if !Self::process_exists(pid)? {
            return Err(Error::Signal(format!("Process {} does not exist", pid)));
        }

        kill(Pid::from_raw(pid as i32), Signal::SIGSTOP)
            .map_err(|e| Error::Signal(format!("Failed to freeze process {}: {}", pid, e)))
    }

    /// Unfreeze process (SIGCONT)
    ///
    /// SIGCONT on a running process is a no-op, so this is safe to repeat.
    pub fn unfreeze_process(pid: u32) -> Result<()> {
        if !Self::process_exists(pid)? {
            return Err(Error::Signal(format!("Process {} does not exist", pid)));
        }

        kill(Pid::from_raw(pid as i32), Signal::SIGCONT)
            .map_err(|e| Error::Signal(format!("Failed to unfreeze process {}: {}", pid, e)))
    }
}
