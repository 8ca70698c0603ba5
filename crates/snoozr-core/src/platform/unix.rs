use super::{ProcessControl, PLACEHOLDER_NAME};
use crate::executor::SignalExecutor;
use crate::{Error, Result};
use std::cell::RefCell;
use sysinfo::{Pid, ProcessRefreshKind, System};

#[cfg(target_os = "linux")]
use super::x11::X11Foreground;

/// Native implementation: sysinfo for inspection, signals for freeze/thaw
pub struct NativeProcessControl {
    // Refreshed one PID at a time
    system: RefCell<System>,
    ancestors: Vec<u32>,
    #[cfg(target_os = "linux")]
    foreground: X11Foreground,
}

impl NativeProcessControl {
    #[cfg(target_os = "linux")]
    pub fn new() -> Result<Self> {
        let mut system = System::new();
        let ancestors = ancestor_pids(&mut system, std::process::id());
        Ok(Self {
            system: RefCell::new(system),
            ancestors,
            foreground: X11Foreground::connect()?,
        })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn new() -> Result<Self> {
        tracing::warn!("No foreground window source on this platform, nothing will be tracked");
        let mut system = System::new();
        let ancestors = ancestor_pids(&mut system, std::process::id());
        Ok(Self {
            system: RefCell::new(system),
            ancestors,
        })
    }

    pub fn ancestors(&self) -> &[u32] {
        &self.ancestors
    }

    /// Refresh one PID, false if it is gone
    fn refresh(&self, pid: u32) -> bool {
        self.system
            .borrow_mut()
            .refresh_process_specifics(Pid::from_u32(pid), ProcessRefreshKind::new().with_memory())
    }
}

/// Parent chain of `pid`, nearest first, stopping before init
pub fn ancestor_pids(system: &mut System, pid: u32) -> Vec<u32> {
    const MAX_DEPTH: usize = 64;

    let mut ancestors = Vec::new();
    let mut current = Pid::from_u32(pid);

    while ancestors.len() < MAX_DEPTH {
        system.refresh_process_specifics(current, ProcessRefreshKind::new());
        let parent = match system.process(current).and_then(|process| process.parent()) {
            Some(parent) => parent,
            None => break,
        };

        let parent_pid = parent.as_u32();
        if parent_pid <= 1 || ancestors.contains(&parent_pid) {
            break;
        }
        ancestors.push(parent_pid);
        current = parent;
    }

    tracing::debug!("Protected ancestor PIDs: {:?}", ancestors);
    ancestors
}

impl ProcessControl for NativeProcessControl {
    #[cfg(target_os = "linux")]
    fn active_pid(&self) -> Option<u32> {
        self.foreground.active_pid()
    }

    #[cfg(not(target_os = "linux"))]
    fn active_pid(&self) -> Option<u32> {
        None
    }

    fn process_name(&self, pid: u32) -> String {
        if !self.refresh(pid) {
            return PLACEHOLDER_NAME.to_string();
        }

        self.system
            .borrow()
            .process(Pid::from_u32(pid))
            .map(|process| process.name().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_NAME.to_string())
    }

    fn suspend(&self, pid: u32) -> Result<()> {
        SignalExecutor::freeze_process(pid)
    }

    fn resume(&self, pid: u32) -> Result<()> {
        SignalExecutor::unfreeze_process(pid)
    }

    fn resident_memory_bytes(&self, pid: u32) -> Result<u64> {
        if !self.refresh(pid) {
            return Err(Error::Platform(format!("Process {} not found", pid)));
        }

        self.system
            .borrow()
            .process(Pid::from_u32(pid))
            .map(|process| process.memory())
            .ok_or_else(|| Error::Platform(format!("Process {} not found", pid)))
    }

    fn start_token(&self, pid: u32) -> Option<u64> {
        if !self.refresh(pid) {
            return None;
        }

        self.system
            .borrow()
            .process(Pid::from_u32(pid))
            .map(|process| process.start_time())
    }

    fn is_own_ancestor(&self, pid: u32) -> bool {
        self.ancestors.contains(&pid)
    }
}
