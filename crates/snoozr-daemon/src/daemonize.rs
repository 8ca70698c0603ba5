//! Detach from the controlling terminal
//!
//! Must run before the tokio runtime or the log appender thread exist:
//! `fork` only carries the calling thread into the child.

use anyhow::{Context, Result};
use nix::fcntl::{open, OFlag};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::unistd::{dup2, fork, setsid, ForkResult};
use std::os::unix::io::RawFd;

/// Double-fork into the background with stdio on /dev/null
///
/// Returns only in the grandchild; both parents exit immediately.
pub fn daemonize() -> Result<()> {
    // SAFETY: called from main before any other thread is spawned
    match unsafe { fork() }.context("First fork failed")? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    setsid().context("setsid failed")?;

    // SAFETY: SIG_IGN installs no handler code
    unsafe { signal(Signal::SIGHUP, SigHandler::SigIgn) }.context("Failed to ignore SIGHUP")?;

    // SAFETY: still single-threaded
    match unsafe { fork() }.context("Second fork failed")? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    redirect_stdio()
}

fn redirect_stdio() -> Result<()> {
    let null = open("/dev/null", OFlag::O_RDWR, Mode::empty()).context("Cannot open /dev/null")?;

    for fd in [0 as RawFd, 1, 2] {
        dup2(null, fd).with_context(|| format!("dup2 onto fd {} failed", fd))?;
    }

    if null > 2 {
        nix::unistd::close(null).context("Failed to close /dev/null")?;
    }

    Ok(())
}
