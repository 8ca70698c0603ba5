//! snoozr Core Library
//!
//! Tracks which desktop application is in the foreground, freezes the ones
//! that have been idle too long and use enough memory to matter, and thaws
//! them the moment the user comes back.

pub mod engine;
pub mod error;
#[cfg(unix)]
pub mod executor;
pub mod filter;
pub mod history;
pub mod platform;
pub mod sentinel;
pub mod stats;
pub mod types;

pub use engine::{EngineSettings, FreezeEngine, SentinelReport, TickReport};
pub use error::{Error, Result};
pub use filter::SafetyFilter;
pub use history::AppHistory;
#[cfg(unix)]
pub use platform::NativeProcessControl;
pub use platform::ProcessControl;
pub use sentinel::SentinelSettings;
pub use stats::SessionStats;
pub use types::{FreezeDirective, FreezeOutcome, ThawDirective, ThawReason, TrackedApp};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
