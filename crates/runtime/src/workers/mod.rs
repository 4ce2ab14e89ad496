//! Worker tasks that back the host.
//!
//! The host worker owns the authoritative battle; everything else talks to
//! it through channels.

mod host;

pub use host::{Command, HostWorker};
