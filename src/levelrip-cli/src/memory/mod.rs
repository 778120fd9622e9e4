//! Live process access
//!
//! - `region` - /proc/pid/maps entries and module base lookup
//! - `process` - discovery and the [`levelrip::MemorySource`] for a running game

mod process;
mod region;

pub use process::GameProcess;
