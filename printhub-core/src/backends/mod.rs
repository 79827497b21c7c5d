//! Production implementations of the traits in [`crate::traits`], plus an in-process mock set.

pub mod lpstat;
pub mod mock;
pub mod script;
pub mod sysinfo_probe;

pub use lpstat::LpstatPrintSubsystem;
pub use script::ScriptRunner;
pub use sysinfo_probe::SysinfoProbe;
