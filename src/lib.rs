//! Crate entry point for **gbeh**, a helper for the GBE fork Steam emulator.
//!
//! The library keeps a local copy of the latest GBE fork release, swaps it
//! into game folders in place of the original Steam API binaries, and writes
//! the per-game settings the emulator reads. Every side-effecting
//! collaborator (HTTP client, process runner, reporter) is passed in, so the
//! `cmd_*` functions are thin wiring over testable pieces.

mod config;
mod error;
mod patch;
mod paths;
mod platform;
mod process;
mod report;
mod steam;
mod update;

/// Re-export the CLI commands so they can be reached as `gbeh::*`.
pub use error::GbeError;
pub use patch::cmd_apply;
pub use paths::gbe_home;
pub use steam::cmd_dlc;
pub use update::cmd_update;
