// Library root: exposes the CLI's modules so integration tests can drive the
// commands without spawning the binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod report;
