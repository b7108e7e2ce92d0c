// BpTracker CLI
// Argument parsing, command dispatch and text rendering for the `bp-tracker` binary

pub mod args;
pub mod commands;
pub mod report;

pub use args::Args;
pub use commands::run;
