//! Library components of the `delimit` command-line reader.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
