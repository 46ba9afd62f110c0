//! Runtime-agnostic local command execution
//!
//! This crate provides a small, clonable command builder and a runner that
//! executes commands as local child processes, capturing their output and
//! exit status.

pub mod command;
pub mod error;
pub mod runner;

pub use command::Command;
pub use error::{Error, Result};
pub use runner::{ExitResult, ExitStatus, LocalRunner};
