//! Side-effecting adapters: git subprocesses, hook execution, configuration
//! files, and the restructure mover.

pub mod config;
pub mod git;
pub mod hooks;
pub mod mover;
