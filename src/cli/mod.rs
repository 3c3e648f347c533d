//! CLI module for interacting with the wallet registry

pub mod commands;

pub use commands::*;
