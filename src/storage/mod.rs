//! Storage module for wallet registry persistence

pub mod persistence;

pub use persistence::{Storage, StorageConfig, StorageError};
