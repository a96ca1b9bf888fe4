//! Storage module for launchpad persistence

pub mod persistence;

pub use persistence::{Storage, StorageConfig, StorageError};
