pub mod client;
pub mod config;
pub mod path;
pub mod storages;

pub use client::{BoxClient, ClientError, RawEntry};
pub use config::{BoxStorageConfig, StorageConfig};
pub use storages::box_storage::BoxStorage;
pub use storages::{NodeType, StorageAdapter, StorageError, StorageItem};
