use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::client::{ByteSource, ClientError};
use crate::config::StorageConfig;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Dir,
}

/// Normalized entry handed back to callers, independent of provider field
/// names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageItem {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip)]
    pub contents: Option<Bytes>,
}

impl StorageItem {
    pub fn is_dir(&self) -> bool {
        self.node_type == NodeType::Dir
    }
}

/// Generic filesystem capability set.
///
/// Operations whose callers expect a plain success flag return `bool` or
/// `Option` and never surface the underlying failure. Writes, reads and
/// listings return the failure.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    fn name(&self) -> String;

    async fn write(
        &self,
        path: &str,
        contents: Bytes,
        config: &StorageConfig,
    ) -> Result<StorageItem, StorageError>;
    async fn update(
        &self,
        path: &str,
        contents: Bytes,
        config: &StorageConfig,
    ) -> Result<StorageItem, StorageError>;
    async fn write_stream(
        &self,
        path: &str,
        stream: ByteSource,
        config: &StorageConfig,
    ) -> Result<StorageItem, StorageError>;
    async fn update_stream(
        &self,
        path: &str,
        stream: ByteSource,
        config: &StorageConfig,
    ) -> Result<StorageItem, StorageError>;

    async fn read(&self, path: &str) -> Result<StorageItem, StorageError>;
    async fn read_stream(&self, path: &str) -> Result<ByteSource, StorageError>;

    async fn delete(&self, path: &str) -> bool;
    async fn delete_dir(&self, path: &str) -> bool;
    async fn create_dir(&self, path: &str, config: &StorageConfig) -> Option<StorageItem>;
    async fn rename(&self, from: &str, to: &str) -> bool;
    async fn copy(&self, from: &str, to: &str) -> bool;

    async fn has(&self, path: &str) -> bool {
        self.get_metadata(path).await.is_some()
    }
    async fn get_metadata(&self, path: &str) -> Option<StorageItem>;
    async fn get_timestamp(&self, path: &str) -> Option<DateTime<Utc>> {
        self.get_metadata(path).await?.timestamp
    }
    async fn get_size(&self, path: &str) -> Option<u64> {
        self.get_metadata(path).await?.size
    }
    async fn get_mimetype(&self, path: &str) -> Option<String>;

    async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<StorageItem>, StorageError>;
}

pub mod box_storage;
