//! The contract of the Box API client wrapped by [`BoxStorage`].
//!
//! Transport and authentication live behind [`BoxClient`]; this module only
//! describes the calls the adapter makes and the shapes it gets back.
//!
//! [`BoxStorage`]: crate::storages::box_storage::BoxStorage

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Chunked byte stream handed to the client for streaming uploads.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Readable byte source, as returned by downloads.
pub type ByteSource = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed with status {status}: {message}")]
    Request { status: u16, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// The provider's type discriminator, carried in the `.tag` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryTag {
    File,
    Folder,
}

/// An entry as the provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(rename = ".tag")]
    pub tag: EntryTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// One page of a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFolderResult {
    pub entries: Vec<RawEntry>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Add,
    Overwrite,
}

impl WriteMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "add" => Some(Self::Add),
            "overwrite" => Some(Self::Overwrite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadOptions {
    pub mode: WriteMode,
    pub autorename: bool,
    pub mute: bool,
}

pub enum UploadBody {
    Buffer(Bytes),
    Stream(ByteStream),
}

impl std::fmt::Debug for UploadBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

#[async_trait]
pub trait BoxClient: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        body: UploadBody,
        options: UploadOptions,
    ) -> Result<RawEntry, ClientError>;
    async fn download(&self, path: &str) -> Result<ByteSource, ClientError>;
    async fn get_metadata(&self, path: &str) -> Result<RawEntry, ClientError>;
    async fn delete(&self, path: &str) -> Result<RawEntry, ClientError>;
    async fn create_folder(&self, path: &str) -> Result<RawEntry, ClientError>;
    async fn list_folder(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<ListFolderResult, ClientError>;
    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult, ClientError>;
    async fn move_entry(&self, from: &str, to: &str) -> Result<RawEntry, ClientError>;
    async fn copy(&self, from: &str, to: &str) -> Result<RawEntry, ClientError>;
    async fn get_temporary_link(&self, path: &str) -> Result<String, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_decode_raw_entries() {
        let file: RawEntry = serde_json::from_value(json!({
            ".tag": "file",
            "path_display": "/prefix/something",
            "server_modified": "2015-05-12T15:50:38Z",
            "size": 42,
        }))
        .unwrap();
        assert_eq!(file.tag, EntryTag::File);
        assert_eq!(file.path_display.as_deref(), Some("/prefix/something"));
        assert_eq!(
            file.server_modified,
            Some(Utc.with_ymd_and_hms(2015, 5, 12, 15, 50, 38).unwrap())
        );
        assert_eq!(file.size, Some(42));

        // Delete and move responses carry nothing but the tag
        let folder: RawEntry = serde_json::from_value(json!({ ".tag": "folder" })).unwrap();
        assert_eq!(folder.tag, EntryTag::Folder);
        assert_eq!(folder.path_display, None);
        assert_eq!(folder.server_modified, None);
        assert_eq!(folder.size, None);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result = serde_json::from_value::<RawEntry>(json!({
            ".tag": "deleted",
            "path_display": "/gone",
        }));
        assert!(result.is_err());

        let err: ClientError = result.unwrap_err().into();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_decode_list_folder_page() {
        let last: ListFolderResult = serde_json::from_value(json!({
            "entries": [
                { ".tag": "folder", "path_display": "dirname" },
                { ".tag": "file", "path_display": "dirname/file" },
            ],
        }))
        .unwrap();
        assert_eq!(last.entries.len(), 2);
        assert!(!last.has_more);
        assert_eq!(last.cursor, None);

        let partial: ListFolderResult = serde_json::from_value(json!({
            "entries": [],
            "has_more": true,
            "cursor": "cursor",
        }))
        .unwrap();
        assert!(partial.has_more);
        assert_eq!(partial.cursor.as_deref(), Some("cursor"));
    }

    #[test]
    fn test_write_mode() {
        assert_eq!(WriteMode::parse("add"), Some(WriteMode::Add));
        assert_eq!(WriteMode::parse("Overwrite"), Some(WriteMode::Overwrite));
        assert_eq!(WriteMode::parse("update"), None);
        assert_eq!(
            serde_json::to_value(UploadOptions::default()).unwrap(),
            json!({ "mode": "add", "autorename": false, "mute": false })
        );
    }

    #[test]
    fn test_error_status() {
        let conflict = ClientError::request(409, "conflict");
        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());
        assert_eq!(
            conflict.to_string(),
            "Request failed with status 409: conflict"
        );

        let io = ClientError::from(std::io::Error::other("reset"));
        assert_eq!(io.status(), None);
    }
}
