use super::{NodeType, StorageAdapter, StorageError, StorageItem};
use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use log::{debug, warn};
use mime_guess::from_path;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use crate::client::{BoxClient, ByteSource, EntryTag, RawEntry, UploadBody, WriteMode};
use crate::config::{BoxStorageConfig, StorageConfig};
use crate::path::PathPrefix;

const BOX_SCHEME: &str = "box";

#[derive(Debug)]
pub struct BoxStorage<C> {
    client: C,
    prefix: PathPrefix,
}

impl<C: BoxClient> BoxStorage<C> {
    pub fn new(client: C, prefix: Option<&str>) -> Self {
        Self {
            client,
            prefix: PathPrefix::new(prefix),
        }
    }

    pub fn from_config(client: C, config: &BoxStorageConfig) -> Self {
        Self::new(client, config.prefix.as_deref())
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn prefix(&self) -> &PathPrefix {
        &self.prefix
    }

    /// Short-lived direct download link for a file.
    pub async fn get_temporary_link(&self, path: &str) -> Result<String, StorageError> {
        let location = self.prefix.apply(path);
        debug!("Requesting temporary link for {}", location);
        Ok(self.client.get_temporary_link(&location).await?)
    }

    /// Lazily lists `directory`, pulling continuation pages only as the
    /// stream is polled. The stream ends after the first error.
    pub fn contents_stream(
        &self,
        directory: &str,
        recursive: bool,
    ) -> impl Stream<Item = Result<StorageItem, StorageError>> + Send + '_ {
        let location = self.prefix.apply(directory);

        try_stream! {
            debug!("Listing {} (recursive: {})", location, recursive);
            let mut page = self.client.list_folder(&location, recursive).await?;

            loop {
                for entry in page.entries {
                    yield self.normalize(entry, "");
                }

                let cursor = match page.cursor {
                    Some(cursor) if page.has_more => cursor,
                    None if page.has_more => {
                        warn!("Listing of {} reported more pages without a cursor", location);
                        break;
                    }
                    _ => break,
                };

                debug!("Continuing listing of {}", location);
                page = self.client.list_folder_continue(&cursor).await?;
            }
        }
    }

    fn normalize(&self, entry: RawEntry, requested: &str) -> StorageItem {
        let path = match &entry.path_display {
            Some(display) => self.prefix.strip(display),
            None => requested.trim_matches('/').to_string(),
        };

        let node_type = match entry.tag {
            EntryTag::File => NodeType::File,
            EntryTag::Folder => NodeType::Dir,
        };

        StorageItem {
            node_type,
            path,
            timestamp: entry.server_modified,
            size: entry.size,
            contents: None,
        }
    }

    fn file_location(&self, path: &str) -> Result<String, StorageError> {
        if path.trim_matches('/').is_empty() {
            return Err(StorageError::InvalidPath(
                "Path does not name a file".to_string(),
            ));
        }
        Ok(self.prefix.apply(path))
    }

    async fn upload(
        &self,
        path: &str,
        body: UploadBody,
        config: &StorageConfig,
        default_mode: WriteMode,
    ) -> Result<StorageItem, StorageError> {
        let location = self.file_location(path)?;
        let options = config.upload_options(default_mode);
        debug!("Uploading {} ({:?}, {:?})", location, body, options.mode);

        let entry = self.client.upload(&location, body, options).await?;
        let mut item = self.normalize(entry, path);
        // an upload always produces a file, whatever tag comes back
        item.node_type = NodeType::File;
        Ok(item)
    }

    async fn upload_buffer(
        &self,
        path: &str,
        contents: Bytes,
        config: &StorageConfig,
        default_mode: WriteMode,
    ) -> Result<StorageItem, StorageError> {
        let body = UploadBody::Buffer(contents.clone());
        let mut item = self.upload(path, body, config, default_mode).await?;
        item.contents = Some(contents);
        Ok(item)
    }

    async fn upload_stream(
        &self,
        path: &str,
        stream: ByteSource,
        config: &StorageConfig,
        default_mode: WriteMode,
    ) -> Result<StorageItem, StorageError> {
        let body = UploadBody::Stream(Box::pin(ReaderStream::new(stream)));
        self.upload(path, body, config, default_mode).await
    }
}

#[async_trait]
impl<C: BoxClient> StorageAdapter for BoxStorage<C> {
    fn name(&self) -> String {
        BOX_SCHEME.to_string()
    }

    async fn write(
        &self,
        path: &str,
        contents: Bytes,
        config: &StorageConfig,
    ) -> Result<StorageItem, StorageError> {
        self.upload_buffer(path, contents, config, WriteMode::Add)
            .await
    }

    async fn update(
        &self,
        path: &str,
        contents: Bytes,
        config: &StorageConfig,
    ) -> Result<StorageItem, StorageError> {
        self.upload_buffer(path, contents, config, WriteMode::Overwrite)
            .await
    }

    async fn write_stream(
        &self,
        path: &str,
        stream: ByteSource,
        config: &StorageConfig,
    ) -> Result<StorageItem, StorageError> {
        self.upload_stream(path, stream, config, WriteMode::Add)
            .await
    }

    async fn update_stream(
        &self,
        path: &str,
        stream: ByteSource,
        config: &StorageConfig,
    ) -> Result<StorageItem, StorageError> {
        self.upload_stream(path, stream, config, WriteMode::Overwrite)
            .await
    }

    async fn read(&self, path: &str) -> Result<StorageItem, StorageError> {
        let mut stream = self.read_stream(path).await?;
        let mut contents = Vec::new();
        stream.read_to_end(&mut contents).await?;

        Ok(StorageItem {
            node_type: NodeType::File,
            path: path.trim_matches('/').to_string(),
            timestamp: None,
            size: Some(contents.len() as u64),
            contents: Some(Bytes::from(contents)),
        })
    }

    async fn read_stream(&self, path: &str) -> Result<ByteSource, StorageError> {
        let location = self.file_location(path)?;
        debug!("Downloading {}", location);
        Ok(self.client.download(&location).await?)
    }

    async fn delete(&self, path: &str) -> bool {
        let location = self.prefix.apply(path);
        match self.client.delete(&location).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to delete {}: {}", location, e);
                false
            }
        }
    }

    async fn delete_dir(&self, path: &str) -> bool {
        self.delete(path).await
    }

    async fn create_dir(&self, path: &str, _config: &StorageConfig) -> Option<StorageItem> {
        let location = self.prefix.apply(path);
        match self.client.create_folder(&location).await {
            Ok(entry) => {
                let mut item = self.normalize(entry, path);
                item.node_type = NodeType::Dir;
                Some(item)
            }
            Err(e) => {
                warn!("Failed to create folder {}: {}", location, e);
                None
            }
        }
    }

    async fn rename(&self, from: &str, to: &str) -> bool {
        let (from, to) = (self.prefix.apply(from), self.prefix.apply(to));
        match self.client.move_entry(&from, &to).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to move {} to {}: {}", from, to, e);
                false
            }
        }
    }

    async fn copy(&self, from: &str, to: &str) -> bool {
        let (from, to) = (self.prefix.apply(from), self.prefix.apply(to));
        match self.client.copy(&from, &to).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to copy {} to {}: {}", from, to, e);
                false
            }
        }
    }

    async fn get_metadata(&self, path: &str) -> Option<StorageItem> {
        let location = self.prefix.apply(path);
        match self.client.get_metadata(&location).await {
            Ok(entry) => Some(self.normalize(entry, path)),
            Err(e) => {
                debug!("No metadata for {}: {}", location, e);
                None
            }
        }
    }

    async fn get_mimetype(&self, path: &str) -> Option<String> {
        from_path(path).first().map(|mime| mime.essence_str().to_owned())
    }

    async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<StorageItem>, StorageError> {
        self.contents_stream(directory, recursive)
            .try_collect()
            .await
    }
}
