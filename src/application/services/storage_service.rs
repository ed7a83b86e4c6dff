use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    application::error::ApplicationError,
    domain::models::file::{ByteStream, FileContent, StoredFile},
};

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Every visible file, most recently modified first.
    async fn list(&self) -> Result<Vec<StoredFile>, ApplicationError>;

    /// Streams `content` under `storage_name`, replacing any file already there.
    /// The file only becomes visible once fully written. Returns the byte count.
    async fn save_stream(
        &self,
        storage_name: &str,
        content: ByteStream<'_>,
    ) -> Result<u64, ApplicationError>;

    async fn save(&self, storage_name: &str, content: Bytes) -> Result<u64, ApplicationError> {
        let stream = futures::stream::once(async move { Ok::<_, std::io::Error>(content) });
        self.save_stream(storage_name, Box::pin(stream)).await
    }

    async fn fetch(&self, storage_name: &str) -> Result<FileContent, ApplicationError>;

    /// Removes the file; a missing file is not an error.
    async fn delete(&self, storage_name: &str) -> Result<(), ApplicationError>;
}
