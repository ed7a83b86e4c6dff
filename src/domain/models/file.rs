use std::pin::Pin;

use bytes::Bytes;
use chrono::{DateTime, Local, Utc};
use futures::Stream;

use crate::domain::naming;

/// Incoming upload body, consumed chunk by chunk. May borrow from the request.
pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send + 'a>>;

/// A file as found in the store directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub storage_name: String,
    pub size_bytes: u64,
    /// Filesystem modification time; the sweeper ages files by this.
    pub modified_at: DateTime<Utc>,
}

impl StoredFile {
    pub fn display_name(&self) -> &str {
        naming::decode_display_name(&self.storage_name)
    }

    pub fn extension(&self) -> Option<String> {
        naming::extension(&self.storage_name)
    }

    /// Prefers the timestamp encoded in the name, falling back to mtime.
    pub fn uploaded_at(&self) -> DateTime<Local> {
        naming::parse_upload_time(&self.storage_name)
            .unwrap_or_else(|| self.modified_at.with_timezone(&Local))
    }
}

/// An open handle on a stored file, ready to be streamed out.
#[derive(Debug)]
pub struct FileContent {
    pub storage_name: String,
    pub size_bytes: u64,
    pub file: tokio::fs::File,
}
