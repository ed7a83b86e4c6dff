use chrono::{DateTime, Local};

use crate::domain::{
    models::file::{FileContent, StoredFile},
    naming::{self, FileCategory},
};

/// One row of the listing as shown to clients.
#[derive(Debug, Clone)]
pub struct FileListingDTO {
    pub storage_name: String,
    pub display_name: String,
    pub category: FileCategory,
    pub extension: Option<String>,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Local>,
}

impl From<StoredFile> for FileListingDTO {
    fn from(file: StoredFile) -> Self {
        Self {
            display_name: file.display_name().to_string(),
            category: naming::file_category(&file.storage_name),
            extension: file.extension(),
            size_bytes: file.size_bytes,
            uploaded_at: file.uploaded_at(),
            storage_name: file.storage_name,
        }
    }
}

#[derive(Debug)]
pub struct DownloadDTO {
    pub content: FileContent,
    /// Name suggested to the browser in `Content-Disposition`.
    pub file_name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStatsDTO {
    pub file_count: usize,
    pub total_bytes: u64,
}
