use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    application::{error::ApplicationError, services::StorageService},
    domain::models::file::{ByteStream, FileContent, StoredFile},
    services::error::StorageError,
};

/// In-flight uploads live under this prefix until they are renamed into place.
pub const TEMP_UPLOAD_PREFIX: &str = ".upload-";

pub fn is_temp_upload_name(name: &str) -> bool {
    name.starts_with(TEMP_UPLOAD_PREFIX)
}

/// Store backed by a single flat directory.
#[derive(Debug, Clone)]
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    /// Opens the store at `root`, creating the directory if needed and
    /// discarding uploads a previous process left half-written.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::write(&root.display().to_string(), e))?;

        let service = Self { root };
        service.remove_stale_uploads().await;
        Ok(service)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a caller-supplied name to a path directly inside the root.
    fn resolve(&self, storage_name: &str) -> Result<PathBuf, StorageError> {
        let mut components = Path::new(storage_name).components();
        let single_segment = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );

        if !single_segment || storage_name.contains(['/', '\\', '\0']) {
            warn!(name = storage_name, "Rejected file name outside the store");
            return Err(StorageError::InvalidName(storage_name.to_string()));
        }

        if is_temp_upload_name(storage_name) {
            return Err(StorageError::NotFound(storage_name.to_string()));
        }

        Ok(self.root.join(storage_name))
    }

    async fn remove_stale_uploads(&self) {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Cannot scan store for stale uploads");
                return;
            }
        };

        let mut removed = 0usize;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            if !name.to_str().is_some_and(is_temp_upload_name) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(file = ?name, error = %e, "Cannot remove stale upload"),
            }
        }

        if removed > 0 {
            info!(removed, "Removed stale partial uploads");
        }
    }

    async fn list_files(&self) -> Result<Vec<StoredFile>, StorageError> {
        let root_name = self.root.display().to_string();
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::io(&root_name, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&root_name, e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                debug!(file = ?entry.file_name(), "Skipping non UTF-8 file name");
                continue;
            };
            if is_temp_upload_name(&name) {
                continue;
            }

            // Entries can vanish between read_dir and stat.
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(file = %name, error = %e, "Cannot stat file, skipping");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let modified_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            files.push(StoredFile {
                storage_name: name,
                size_bytes: metadata.len(),
                modified_at,
            });
        }

        files.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| b.storage_name.cmp(&a.storage_name))
        });

        Ok(files)
    }

    async fn write_file(
        &self,
        storage_name: &str,
        mut content: ByteStream<'_>,
    ) -> Result<u64, StorageError> {
        let target = self.resolve(storage_name)?;
        let temp_path = self
            .root
            .join(format!("{}{}.tmp", TEMP_UPLOAD_PREFIX, Uuid::new_v4()));
        let mut guard = TempFileGuard::new(temp_path.clone());

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .await
            .map_err(|e| StorageError::write(storage_name, e))?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = content.next().await {
            let chunk = chunk.map_err(|e| StorageError::Interrupted(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| StorageError::write(storage_name, e))?;
            total_bytes += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| StorageError::write(storage_name, e))?;
        file.sync_all()
            .await
            .map_err(|e| StorageError::write(storage_name, e))?;
        drop(file);

        fs::rename(&temp_path, &target)
            .await
            .map_err(|e| StorageError::write(storage_name, e))?;
        guard.disarm();

        debug!(file = storage_name, bytes = total_bytes, "Stored file");
        Ok(total_bytes)
    }

    /// Size and type come from the opened handle, so a concurrent rename onto
    /// the same name cannot pair one file's length with another's bytes.
    async fn open_file(&self, storage_name: &str) -> Result<FileContent, StorageError> {
        let path = self.resolve(storage_name)?;

        let file = open_no_follow(&path)
            .await
            .map_err(|e| StorageError::io(storage_name, e))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| StorageError::io(storage_name, e))?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(storage_name.to_string()));
        }

        Ok(FileContent {
            storage_name: storage_name.to_string(),
            size_bytes: metadata.len(),
            file,
        })
    }

    async fn remove_file(&self, storage_name: &str) -> Result<(), StorageError> {
        let path = match self.resolve(storage_name) {
            Ok(path) => path,
            Err(StorageError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };

        // Directories and other non-files are invisible to the store.
        match fs::symlink_metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => return Ok(()),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StorageError::io(storage_name, e)),
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(file = storage_name, "Deleted file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(storage_name, e)),
        }
    }
}

/// Opens `path` for reading without following a final symlink. A symlink
/// reports as `NotFound`.
#[cfg(unix)]
async fn open_no_follow(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NOFOLLOW | libc::O_NONBLOCK)
        .open(path)
        .await
        .map_err(|e| {
            if e.raw_os_error() == Some(libc::ELOOP) {
                std::io::Error::from(std::io::ErrorKind::NotFound)
            } else {
                e
            }
        })
}

#[cfg(not(unix))]
async fn open_no_follow(path: &Path) -> std::io::Result<fs::File> {
    if fs::symlink_metadata(path).await?.file_type().is_symlink() {
        return Err(std::io::Error::from(std::io::ErrorKind::NotFound));
    }
    fs::File::open(path).await
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn list(&self) -> Result<Vec<StoredFile>, ApplicationError> {
        Ok(self.list_files().await?)
    }

    async fn save_stream(
        &self,
        storage_name: &str,
        content: ByteStream<'_>,
    ) -> Result<u64, ApplicationError> {
        Ok(self.write_file(storage_name, content).await?)
    }

    async fn fetch(&self, storage_name: &str) -> Result<FileContent, ApplicationError> {
        Ok(self.open_file(storage_name).await?)
    }

    async fn delete(&self, storage_name: &str) -> Result<(), ApplicationError> {
        Ok(self.remove_file(storage_name).await?)
    }
}

/// Removes the temporary file on drop unless the write completed, which also
/// covers the upload future being dropped mid-transfer.
struct TempFileGuard {
    path: Option<PathBuf>,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Cannot remove partial upload");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use bytes::Bytes;
    use tokio::io::AsyncReadExt;

    use super::*;

    async fn store() -> (tempfile::TempDir, LocalStorageService) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStorageService::new(dir.path().join("uploads"))
            .await
            .unwrap();
        (dir, store)
    }

    fn set_mtime(path: &Path, secs_ago: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(secs_ago))
            .unwrap();
    }

    fn raw_entries(path: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(path)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn creates_root_directory() {
        let (_dir, store) = store().await;
        assert!(store.root().is_dir());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_fetch_returns_content() {
        let (_dir, store) = store().await;
        let written = store
            .save("20240101_100000_a.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert_eq!(written, 5);

        let mut content = store.fetch("20240101_100000_a.txt").await.unwrap();
        assert_eq!(content.size_bytes, 5);
        let mut buf = Vec::new();
        content.file.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"hello");

        assert_eq!(raw_entries(store.root()), vec!["20240101_100000_a.txt"]);
    }

    #[tokio::test]
    async fn save_overwrites_existing_name() {
        let (_dir, store) = store().await;
        store.save("a.txt", Bytes::from_static(b"first")).await.unwrap();
        store.save("a.txt", Bytes::from_static(b"second!")).await.unwrap();

        let files = store.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size_bytes, 7);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_hides_temp_files() {
        let (_dir, store) = store().await;
        for (name, age) in [("old.txt", 300), ("new.txt", 10), ("mid.txt", 100)] {
            store.save(name, Bytes::from_static(b"x")).await.unwrap();
            set_mtime(&store.root().join(name), age);
        }
        std::fs::write(store.root().join(".upload-inflight.tmp"), b"partial").unwrap();
        std::fs::create_dir(store.root().join("nested")).unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.storage_name)
            .collect();
        assert_eq!(names, vec!["new.txt", "mid.txt", "old.txt"]);
    }

    #[tokio::test]
    async fn fetch_missing_is_not_found() {
        let (_dir, store) = store().await;
        assert!(matches!(
            store.fetch("nope.txt").await,
            Err(ApplicationError::NotFound)
        ));
        assert!(matches!(
            store.fetch(".upload-123.tmp").await,
            Err(ApplicationError::NotFound)
        ));
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() {
        let (dir, store) = store().await;
        let outside = dir.path().join("secret.txt");
        std::fs::write(&outside, b"keep me").unwrap();

        for name in ["../secret.txt", "..", ".", "", "/etc/passwd", "a/b.txt", "..\\secret.txt"] {
            assert!(
                matches!(store.fetch(name).await, Err(ApplicationError::InvalidName(_))),
                "fetch {name:?}"
            );
            assert!(
                matches!(store.delete(name).await, Err(ApplicationError::InvalidName(_))),
                "delete {name:?}"
            );
            assert!(
                matches!(
                    store.save(name, Bytes::from_static(b"x")).await,
                    Err(ApplicationError::InvalidName(_))
                ),
                "save {name:?}"
            );
        }

        assert_eq!(std::fs::read(&outside).unwrap(), b"keep me");
        assert!(raw_entries(store.root()).is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = store().await;
        store.save("a.txt", Bytes::from_static(b"x")).await.unwrap();
        store.save("b.txt", Bytes::from_static(b"y")).await.unwrap();

        store.delete("a.txt").await.unwrap();
        store.delete("a.txt").await.unwrap();
        store.delete("never-existed.txt").await.unwrap();

        assert_eq!(raw_entries(store.root()), vec!["b.txt"]);
    }

    #[tokio::test]
    async fn interrupted_upload_leaves_nothing_behind() {
        let (_dir, store) = store().await;
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "gone")),
        ];

        let result = store
            .save_stream("a.txt", Box::pin(futures::stream::iter(chunks)))
            .await;

        assert!(matches!(result, Err(ApplicationError::UploadInterrupted(_))));
        assert!(raw_entries(store.root()).is_empty());
    }

    #[tokio::test]
    async fn cancelled_upload_leaves_nothing_behind() {
        let (_dir, store) = store().await;
        let first: Result<Bytes, std::io::Error> = Ok(Bytes::from_static(b"partial"));
        let stream = futures::stream::iter(vec![first]).chain(futures::stream::pending());

        let result = tokio::time::timeout(
            Duration::from_millis(100),
            store.save_stream("a.txt", Box::pin(stream)),
        )
        .await;

        assert!(result.is_err());
        assert!(raw_entries(store.root()).is_empty());
    }

    #[tokio::test]
    async fn concurrent_saves_to_different_names_all_land() {
        let (_dir, store) = store().await;
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let payload = Bytes::from(vec![b'x'; 1024 * (i + 1)]);
                    store.save(&format!("file{i}.txt"), payload).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let files = store.list().await.unwrap();
        assert_eq!(files.len(), 16);
        for file in files {
            let i: usize = file.storage_name["file".len()..file.storage_name.len() - 4]
                .parse()
                .unwrap();
            assert_eq!(file.size_bytes, 1024 * (i as u64 + 1));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_are_not_followed() {
        let (dir, store) = store().await;
        let outside = dir.path().join("secret.txt");
        std::fs::write(&outside, b"keep me").unwrap();
        std::os::unix::fs::symlink(&outside, store.root().join("link.txt")).unwrap();

        assert!(matches!(
            store.fetch("link.txt").await,
            Err(ApplicationError::NotFound)
        ));
        assert_eq!(std::fs::read(&outside).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn deleting_a_directory_name_is_a_no_op() {
        let (_dir, store) = store().await;
        std::fs::create_dir(store.root().join("nested")).unwrap();

        store.delete("nested").await.unwrap();

        assert!(store.root().join("nested").is_dir());
        assert!(matches!(
            store.fetch("nested").await,
            Err(ApplicationError::NotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn fetch_during_same_name_overwrites_is_consistent() {
        let (_dir, store) = store().await;
        let store = std::sync::Arc::new(store);
        let large = Bytes::from(vec![b'a'; 200_000]);
        let small = Bytes::from_static(b"b");
        store.save("a.txt", small.clone()).await.unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    let payload = if i % 2 == 0 { large.clone() } else { small.clone() };
                    store.save("a.txt", payload).await.unwrap();
                }
            })
        };

        let mut fetches = 0;
        while !writer.is_finished() {
            let mut content = store.fetch("a.txt").await.unwrap();
            let mut buf = Vec::new();
            content.file.read_to_end(&mut buf).await.unwrap();

            assert_eq!(buf.len() as u64, content.size_bytes);
            let expected = if buf.len() == 1 { b'b' } else { b'a' };
            assert!(buf.iter().all(|&b| b == expected));
            fetches += 1;
        }
        writer.await.unwrap();

        assert!(fetches > 0);
    }

    #[tokio::test]
    async fn opening_discards_stale_partial_uploads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".upload-dead.tmp"), b"half").unwrap();
        std::fs::write(dir.path().join("kept.txt"), b"whole").unwrap();

        let store = LocalStorageService::new(dir.path()).await.unwrap();

        assert_eq!(raw_entries(store.root()), vec!["kept.txt"]);
    }
}
