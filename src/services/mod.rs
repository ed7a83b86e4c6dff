mod connect_qr;
mod error;
mod local_address;
mod local_storage;

pub use connect_qr::{connect_url, render_connect_qr};
pub use error::StorageError;
pub use local_address::discover_local_ip;
pub use local_storage::LocalStorageService;

use std::{path::Path, sync::Arc};

use tracing::info;

use crate::application::services::StorageService;

pub async fn create_storage_service(
    upload_dir: &Path,
) -> Result<Arc<dyn StorageService>, StorageError> {
    let service = LocalStorageService::new(upload_dir).await?;
    info!(root = %service.root().display(), "File store ready");
    Ok(Arc::new(service))
}
