pub mod retention_sweeper;
mod storage_service;
pub mod transfer_service;

pub use retention_sweeper::{RetentionSweeper, SweepReport};
pub use storage_service::StorageService;
pub use transfer_service::TransferService;
