use std::sync::Arc;

use axum::extract::FromRef;

use crate::{application::services::TransferService, domain::config::server::ServerConfig};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub transfer_service: Arc<TransferService>,
}
