use axum::{extract::State, Json};
use serde::Serialize;
use sysinfo::System;
use tracing::info;

use crate::{
    adapters::state::AppState, application::error::ApplicationError,
    domain::naming::ALLOWED_EXTENSIONS,
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(rename = "uploadDir")]
    pub upload_dir: String,
    #[serde(rename = "fileCount")]
    pub file_count: usize,
    #[serde(rename = "totalBytes")]
    pub total_bytes: u64,
    pub config: HealthConfigInfo,
    pub metrics: SystemMetrics,
}

#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    #[serde(rename = "cpuUsagePercent")]
    pub cpu_usage_percent: f32,
    #[serde(rename = "memoryUsedBytes")]
    pub memory_used_bytes: u64,
    #[serde(rename = "memoryTotalBytes")]
    pub memory_total_bytes: u64,
    #[serde(rename = "memoryUsagePercent")]
    pub memory_usage_percent: f32,
}

#[derive(Debug, Serialize)]
pub struct HealthConfigInfo {
    #[serde(rename = "retentionSecs")]
    pub retention_secs: u64,
    #[serde(rename = "sweepIntervalSecs")]
    pub sweep_interval_secs: u64,
    #[serde(rename = "maxUploadBytes")]
    pub max_upload_bytes: usize,
    #[serde(rename = "allowedExtensions")]
    pub allowed_extensions: Vec<String>,
}

pub struct HealthController;

impl HealthController {
    /// GET /api/v1/health
    pub async fn health_check(
        State(app_state): State<AppState>,
    ) -> Result<Json<HealthResponse>, ApplicationError> {
        info!("Health check requested");

        let stats = app_state.transfer_service.stats().await?;

        let config = &app_state.config;
        let config_info = HealthConfigInfo {
            retention_secs: config.retention.as_secs(),
            sweep_interval_secs: config.sweep_interval.as_secs(),
            max_upload_bytes: config.max_upload_bytes,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        };

        // Only refresh what is reported
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let memory_used = sys.used_memory();
        let memory_total = sys.total_memory();
        let memory_usage_percent = if memory_total > 0 {
            (memory_used as f32 / memory_total as f32) * 100.0
        } else {
            0.0
        };

        let metrics = SystemMetrics {
            cpu_usage_percent: sys.global_cpu_usage(),
            memory_used_bytes: memory_used,
            memory_total_bytes: memory_total,
            memory_usage_percent,
        };

        Ok(Json(HealthResponse {
            status: "healthy".to_string(),
            upload_dir: config.upload_dir.display().to_string(),
            file_count: stats.file_count,
            total_bytes: stats.total_bytes,
            config: config_info,
            metrics,
        }))
    }
}
