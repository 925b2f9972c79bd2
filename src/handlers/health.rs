//! 健康检查处理器

use crate::{db::HealthStatus, middleware::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

static APP_START_TIME: OnceLock<Instant> = OnceLock::new();

/// 记录应用启动时间（main 中调用一次）
pub fn set_start_time() {
    let _ = APP_START_TIME.set(Instant::now());
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME
        .get()
        .map_or(0, |start| start.elapsed().as_secs())
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

#[derive(Serialize)]
pub struct DependencyCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<DependencyCheck>,
}

/// 就绪探针
/// 存储不可达时返回 503，负载均衡据此摘除实例
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let store = state.users.ping().await;
    let ready = store.is_healthy();

    let checks = vec![DependencyCheck {
        name: "database".to_string(),
        status: if ready { "healthy" } else { "unhealthy" }.to_string(),
        message: match store {
            HealthStatus::Healthy => None,
            HealthStatus::Unhealthy(msg) => Some(msg),
        },
    }];

    let status = if ready {
        StatusCode::OK
    } else {
        tracing::warn!("Readiness check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}
