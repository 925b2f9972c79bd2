//! PostgreSQL 连接池、迁移与连通性检查

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use std::time::{Duration, Instant};

/// 内嵌的 users / places 迁移
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// 建立连接池；连接失败即启动失败
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Cannot reach user/place database");
            DbError::ConnectionFailed(e.to_string())
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Database pool ready"
    );

    Ok(pool)
}

/// 执行内嵌迁移（users 与 places 表及唯一索引）
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    let started = Instant::now();

    MIGRATOR.run(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Schema migration failed");
        DbError::MigrationFailed(e.to_string())
    })?;

    tracing::info!(
        known_migrations = MIGRATOR.iter().count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Schema up to date"
    );
    Ok(())
}

/// 存储连通性
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// 对 users 表做一次轻量查询，同时确认迁移已生效
pub async fn health_check(pool: &PgPool) -> HealthStatus {
    let started = Instant::now();

    match sqlx::query("SELECT 1 FROM users LIMIT 1")
        .fetch_optional(pool)
        .await
    {
        Ok(_) => {
            tracing::debug!(latency_ms = started.elapsed().as_millis() as u64, "Store ping ok");
            HealthStatus::Healthy
        }
        Err(e) => {
            tracing::warn!(error = %e, "Store ping failed");
            HealthStatus::Unhealthy(e.to_string())
        }
    }
}
