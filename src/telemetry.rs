//! 结构化日志初始化

use crate::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// sqlx 每条语句都打 info 日志，默认压到 warn
const NOISY_CRATES: &[&str] = &["sqlx=warn", "tower_http=warn"];

fn build_filter(level: &str) -> EnvFilter {
    // RUST_LOG 优先，否则使用配置的级别
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = std::iter::once(level)
            .chain(NOISY_CRATES.iter().copied())
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::new(directives)
    })
}

/// 初始化日志：json（默认）、pretty 或紧凑文本
pub fn init_telemetry(config: &AppConfig) {
    let log_layer = match config.logging.format.to_lowercase().as_str() {
        // 携带请求 span 的 trace_id / request_id
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        "pretty" => tracing_subscriber::fmt::layer().pretty().boxed(),
        _ => tracing_subscriber::fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(build_filter(&config.logging.level))
        .with(log_layer)
        .init();

    tracing::info!(
        service = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        cookie_environment = %config.cookie.environment,
        "Logging initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_filter_quiets_sqlx() {
        std::env::remove_var("RUST_LOG");
        let filter = build_filter("debug").to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("sqlx=warn"));
    }
}
