//! 场所目录服务主入口

use places_service::{
    config::AppConfig,
    db,
    handlers::health,
    middleware::AppState,
    repository::{PlaceRepository, UserRepository},
    routes, telemetry,
};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("places-service {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    if let Ok(env) = std::env::var("PLACES_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Places service starting...");

    // 3. 数据库连接池 + 迁移
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    if let db::HealthStatus::Unhealthy(msg) = db::health_check(&db_pool).await {
        anyhow::bail!("Database is not healthy: {}", msg);
    }

    tracing::info!("Database initialized");

    // 4. 构建应用状态；令牌密钥与 Cookie 策略无效时拒绝启动
    let app_state = AppState::new(
        config.clone(),
        Arc::new(UserRepository::new(db_pool.clone())),
        Arc::new(PlaceRepository::new(db_pool.clone())),
    )
    .map_err(|e| {
        tracing::error!("Failed to build application state: {}", e);
        anyhow::anyhow!("Startup aborted: {}", e)
    })?;

    // 5. 初始化管理员账户
    app_state.auth_service.seed_admin(&config.admin).await?;

    // 6. 构建路由
    let app = routes::create_router(Arc::new(app_state));

    // 7. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 8. 优雅关闭：收到信号后最多等待 graceful_shutdown_timeout_secs
    let shutdown_timeout = Duration::from_secs(config.server.graceful_shutdown_timeout_secs);
    let (signal_tx, signal_rx) = oneshot::channel::<()>();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signal_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = async {
            let _ = signal_rx.await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

/// 打印帮助信息
fn print_help() {
    println!("places-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: places-service [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 PLACES_ 前缀的环境变量完成");
    println!("  例如 PLACES_DATABASE__URL、PLACES_SECURITY__ACCESS_SECRET");
}
