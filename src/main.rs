use inventory_backend::app::build_app;
use inventory_backend::config::LoggingConfig;
use inventory_backend::startup::run_startup_checks;
use inventory_backend::state::AppState;
use inventory_backend::{ShutdownManager, config::AppConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.default_directive()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        builder.json().with_current_span(true).init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    // 配置先于日志加载（日志级别/格式来自配置）
    if let Err(e) = AppConfig::init_global() {
        eprintln!("Config init failed: {e}");
        std::process::exit(1);
    }
    let config = AppConfig::global();
    init_tracing(&config.logging);

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler() {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    let storage = match run_startup_checks(config).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Startup checks failed: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(storage, config);
    let pool = app_state.storage.pool.clone();
    let app = build_app(app_state, &config.api.prefix);

    let addr = config.server_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("API: http://{}{}", addr, config.api.prefix);
    tracing::info!(
        "Images: {} -> {}",
        config.images.public_url_prefix,
        config.images.public_root
    );

    let shutdown_timeout = config.server.shutdown_timeout();
    let signal_manager = shutdown_manager.clone();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = signal_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
    });

    // 退出信号到达后，最多再等待 shutdown_timeout 让在途请求完成
    let server = tokio::spawn(async move { graceful.await });
    let result = tokio::select! {
        r = server => r,
        _ = async {
            shutdown_manager.wait_for_shutdown().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!("优雅退出超时（{}s），强制退出", shutdown_timeout.as_secs());
            pool.close().await;
            std::process::exit(1);
        }
    };

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!("服务器运行错误: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("服务器任务异常退出: {}", e);
            std::process::exit(1);
        }
    }

    pool.close().await;
    tracing::info!("服务器已优雅关闭");
}
