//! KB Status Agent - kbase 系统状态代理
//!
//! 聚合容器健康与文档处理队列统计，并提供容器日志查询

pub mod error;
pub mod middleware;
pub mod infra;
pub mod domain;
pub mod config;
pub mod state;
pub mod api;
pub mod services;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

pub use config::RuntimeConfig;
use state::AppState;

/// 初始化日志、构建状态并启动 HTTP 服务
pub async fn init_and_run(runtime_config: RuntimeConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = match AppState::new() {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize agent state");
            std::process::exit(1);
        }
    };

    let port = runtime_config.port_override.unwrap_or(state.config.port);
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind listen address");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %addr, version = config::env::constants::VERSION, "kb-status-agent listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server exited with error");
    }
}

/// 等待 Ctrl-C 触发优雅关闭
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
    }
    tracing::info!("Shutdown signal received");
}
