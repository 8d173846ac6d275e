//! 环境变量配置加载

use std::env;
use tracing::warn;

/// 常量定义
pub mod constants {
    /// 当前版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// 服务名称
    pub const SERVICE_NAME: &str = "kb-status-agent";
}

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// API 密钥（数据运营权限）
    pub api_key: String,
    /// 服务监听端口
    pub port: u16,
    /// kbase 后端 API 地址（队列统计接口）
    pub kbase_api_url: String,
    /// 健康分类使用的日志窗口行数
    pub log_tail_lines: usize,
    /// 单容器日志拉取超时（秒）
    pub log_tail_timeout_secs: u64,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        // API Key - 支持旧名称兼容
        let api_key = load_with_fallback("STATUS_AGENT_API_KEY", "API_KEY")
            .unwrap_or_else(|| "change-me-in-production".to_string());

        if env::var("API_KEY").is_ok() {
            warn!("Deprecated environment variable detected. Please use STATUS_AGENT_API_KEY");
        }

        // Port
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(9780);

        // 后端地址
        let kbase_api_url = env::var("KBASE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        // 日志窗口
        let log_tail_lines = env::var("LOG_TAIL_LINES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(200);

        let log_tail_timeout_secs = env::var("LOG_TAIL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self {
            api_key,
            port,
            kbase_api_url,
            log_tail_lines,
            log_tail_timeout_secs,
        }
    }
}

/// 按新旧名称依次尝试读取环境变量
fn load_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    env::var(primary).ok().or_else(|| env::var(fallback).ok())
}
