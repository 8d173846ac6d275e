//! 应用状态

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::EnvConfig;
use crate::infra::{DockerRuntime, RuntimeError, StatsApiClient};
use crate::services::system::SystemService;

/// 应用状态
///
/// 本代理无长生命周期可变状态：报告与日志都是请求内即取即弃的值对象
pub struct AppState {
    /// API 密钥（用于验证请求）
    pub api_key: String,
    /// 环境配置
    pub config: EnvConfig,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,
    /// 系统状态服务
    pub system: SystemService<DockerRuntime, StatsApiClient>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new() -> Result<Self, RuntimeError> {
        let config = EnvConfig::from_env();

        tracing::info!(
            api_key_len = config.api_key.len(),
            port = config.port,
            kbase_api_url = %config.kbase_api_url,
            log_tail_lines = config.log_tail_lines,
            "Loaded configuration"
        );

        let runtime = DockerRuntime::connect(Duration::from_secs(config.log_tail_timeout_secs))?;
        let stats = StatsApiClient::new(config.kbase_api_url.clone());
        let system = SystemService::new(runtime, stats, config.log_tail_lines);

        Ok(Self {
            api_key: config.api_key.clone(),
            started_at: Utc::now(),
            system,
            config,
        })
    }
}
