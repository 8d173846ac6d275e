//! 容器相关领域模型

use serde::{Deserialize, Serialize};

/// 运行时上报的容器单元
///
/// 每次查询重新读取，不做任何持久化
#[derive(Debug, Clone)]
pub struct ProcessUnit {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub ports: Vec<PortBinding>,
}

/// 端口映射
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    /// 容器内端口
    pub private_port: u16,
    /// 宿主机发布端口（未发布时为 None）
    pub public_port: Option<u16>,
    /// 协议（tcp/udp）
    pub protocol: String,
}

/// 单条日志
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// 时间戳（docker 未带时间戳时为空字符串）
    pub timestamp: String,
    pub message: String,
    /// 日志级别：error/warn/info
    pub level: String,
}

/// 容器日志查询参数
///
/// 非正值由服务层回落到默认值
#[derive(Debug, Deserialize)]
pub struct ContainerLogsQuery {
    /// 页码，从 1 开始，默认 1
    #[serde(default = "default_page")]
    pub page: i64,
    /// 每页行数，默认 100
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    100
}

/// 容器日志响应
#[derive(Debug, Serialize)]
pub struct ContainerLogsResp {
    pub logs: Vec<LogEntry>,
    pub has_more: bool,
    pub total: i64,
}
