//! 配置模块

pub mod env;

pub use env::EnvConfig;

/// 命令行运行时配置
///
/// 仅覆盖少量启动参数，其余配置通过环境变量加载
#[derive(Debug, Default, Clone)]
pub struct RuntimeConfig {
    /// 覆盖监听端口（`--port`）
    pub port_override: Option<u16>,
}
