//! 基础设施层
//!
//! Docker 运行时客户端与后端统计接口客户端

pub mod docker;
pub mod stats;

pub use docker::{ContainerRuntime, DockerRuntime, RuntimeError};
pub use stats::{QueueStatsProvider, StatsApiClient, StatsError};
