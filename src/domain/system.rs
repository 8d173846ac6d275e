//! 系统状态相关领域模型
//!
//! `SystemResp` 为 `/api/v1/system` 的完整响应：文档统计 + 学习队列 + 组件状态

use serde::{Deserialize, Serialize};

/// 健康判定结果
///
/// 由日志启发式分析得出，优先级 unhealthy > degraded > healthy > unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthVerdict {
    Unknown,
    Healthy,
    Degraded,
    Unhealthy,
}

/// 系统状态查询参数
#[derive(Debug, Deserialize)]
pub struct SystemQuery {
    /// 知识库 ID
    pub kb_id: Option<String>,
}

/// 系统状态响应
#[derive(Debug, Serialize)]
pub struct SystemResp {
    pub document: DocumentInfo,
    pub learning: LearningInfo,
    pub system: SystemInfo,
}

/// 文档统计
#[derive(Debug, Serialize)]
pub struct DocumentInfo {
    /// 当前文档数
    pub current_count: i64,
    /// 24h 新增文档数
    pub new_in_24h: i64,
    /// 学习成功数量
    pub learning_succeeded: i64,
    /// 学习失败数量
    pub learning_failed: i64,
}

/// 学习队列统计
#[derive(Debug, Serialize)]
pub struct LearningInfo {
    /// 基础处理队列进度
    pub basic_processing: QueueProgress,
    /// 基础处理失败数
    pub basic_failed: i64,
    /// 增强处理队列进度
    pub enhance_processing: QueueProgress,
    /// 增强处理失败数
    pub enhance_failed: i64,
    /// 基础处理失败文档样本
    pub basic_failed_docs: Vec<FailedDoc>,
    /// 增强处理失败文档样本
    pub enhance_failed_docs: Vec<FailedDoc>,
}

/// 单阶段队列进度
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueProgress {
    pub pending: i64,
    pub running: i64,
    pub total: i64,
    /// 进度百分比 (0-100)
    pub progress: i32,
}

impl QueueProgress {
    /// 由四个计数器构造单阶段进度
    ///
    /// total = pending + running + failed + succeeded；
    /// 完成度把 failed 与 succeeded 都计为"已结束"，total 为 0 时进度为 0
    pub fn new(pending: i64, running: i64, failed: i64, succeeded: i64) -> Self {
        let total = pending + running + failed + succeeded;
        let progress = if total > 0 {
            ((total - pending - running) * 100 / total) as i32
        } else {
            0
        };
        Self {
            pending,
            running,
            total,
            progress,
        }
    }
}

/// 处理失败的文档样本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedDoc {
    /// 节点 ID
    pub node_id: String,
    /// 文档名
    pub node_name: String,
    /// 失败原因
    pub reason: String,
}

/// 系统组件列表
#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub components: Vec<ComponentStatus>,
}

/// 单个组件状态（报告中的一行）
#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    /// 组件名称
    pub name: String,
    /// 生命周期状态（docker 上报的原始状态串）
    pub status: String,
    /// 镜像名称
    pub image: String,
    /// 端口信息
    pub ports: String,
    /// 健康状态（仅已识别的服务家族）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthVerdict>,
    /// 日志解析状态（仅已识别的服务家族）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_status: Option<String>,
}

/// 文档统计（统计接口返回）
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentStats {
    pub current_count: i64,
    pub new_in_24h: i64,
    pub learning_succeeded: i64,
    pub learning_failed: i64,
}

/// 学习队列统计（统计接口返回）
#[derive(Debug, Clone, Deserialize)]
pub struct LearningStats {
    pub basic_pending: i64,
    pub basic_running: i64,
    pub basic_failed: i64,
    pub basic_succeeded: i64,
    pub enhance_pending: i64,
    pub enhance_running: i64,
    pub enhance_failed: i64,
    pub enhance_succeeded: i64,
    #[serde(default)]
    pub basic_failed_docs: Vec<FailedDoc>,
    #[serde(default)]
    pub enhance_failed_docs: Vec<FailedDoc>,
}
