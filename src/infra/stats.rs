//! 队列统计接口客户端
//!
//! 封装与 kbase 后端统计接口的 HTTP 交互，复用连接池。
//! 文档/队列数据由后端的关系存储产生，本代理只消费其契约

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::domain::system::{DocumentStats, LearningStats};

/// 统计接口访问错误
#[derive(Debug, Error)]
pub enum StatsError {
    /// 请求失败（不可达、超时、响应解析失败）
    #[error("stats request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// 后端返回非 2xx
    #[error("stats endpoint returned status {status}")]
    Status { status: u16 },
}

/// 队列统计提供方
///
/// 聚合报告的必需依赖：文档计数与两阶段处理队列计数
#[async_trait]
pub trait QueueStatsProvider: Send + Sync {
    /// 文档统计（当前数量、24h 新增、学习成功/失败）
    async fn document_stats(&self, kb_id: &str) -> Result<DocumentStats, StatsError>;

    /// 学习队列统计（basic/enhance 各阶段计数 + 失败文档样本）
    async fn learning_stats(&self, kb_id: &str) -> Result<LearningStats, StatsError>;
}

/// 基于 HTTP 的统计接口客户端
#[derive(Clone)]
pub struct StatsApiClient {
    client: Client,
    base_url: String,
}

impl StatsApiClient {
    /// 创建新的统计客户端
    ///
    /// # Arguments
    /// * `base_url` - kbase 后端地址，如 `http://localhost:8000`
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        kb_id: &str,
    ) -> Result<T, StatsError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(&[("kb_id", kb_id)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StatsError::Status {
                status: resp.status().as_u16(),
            });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl QueueStatsProvider for StatsApiClient {
    async fn document_stats(&self, kb_id: &str) -> Result<DocumentStats, StatsError> {
        self.get_json("/internal/api/v1/stat/documents", kb_id).await
    }

    async fn learning_stats(&self, kb_id: &str) -> Result<LearningStats, StatsError> {
        self.get_json("/internal/api/v1/stat/learning", kb_id).await
    }
}
