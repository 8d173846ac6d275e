//! 系统状态聚合
//!
//! 把队列统计（必需依赖）与组件清单（可选依赖）合并为一份报告，
//! 并提供容器日志分页查询。统计失败整体报错；
//! 运行时不可达降级为空组件列表，不影响报告本身

use tracing::{error, warn};

use crate::domain::container::ContainerLogsResp;
use crate::domain::system::{
    DocumentInfo, LearningInfo, QueueProgress, SystemInfo, SystemResp,
};
use crate::infra::{ContainerRuntime, QueueStatsProvider, RuntimeError, StatsError};
use crate::services::inventory::list_components;
use crate::services::logs::{
    paginate, parse_log_line, DEFAULT_LIMIT, DEFAULT_PAGE, PAGINATION_TAIL_LINES,
};

/// 系统状态服务
///
/// 运行时与统计客户端显式注入，测试可替换为假实现
pub struct SystemService<R, S> {
    runtime: R,
    stats: S,
    /// 健康分类使用的日志窗口行数
    tail_lines: usize,
}

impl<R, S> SystemService<R, S>
where
    R: ContainerRuntime,
    S: QueueStatsProvider,
{
    pub fn new(runtime: R, stats: S, tail_lines: usize) -> Self {
        Self {
            runtime,
            stats,
            tail_lines,
        }
    }

    /// 获取系统状态报告
    ///
    /// 文档/队列统计为必需依赖，失败时整体报错；
    /// 组件清单失败只记录告警并置空
    pub async fn get_system(&self, kb_id: &str) -> Result<SystemResp, StatsError> {
        let doc = self.stats.document_stats(kb_id).await?;
        let learning = self.stats.learning_stats(kb_id).await?;

        let basic_processing = QueueProgress::new(
            learning.basic_pending,
            learning.basic_running,
            learning.basic_failed,
            learning.basic_succeeded,
        );
        let enhance_processing = QueueProgress::new(
            learning.enhance_pending,
            learning.enhance_running,
            learning.enhance_failed,
            learning.enhance_succeeded,
        );

        let components = match list_components(&self.runtime, self.tail_lines).await {
            Ok(components) => components,
            Err(err) => {
                // 运行时不可达不应拖垮整份报告
                warn!(error = %err, "Failed to get docker component status");
                Vec::new()
            }
        };

        Ok(SystemResp {
            document: DocumentInfo {
                current_count: doc.current_count,
                new_in_24h: doc.new_in_24h,
                learning_succeeded: doc.learning_succeeded,
                learning_failed: doc.learning_failed,
            },
            learning: LearningInfo {
                basic_processing,
                basic_failed: learning.basic_failed,
                enhance_processing,
                enhance_failed: learning.enhance_failed,
                basic_failed_docs: learning.basic_failed_docs,
                enhance_failed_docs: learning.enhance_failed_docs,
            },
            system: SystemInfo { components },
        })
    }

    /// 获取容器分页日志
    ///
    /// page/limit 非正时取默认值；日志读取失败对该请求整体报错
    pub async fn get_container_logs(
        &self,
        container_name: &str,
        page: usize,
        limit: usize,
    ) -> Result<ContainerLogsResp, RuntimeError> {
        let page = if page == 0 { DEFAULT_PAGE } else { page };
        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };

        let text = self
            .runtime
            .tail_logs(container_name, PAGINATION_TAIL_LINES, true)
            .await
            .map_err(|err| {
                error!(container = %container_name, error = %err, "Failed to get container logs");
                err
            })?;

        let lines: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
        let (window, has_more) = paginate(&lines, page, limit);

        let logs: Vec<_> = window.iter().map(|line| parse_log_line(line)).collect();
        let total = logs.len() as i64;

        Ok(ContainerLogsResp {
            logs,
            has_more,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::container::ProcessUnit;
    use crate::domain::system::{DocumentStats, FailedDoc, LearningStats};
    use async_trait::async_trait;

    struct FakeRuntime {
        logs: Option<String>,
        unreachable: bool,
    }

    #[async_trait]
    impl ContainerRuntime for FakeRuntime {
        async fn list_units(&self) -> Result<Vec<ProcessUnit>, RuntimeError> {
            if self.unreachable {
                return Err(RuntimeError::ListContainers(
                    bollard::errors::Error::RequestTimeoutError,
                ));
            }
            Ok(vec![ProcessUnit {
                id: "app".to_string(),
                name: "kbase-raglite-1".to_string(),
                image: "raglite:latest".to_string(),
                status: "Up 2 hours".to_string(),
                ports: vec![],
            }])
        }

        async fn tail_logs(
            &self,
            id: &str,
            _max_lines: usize,
            _timestamps: bool,
        ) -> Result<String, RuntimeError> {
            match &self.logs {
                Some(text) => Ok(text.clone()),
                None => Err(RuntimeError::NotFound { id: id.to_string() }),
            }
        }
    }

    struct FakeStats {
        fail: bool,
    }

    #[async_trait]
    impl QueueStatsProvider for FakeStats {
        async fn document_stats(&self, _kb_id: &str) -> Result<DocumentStats, StatsError> {
            if self.fail {
                return Err(StatsError::Status { status: 500 });
            }
            Ok(DocumentStats {
                current_count: 42,
                new_in_24h: 3,
                learning_succeeded: 40,
                learning_failed: 2,
            })
        }

        async fn learning_stats(&self, _kb_id: &str) -> Result<LearningStats, StatsError> {
            if self.fail {
                return Err(StatsError::Status { status: 500 });
            }
            Ok(LearningStats {
                basic_pending: 2,
                basic_running: 1,
                basic_failed: 3,
                basic_succeeded: 4,
                enhance_pending: 0,
                enhance_running: 0,
                enhance_failed: 0,
                enhance_succeeded: 0,
                basic_failed_docs: vec![FailedDoc {
                    node_id: "n1".to_string(),
                    node_name: "doc-a".to_string(),
                    reason: "parse failed".to_string(),
                }],
                enhance_failed_docs: vec![],
            })
        }
    }

    fn service(logs: Option<&str>, unreachable: bool, stats_fail: bool) -> SystemService<FakeRuntime, FakeStats> {
        SystemService::new(
            FakeRuntime {
                logs: logs.map(str::to_string),
                unreachable,
            },
            FakeStats { fail: stats_fail },
            200,
        )
    }

    #[tokio::test]
    async fn test_get_system_merges_stats_and_components() {
        let svc = service(Some("server started on port 8080"), false, false);
        let resp = svc.get_system("kb-1").await.unwrap();

        assert_eq!(resp.document.current_count, 42);
        assert_eq!(resp.learning.basic_processing.total, 10);
        assert_eq!(resp.learning.basic_processing.progress, 70);
        assert_eq!(resp.learning.enhance_processing.total, 0);
        assert_eq!(resp.learning.enhance_processing.progress, 0);
        assert_eq!(resp.learning.basic_failed_docs.len(), 1);
        assert_eq!(resp.system.components.len(), 1);
        assert_eq!(resp.system.components[0].name, "kbase-raglite-1");
    }

    #[tokio::test]
    async fn test_runtime_failure_is_not_fatal() {
        // 运行时不可达：报告照常返回，组件列表为空
        let svc = service(None, true, false);
        let resp = svc.get_system("kb-1").await.unwrap();

        assert!(resp.system.components.is_empty());
        assert_eq!(resp.document.current_count, 42);
        assert_eq!(resp.learning.basic_processing.progress, 70);
    }

    #[tokio::test]
    async fn test_stats_failure_is_fatal() {
        let svc = service(Some("started"), false, true);
        assert!(svc.get_system("kb-1").await.is_err());
    }

    #[tokio::test]
    async fn test_get_container_logs_pagination() {
        let text = (1..=25)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let svc = service(Some(&text), false, false);

        let resp = svc.get_container_logs("kbase-api", 2, 10).await.unwrap();
        assert_eq!(resp.total, 10);
        assert_eq!(resp.logs[0].message, "line 11");
        assert_eq!(resp.logs[9].message, "line 20");
        assert!(resp.has_more);

        let resp = svc.get_container_logs("kbase-api", 3, 10).await.unwrap();
        assert_eq!(resp.total, 5);
        assert_eq!(resp.logs[0].message, "line 21");
        assert!(!resp.has_more);
    }

    #[tokio::test]
    async fn test_get_container_logs_defaults() {
        let text = (1..=150)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let svc = service(Some(&text), false, false);

        // page=0/limit=0 回落到 1/100
        let resp = svc.get_container_logs("kbase-api", 0, 0).await.unwrap();
        assert_eq!(resp.total, 100);
        assert_eq!(resp.logs[0].message, "line 1");
        assert!(resp.has_more);
    }

    #[tokio::test]
    async fn test_get_container_logs_error_propagates() {
        let svc = service(None, false, false);
        let err = svc.get_container_logs("missing", 1, 100).await;
        assert!(matches!(err, Err(RuntimeError::NotFound { .. })));
    }
}
