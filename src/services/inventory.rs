//! 组件清单
//!
//! 查询 Docker 运行时，过滤出本应用栈的容器，格式化端口，
//! 并对已识别家族的容器并发拉取日志做健康分类

use futures::future::join_all;
use tracing::warn;

use crate::domain::container::{PortBinding, ProcessUnit};
use crate::domain::system::ComponentStatus;
use crate::infra::{ContainerRuntime, RuntimeError};
use crate::services::health::{classify_logs, LogVerdict, ServiceFamily};

/// 本应用栈容器名允许列表（小写子串匹配）
const UNIT_ALLOWLIST: &[&str] = &["kbase", "raglite", "qdrant", "anydoc"];

/// 列出本应用栈的组件状态
///
/// 运行时不可达时整体失败，由调用方降级为空列表；
/// 单个容器日志读取失败只影响该容器的健康字段
pub async fn list_components<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    tail_lines: usize,
) -> Result<Vec<ComponentStatus>, RuntimeError> {
    let units = runtime.list_units().await?;

    let retained: Vec<ProcessUnit> = units
        .into_iter()
        .filter(|unit| is_stack_unit(&unit.name))
        .collect();

    // 各容器的日志拉取相互独立，并发执行，各自受超时约束
    let verdicts = join_all(
        retained
            .iter()
            .map(|unit| classify_unit(runtime, unit, tail_lines)),
    )
    .await;

    let components = retained
        .into_iter()
        .zip(verdicts)
        .map(|(unit, verdict)| {
            let (health, log_status) = match verdict {
                Some(v) => (Some(v.health), Some(v.status)),
                None => (None, None),
            };
            ComponentStatus {
                name: unit.name,
                status: unit.status,
                image: unit.image,
                ports: format_ports(&unit.ports),
                health,
                log_status,
            }
        })
        .collect();

    Ok(components)
}

/// 单容器健康分类；未识别家族返回 None
async fn classify_unit<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    unit: &ProcessUnit,
    tail_lines: usize,
) -> Option<LogVerdict> {
    let family = ServiceFamily::of_unit(&unit.name);
    if family == ServiceFamily::Other {
        return None;
    }

    match runtime.tail_logs(&unit.id, tail_lines, false).await {
        Ok(text) => classify_logs(family, &text),
        Err(err) => {
            warn!(container = %unit.name, error = %err, "Failed to tail container logs");
            Some(LogVerdict::unreadable())
        }
    }
}

fn is_stack_unit(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    UNIT_ALLOWLIST.iter().any(|kw| name_lower.contains(kw))
}

/// 构建端口描述串
///
/// 有发布端口时为 `published->private/protocol`，否则 `private/protocol`，
/// 逗号分隔；无端口映射时为空串
pub fn format_ports(ports: &[PortBinding]) -> String {
    let parts: Vec<String> = ports
        .iter()
        .map(|p| match p.public_port {
            Some(public) => format!("{}->{}/{}", public, p.private_port, p.protocol),
            None => format!("{}/{}", p.private_port, p.protocol),
        })
        .collect();

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::system::HealthVerdict;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// 测试用假运行时
    struct FakeRuntime {
        units: Vec<ProcessUnit>,
        logs: HashMap<String, String>,
        fail_list: bool,
        fail_logs: bool,
    }

    impl FakeRuntime {
        fn new(units: Vec<ProcessUnit>) -> Self {
            Self {
                units,
                logs: HashMap::new(),
                fail_list: false,
                fail_logs: false,
            }
        }

        fn with_logs(mut self, id: &str, text: &str) -> Self {
            self.logs.insert(id.to_string(), text.to_string());
            self
        }
    }

    #[async_trait]
    impl ContainerRuntime for FakeRuntime {
        async fn list_units(&self) -> Result<Vec<ProcessUnit>, RuntimeError> {
            if self.fail_list {
                return Err(RuntimeError::ListContainers(
                    bollard::errors::Error::RequestTimeoutError,
                ));
            }
            Ok(self.units.clone())
        }

        async fn tail_logs(
            &self,
            id: &str,
            _max_lines: usize,
            _timestamps: bool,
        ) -> Result<String, RuntimeError> {
            if self.fail_logs {
                return Err(RuntimeError::LogTimeout { id: id.to_string() });
            }
            self.logs
                .get(id)
                .cloned()
                .ok_or_else(|| RuntimeError::NotFound { id: id.to_string() })
        }
    }

    fn unit(id: &str, name: &str) -> ProcessUnit {
        ProcessUnit {
            id: id.to_string(),
            name: name.to_string(),
            image: format!("{name}:latest"),
            status: "Up 3 hours".to_string(),
            ports: vec![],
        }
    }

    #[test]
    fn test_format_ports_examples() {
        let unpublished = PortBinding {
            private_port: 6379,
            public_port: None,
            protocol: "tcp".to_string(),
        };
        assert_eq!(format_ports(&[unpublished.clone()]), "6379/tcp");

        let published = PortBinding {
            private_port: 6379,
            public_port: Some(16379),
            protocol: "tcp".to_string(),
        };
        assert_eq!(format_ports(&[published.clone()]), "16379->6379/tcp");

        assert_eq!(
            format_ports(&[published, unpublished]),
            "16379->6379/tcp, 6379/tcp"
        );
        assert_eq!(format_ports(&[]), "");
    }

    #[tokio::test]
    async fn test_list_components_filters_by_allowlist() {
        let runtime = FakeRuntime::new(vec![
            unit("1", "kbase-api"),
            unit("2", "postgres"),
            unit("3", "some-other-app"),
            unit("4", "kbase-anydoc-1"),
        ]);

        let components = list_components(&runtime, 200).await.unwrap();
        let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["kbase-api", "kbase-anydoc-1"]);
        // 未识别家族不带健康字段
        assert!(components.iter().all(|c| c.health.is_none()));
        assert!(components.iter().all(|c| c.log_status.is_none()));
    }

    #[tokio::test]
    async fn test_list_components_classifies_known_families() {
        let runtime = FakeRuntime::new(vec![
            unit("app", "kbase-raglite-1"),
            unit("idx", "kbase-qdrant-1"),
        ])
        .with_logs("app", "server started on port 8080")
        .with_logs("idx", "loading collection foo\nqdrant is ready");

        let components = list_components(&runtime, 200).await.unwrap();
        assert_eq!(components.len(), 2);

        assert_eq!(components[0].health, Some(HealthVerdict::Healthy));
        assert_eq!(components[0].log_status.as_deref(), Some("Running normally"));

        assert_eq!(components[1].health, Some(HealthVerdict::Healthy));
        assert_eq!(
            components[1].log_status.as_deref(),
            Some("Running - Collections loaded")
        );
    }

    #[tokio::test]
    async fn test_tail_failure_yields_unknown_not_error() {
        let mut runtime = FakeRuntime::new(vec![
            unit("app", "kbase-raglite-1"),
            unit("api", "kbase-api"),
        ]);
        runtime.fail_logs = true;

        let components = list_components(&runtime, 200).await.unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].health, Some(HealthVerdict::Unknown));
        assert_eq!(
            components[0].log_status.as_deref(),
            Some("failed to read logs")
        );
        // 其余容器不受影响
        assert!(components[1].health.is_none());
    }

    #[tokio::test]
    async fn test_runtime_unreachable_fails_whole_call() {
        let mut runtime = FakeRuntime::new(vec![]);
        runtime.fail_list = true;

        let result = list_components(&runtime, 200).await;
        assert!(result.is_err());
    }
}
