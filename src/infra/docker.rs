//! Docker 运行时客户端
//!
//! 通过 bollard 访问 Docker Engine API：列出容器、拉取日志尾部。
//! 客户端显式传入各服务层，便于测试注入假实现。

use std::time::Duration;

use async_trait::async_trait;
use bollard::{
    container::{ListContainersOptions, LogsOptions},
    errors::Error as DockerError,
    Docker,
};
use futures::StreamExt;
use thiserror::Error;

use crate::domain::container::{PortBinding, ProcessUnit};

/// 运行时访问错误
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Docker 端点不可达
    #[error("docker unreachable during {context}: {source}")]
    Connection {
        context: &'static str,
        source: DockerError,
    },
    /// 容器不存在
    #[error("container {id} not found")]
    NotFound { id: String },
    /// 列出容器失败
    #[error("failed to list containers: {0}")]
    ListContainers(DockerError),
    /// 读取日志失败
    #[error("failed to read logs of container {id}: {source}")]
    Logs { id: String, source: DockerError },
    /// 日志读取超时（容器卡住或输出过多）
    #[error("log read of container {id} timed out")]
    LogTimeout { id: String },
}

/// 容器运行时能力
///
/// 只暴露本代理需要的两个操作："列出所有单元"与"拉取日志尾部"
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// 列出所有容器（包括已停止的）
    async fn list_units(&self) -> Result<Vec<ProcessUnit>, RuntimeError>;

    /// 拉取容器最近 `max_lines` 行 stdout+stderr 合并日志
    ///
    /// `timestamps` 为 true 时每行带 docker 时间戳。整个拉取受固定超时约束，
    /// 父任务取消时随 Future drop 一并中止
    async fn tail_logs(
        &self,
        id: &str,
        max_lines: usize,
        timestamps: bool,
    ) -> Result<String, RuntimeError>;
}

/// 基于 bollard 的运行时实现
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
    tail_timeout: Duration,
}

impl DockerRuntime {
    /// 连接本机 Docker（环境变量/默认 socket）
    pub fn connect(tail_timeout: Duration) -> Result<Self, RuntimeError> {
        let docker =
            Docker::connect_with_local_defaults().map_err(|err| RuntimeError::Connection {
                context: "connect",
                source: err,
            })?;
        Ok(Self {
            docker,
            tail_timeout,
        })
    }

    /// 使用现成的 bollard 客户端构造（测试或自定义连接方式）
    pub fn from_client(docker: Docker, tail_timeout: Duration) -> Self {
        Self {
            docker,
            tail_timeout,
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_units(&self) -> Result<Vec<ProcessUnit>, RuntimeError> {
        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions::<String> {
                all: true,
                ..Default::default()
            }))
            .await
            .map_err(|err| map_connection_or(err, "list_containers", RuntimeError::ListContainers))?;

        let units = containers
            .into_iter()
            .map(|c| ProcessUnit {
                id: c.id.unwrap_or_default(),
                // docker 上报名称带前导斜杠
                name: c
                    .names
                    .as_ref()
                    .and_then(|names| names.first())
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_default(),
                image: c.image.unwrap_or_default(),
                status: c.status.unwrap_or_default(),
                ports: c
                    .ports
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| PortBinding {
                        private_port: p.private_port as u16,
                        public_port: p.public_port.map(|v| v as u16).filter(|&v| v > 0),
                        protocol: p
                            .typ
                            .map(|t| t.to_string())
                            .unwrap_or_else(|| "tcp".to_string()),
                    })
                    .collect(),
            })
            .collect();

        Ok(units)
    }

    async fn tail_logs(
        &self,
        id: &str,
        max_lines: usize,
        timestamps: bool,
    ) -> Result<String, RuntimeError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            timestamps,
            tail: max_lines.to_string(),
            ..Default::default()
        };

        let mut stream = self.docker.logs(id, Some(options));

        let collect = async {
            let mut raw: Vec<u8> = Vec::new();
            while let Some(frame) = stream.next().await {
                let frame = frame.map_err(|err| map_logs_error(err, id))?;
                raw.extend_from_slice(&frame.into_bytes());
            }
            Ok::<_, RuntimeError>(raw)
        };

        let raw = tokio::time::timeout(self.tail_timeout, collect)
            .await
            .map_err(|_| RuntimeError::LogTimeout { id: id.to_string() })??;

        Ok(strip_stream_frames(&raw))
    }
}

/// 去除日志传输层的 8 字节复用帧头
///
/// 非 TTY 容器的日志流每条记录以 `[stream_type, 0, 0, 0, len, len, len, len]`
/// 开头。仅在行首匹配帧头签名时裁剪，已解复用的纯文本原样通过；空行丢弃
pub(crate) fn strip_stream_frames(raw: &[u8]) -> String {
    let mut clean: Vec<String> = Vec::new();

    for line in raw.split(|&b| b == b'\n') {
        let stripped = if line.len() > 8 && is_frame_header(&line[..8]) {
            &line[8..]
        } else {
            line
        };
        if !stripped.is_empty() {
            clean.push(String::from_utf8_lossy(stripped).into_owned());
        }
    }

    clean.join("\n")
}

/// 帧头签名：stream_type ∈ {stdin=0, stdout=1, stderr=2}，后跟 3 个零字节
fn is_frame_header(header: &[u8]) -> bool {
    matches!(header[0], 0 | 1 | 2) && header[1..4] == [0, 0, 0]
}

fn map_connection_or<F>(err: DockerError, context: &'static str, wrap: F) -> RuntimeError
where
    F: FnOnce(DockerError) -> RuntimeError,
{
    if is_connection_error(&err) {
        RuntimeError::Connection {
            context,
            source: err,
        }
    } else {
        wrap(err)
    }
}

fn map_logs_error(err: DockerError, id: &str) -> RuntimeError {
    if is_not_found(&err) {
        RuntimeError::NotFound { id: id.to_string() }
    } else if is_connection_error(&err) {
        RuntimeError::Connection {
            context: "logs",
            source: err,
        }
    } else {
        RuntimeError::Logs {
            id: id.to_string(),
            source: err,
        }
    }
}

fn is_not_found(err: &DockerError) -> bool {
    matches!(
        err,
        DockerError::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

fn is_connection_error(err: &DockerError) -> bool {
    matches!(
        err,
        DockerError::IOError { .. }
            | DockerError::HyperResponseError { .. }
            | DockerError::RequestTimeoutError
            | DockerError::SocketNotFoundError(_)
    )
}
