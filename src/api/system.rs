//! 系统状态 API
//!
//! 包含 /api/v1/system, /api/v1/system/logs/:container_name 端点。
//! 两个接口均只读幂等，要求运维 API Key

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::error;

use crate::domain::container::ContainerLogsQuery;
use crate::domain::system::SystemQuery;
use crate::error::{ApiError, ApiResult};
use crate::infra::RuntimeError;
use crate::middleware::RequireApiKey;
use crate::state::AppState;

/// 创建系统状态路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/system", get(get_system))
        .route("/api/v1/system/logs/:container_name", get(get_container_logs))
}

/// 获取系统状态（文档、学习队列、组件）
///
/// GET /api/v1/system?kb_id=xxx
/// 需要 API Key
async fn get_system(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SystemQuery>,
) -> ApiResult<impl IntoResponse> {
    let kb_id = query
        .kb_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("kb_id is required"))?;

    let resp = state.system.get_system(&kb_id).await.map_err(|e| {
        error!(kb_id = %kb_id, error = %e, "Failed to get system status");
        ApiError::service_unavailable(format!("failed to get system status: {}", e))
    })?;

    Ok(Json(resp))
}

/// 获取容器分页日志
///
/// GET /api/v1/system/logs/:container_name?page=1&limit=100
/// 需要 API Key
async fn get_container_logs(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Path(container_name): Path<String>,
    Query(query): Query<ContainerLogsQuery>,
) -> ApiResult<impl IntoResponse> {
    if container_name.is_empty() {
        return Err(ApiError::bad_request("container name is required"));
    }

    // 非正值回落到服务层默认
    let page = query.page.max(0) as usize;
    let limit = query.limit.max(0) as usize;

    let resp = state
        .system
        .get_container_logs(&container_name, page, limit)
        .await
        .map_err(|e| match e {
            RuntimeError::NotFound { .. } => {
                ApiError::not_found(format!("Container '{}'", container_name))
            }
            other => {
                error!(container = %container_name, error = %other, "Failed to get container logs");
                ApiError::internal(format!(
                    "Failed to get logs of '{}': {}",
                    container_name, other
                ))
            }
        })?;

    Ok(Json(resp))
}
