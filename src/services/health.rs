//! 日志健康启发式分类
//!
//! 纯函数：日志文本 -> {健康判定, 状态描述}。按服务家族各有一套规则，
//! 从最近一行向前扫描，用累加器收集标志位与首次捕获的行，
//! 最后按固定优先级（fatal/panic > error > 就绪 > 部分就绪 > unknown）裁决。
//! 裁决对窗口截断单调：追加错误行不会把结论变得更健康

use crate::domain::system::HealthVerdict;

/// 状态描述最大长度，超出截断并加省略号
const STATUS_LINE_MAX: usize = 200;

/// 无日志时的缺省描述
const NO_RECENT_LOGS: &str = "No recent logs";

/// 服务家族
///
/// 由容器名判定，决定使用哪套日志规则；未识别家族不做健康分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFamily {
    /// 应用服务（raglite）
    Application,
    /// 向量索引服务（qdrant）
    Index,
    /// 其余组件
    Other,
}

impl ServiceFamily {
    /// 按容器名（小写子串）判定家族
    pub fn of_unit(name: &str) -> Self {
        let name_lower = name.to_lowercase();
        if name_lower.contains("raglite") {
            Self::Application
        } else if name_lower.contains("qdrant") {
            Self::Index
        } else {
            Self::Other
        }
    }
}

/// 日志分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogVerdict {
    pub health: HealthVerdict,
    pub status: String,
}

impl LogVerdict {
    /// 日志读取失败时的占位判定
    pub fn unreadable() -> Self {
        Self {
            health: HealthVerdict::Unknown,
            status: "failed to read logs".to_string(),
        }
    }
}

/// 按家族分发日志分类，未识别家族返回 None
pub fn classify_logs(family: ServiceFamily, text: &str) -> Option<LogVerdict> {
    match family {
        ServiceFamily::Application => Some(classify_application_logs(text)),
        ServiceFamily::Index => Some(classify_index_logs(text)),
        ServiceFamily::Other => None,
    }
}

/// 应用服务日志扫描累加器
#[derive(Debug, Default)]
struct AppScan {
    started: bool,
    listening: bool,
    fatal: bool,
    error: bool,
    /// 最近一条有意义的日志（倒序扫描首次遇到）
    last_line: Option<String>,
}

/// 应用服务家族分类（大小写不敏感）
pub fn classify_application_logs(text: &str) -> LogVerdict {
    let scan = text
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .fold(AppScan::default(), |mut scan, line| {
            let line_lower = line.to_lowercase();

            if scan.last_line.is_none() && is_meaningful(line) {
                scan.last_line = Some(truncate_status(line));
            }

            if line_lower.contains("listening on")
                || line_lower.contains("server started")
                || line_lower.contains("started on port")
            {
                scan.listening = true;
            }
            if line_lower.contains("started") || line_lower.contains("ready") {
                scan.started = true;
            }
            if line_lower.contains("fatal") {
                scan.fatal = true;
            }
            // 排除结构化日志的 level=error 字段
            if line_lower.contains("error") && !line_lower.contains("level=error") {
                scan.error = true;
            }

            scan
        });

    let last_line = scan.last_line;
    if scan.fatal {
        LogVerdict {
            health: HealthVerdict::Unhealthy,
            status: format!(
                "Fatal error detected: {}",
                last_line.unwrap_or_default()
            ),
        }
    } else if scan.error {
        LogVerdict {
            health: HealthVerdict::Degraded,
            status: format!("Error detected: {}", last_line.unwrap_or_default()),
        }
    } else if scan.listening || scan.started {
        LogVerdict {
            health: HealthVerdict::Healthy,
            status: "Running normally".to_string(),
        }
    } else if let Some(line) = last_line {
        LogVerdict {
            health: HealthVerdict::Unknown,
            status: line,
        }
    } else {
        LogVerdict {
            health: HealthVerdict::Unknown,
            status: NO_RECENT_LOGS.to_string(),
        }
    }
}

/// 索引服务日志扫描累加器
#[derive(Debug, Default)]
struct IndexScan {
    listening: bool,
    collection_loaded: bool,
    panic: bool,
    error: bool,
    last_line: Option<String>,
    /// 首次捕获的错误行（倒序扫描即最近一条）
    error_line: Option<String>,
}

/// 索引服务家族分类
///
/// 大小写不敏感，唯一例外是 qdrant 的 `ERROR` 级别标记按原样匹配
pub fn classify_index_logs(text: &str) -> LogVerdict {
    let scan = text
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .fold(IndexScan::default(), |mut scan, line| {
            let line_lower = line.to_lowercase();

            if scan.last_line.is_none() && is_meaningful(line) {
                scan.last_line = Some(truncate_status(line));
            }

            if line_lower.contains("qdrant is ready")
                || line_lower.contains("listening")
                || line_lower.contains("access web ui at")
            {
                scan.listening = true;
            }

            if line_lower.contains("loading collection")
                || line_lower.contains("collection loaded")
            {
                scan.collection_loaded = true;
            }

            if line_lower.contains("panic") {
                scan.panic = true;
                if scan.error_line.is_none() {
                    scan.error_line = Some(line.to_string());
                }
            }

            if line.contains("ERROR")
                || (line_lower.contains("error") && line.contains("qdrant::startup"))
            {
                scan.error = true;
                if scan.error_line.is_none() {
                    scan.error_line = Some(line.to_string());
                }
            }

            scan
        });

    if scan.panic {
        LogVerdict {
            health: HealthVerdict::Unhealthy,
            status: match scan.error_line {
                Some(line) => format!("Panic detected: {}", line),
                None => "Panic detected in logs".to_string(),
            },
        }
    } else if scan.error {
        LogVerdict {
            health: HealthVerdict::Unhealthy,
            status: match scan.error_line {
                Some(line) => format!("Error: {}", line),
                None => "Error detected in logs".to_string(),
            },
        }
    } else if scan.listening {
        LogVerdict {
            health: HealthVerdict::Healthy,
            status: if scan.collection_loaded {
                "Running - Collections loaded".to_string()
            } else {
                "Running normally".to_string()
            },
        }
    } else if scan.collection_loaded {
        LogVerdict {
            health: HealthVerdict::Degraded,
            status: "Collections loaded but not fully ready".to_string(),
        }
    } else if let Some(line) = scan.last_line {
        LogVerdict {
            health: HealthVerdict::Unknown,
            status: line,
        }
    } else {
        LogVerdict {
            health: HealthVerdict::Unknown,
            status: NO_RECENT_LOGS.to_string(),
        }
    }
}

/// 过短的行（进度条碎片等）不作为状态描述
fn is_meaningful(line: &str) -> bool {
    line.len() > 10
}

/// 截断到 200 字符并追加省略号
fn truncate_status(line: &str) -> String {
    if line.chars().count() > STATUS_LINE_MAX {
        let mut truncated: String = line.chars().take(STATUS_LINE_MAX).collect();
        truncated.push_str("...");
        truncated
    } else {
        line.to_string()
    }
}
