//! 容器日志分页
//!
//! 与聚合报告共用日志读取能力的独立读路径：
//! 取一次有界尾部，再按页切片

use chrono::DateTime;

use crate::domain::container::LogEntry;

/// 分页读取时的尾部上限
pub const PAGINATION_TAIL_LINES: usize = 1000;

/// 默认页码
pub const DEFAULT_PAGE: usize = 1;

/// 默认每页行数
pub const DEFAULT_LIMIT: usize = 100;

/// 从尾部结果中取第 `page` 页（每页 `limit` 行）
///
/// 返回 (窗口, 是否还有后续行)；越界页返回空窗口
pub fn paginate<'a>(lines: &'a [&'a str], page: usize, limit: usize) -> (&'a [&'a str], bool) {
    let start = page.saturating_sub(1).saturating_mul(limit);
    if start >= lines.len() {
        return (&[], false);
    }
    let end = (start + limit).min(lines.len());
    (&lines[start..end], end < lines.len())
}

/// 把一行原始日志解析为 LogEntry
///
/// docker 带时间戳输出时行首为 RFC3339 时间；级别按消息内容猜测
pub fn parse_log_line(line: &str) -> LogEntry {
    let (timestamp, message) = match line.split_once(' ') {
        Some((first, rest)) if DateTime::parse_from_rfc3339(first).is_ok() => {
            (first.to_string(), rest.to_string())
        }
        _ => (String::new(), line.to_string()),
    };

    let level = guess_level(&message);

    LogEntry {
        timestamp,
        message,
        level,
    }
}

fn guess_level(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("error") || lower.contains("fatal") || lower.contains("panic") {
        "error".to_string()
    } else if lower.contains("warn") {
        "warn".to_string()
    } else {
        "info".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_paginate_middle_page() {
        // 25 行，page=2 limit=10 -> 第 11-20 行，还有后续
        let owned = lines(25);
        let refs: Vec<&str> = owned.iter().map(String::as_str).collect();

        let (window, has_more) = paginate(&refs, 2, 10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0], "line 11");
        assert_eq!(window[9], "line 20");
        assert!(has_more);
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let owned = lines(25);
        let refs: Vec<&str> = owned.iter().map(String::as_str).collect();

        let (window, has_more) = paginate(&refs, 3, 10);
        assert_eq!(window.len(), 5);
        assert_eq!(window[0], "line 21");
        assert_eq!(window[4], "line 25");
        assert!(!has_more);
    }

    #[test]
    fn test_paginate_out_of_range() {
        let owned = lines(5);
        let refs: Vec<&str> = owned.iter().map(String::as_str).collect();

        let (window, has_more) = paginate(&refs, 4, 10);
        assert!(window.is_empty());
        assert!(!has_more);
    }

    #[test]
    fn test_parse_log_line_with_timestamp() {
        let entry = parse_log_line("2024-06-01T08:30:00.123456789Z server started on port 8080");
        assert_eq!(entry.timestamp, "2024-06-01T08:30:00.123456789Z");
        assert_eq!(entry.message, "server started on port 8080");
        assert_eq!(entry.level, "info");
    }

    #[test]
    fn test_parse_log_line_without_timestamp() {
        let entry = parse_log_line("error: connection refused");
        assert_eq!(entry.timestamp, "");
        assert_eq!(entry.message, "error: connection refused");
        assert_eq!(entry.level, "error");
    }

    #[test]
    fn test_parse_log_line_warn_level() {
        let entry = parse_log_line("warning: deprecated flag");
        assert_eq!(entry.level, "warn");
    }
}
