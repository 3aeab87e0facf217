//! 纯展示函数：原始值 → 显示文本。不依赖任何界面，便于单独测试。

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

use crate::api::types::TaskStatus;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 显示色调，由渲染器映射为具体颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Active,
    Positive,
    Negative,
    Caution,
    Muted,
}

/// 状态徽标：图标、文字、色调
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub icon: &'static str,
    pub label: &'static str,
    pub tone: Tone,
}

pub fn status_badge(status: TaskStatus) -> Badge {
    match status {
        TaskStatus::Pending => Badge {
            icon: "⏳",
            label: "等待中",
            tone: Tone::Neutral,
        },
        TaskStatus::Running => Badge {
            icon: "🔄",
            label: "运行中",
            tone: Tone::Active,
        },
        TaskStatus::Completed => Badge {
            icon: "✅",
            label: "已完成",
            tone: Tone::Positive,
        },
        TaskStatus::Failed => Badge {
            icon: "❌",
            label: "失败",
            tone: Tone::Negative,
        },
        TaskStatus::Stopped => Badge {
            icon: "⏹",
            label: "已停止",
            tone: Tone::Muted,
        },
    }
}

/// 数据文件类型，由扩展名决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Code,
    Table,
    Database,
    Generic,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => FileKind::Code,
            "csv" => FileKind::Table,
            "db" => FileKind::Database,
            _ => FileKind::Generic,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            FileKind::Code => "🧾",
            FileKind::Table => "📊",
            FileKind::Database => "🗄",
            FileKind::Generic => "📄",
        }
    }
}

/// 以 1024 为进制的文件大小，保留两位小数；0 字节固定显示为 `0 B`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, SIZE_UNITS[unit])
}

/// 本地时区的时间文本
pub fn format_timestamp(epoch_secs: f64) -> String {
    format_timestamp_in(epoch_secs, &Local)
}

pub fn format_timestamp_in<Tz>(epoch_secs: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if !epoch_secs.is_finite() || epoch_secs <= 0.0 {
        return "-".to_string();
    }
    let secs = epoch_secs.trunc() as i64;
    let nanos = (epoch_secs.fract() * 1e9) as u32;
    match DateTime::from_timestamp(secs, nanos) {
        Some(utc) => utc.with_timezone(tz).format(TIME_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

/// 多行内容的安全显示：保留换行和制表符，其余控制字符转义为可见文本，
/// 避免文件中的终端转义序列改变终端状态
pub fn escape_text(content: &str) -> String {
    escape_with(content, |c| c == '\n' || c == '\t')
}

/// 单行字段（文件名、任务 ID 等）的安全显示，换行也会被转义
pub fn escape_inline(content: &str) -> String {
    escape_with(content, |_| false)
}

fn escape_with(content: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        if c.is_control() && !keep(c) {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn truncate_text(input: &str, max_chars: usize) -> String {
    let mut chars = input.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag { "是" } else { "否" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_file_size_boundaries() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1), "1.00 B");
        assert_eq!(format_file_size(1023), "1023.00 B");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_file_size_caps_at_gigabytes() {
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048.00 GB");
    }

    #[test]
    fn test_timestamp_formatting() {
        assert_eq!(format_timestamp_in(1_700_000_000.9, &Utc), "2023-11-14 22:13:20");
        assert_eq!(format_timestamp_in(0.0, &Utc), "-");
        assert_eq!(format_timestamp_in(f64::NAN, &Utc), "-");
    }

    #[test]
    fn test_file_kind_by_extension() {
        assert_eq!(FileKind::from_name("xhs_search_2024.json"), FileKind::Code);
        assert_eq!(FileKind::from_name("comments.CSV"), FileKind::Table);
        assert_eq!(FileKind::from_name("media.db"), FileKind::Database);
        assert_eq!(FileKind::from_name("README"), FileKind::Generic);
        assert_eq!(FileKind::from_name("notes.txt"), FileKind::Generic);
    }

    #[test]
    fn test_every_status_has_a_distinct_label() {
        let statuses = [
            TaskStatus::Pending,
            TaskStatus::Running,
            TaskStatus::Completed,
            TaskStatus::Failed,
            TaskStatus::Stopped,
        ];
        let mut labels: Vec<_> = statuses.iter().map(|s| status_badge(*s).label).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), statuses.len());
    }

    #[test]
    fn test_escape_text_neutralizes_terminal_sequences() {
        let escaped = escape_text("line1\n\x1b[31mred\x1b[0m\tok");
        assert!(!escaped.contains('\x1b'));
        assert!(escaped.contains("\\u{1b}[31mred"));
        assert!(escaped.contains('\n'));
        assert!(escaped.contains('\t'));
        assert_eq!(escape_text("<b>bold</b>"), "<b>bold</b>");
    }

    #[test]
    fn test_escape_inline_escapes_newlines() {
        assert_eq!(escape_inline("a\nb"), "a\\nb");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("abc", 3), "abc");
    }
}
