use std::io::Write as _;
use std::sync::Mutex;

use tracing::debug;

use super::format::{Tone, truncate_text};
use super::{FileListing, Modal, Notice, Page, Renderer, TaskRow};
use crate::form::{CrawlForm, FieldKind};

const RESET: &str = "\x1b[0m";

/// 直接输出到标准输出的渲染器。
///
/// 终端无法撤回已经打印的内容，所以"关闭"类操作只记录日志。
pub struct TerminalRenderer {
    color: bool,
    // 串行化多行输出，避免轮询与命令输出交错
    out: Mutex<()>,
}

impl TerminalRenderer {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            out: Mutex::new(()),
        }
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match tone {
            Tone::Neutral => "\x1b[37m",
            Tone::Active => "\x1b[36m",
            Tone::Positive => "\x1b[32m",
            Tone::Negative => "\x1b[31m",
            Tone::Caution => "\x1b[33m",
            Tone::Muted => "\x1b[90m",
        };
        format!("{code}{text}{RESET}")
    }

    fn emit(&self, lines: Vec<String>) {
        let _guard = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let mut stdout = std::io::stdout().lock();
        for line in lines {
            let _ = writeln!(stdout, "{line}");
        }
        let _ = stdout.flush();
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Renderer for TerminalRenderer {
    fn navigate(&self, page: Page) {
        self.emit(vec![
            String::new(),
            format!("══ {} {}", page.title(), "═".repeat(40)),
        ]);
    }

    fn render_form(&self, form: &CrawlForm) {
        let mut lines = vec!["── 任务配置 ──".to_string()];
        for field in form.fields().filter(|f| f.visible) {
            let marker = if field.required { "*" } else { " " };
            let value = match field.id.kind() {
                FieldKind::Checkbox => (if field.checked { "[x]" } else { "[ ]" }).to_string(),
                _ if field.value.is_empty() => "<未填写>".to_string(),
                _ => field.value.clone(),
            };
            let focus = if form.focused() == Some(field.id) { "▶" } else { " " };
            lines.push(format!(
                "{focus}{marker} {:<18} {:<16} {}",
                field.id.name(),
                field.id.label(),
                value
            ));
            if let Some(error) = &field.error {
                lines.push(format!("     {}", self.paint(Tone::Negative, error)));
            }
        }
        self.emit(lines);
    }

    fn set_submitting(&self, busy: bool) {
        if busy {
            self.emit(vec![self.paint(Tone::Muted, "⏳ 正在提交...")]);
        }
    }

    fn show_notice(&self, notice: &Notice) {
        let text = format!("{} {}", notice.severity.icon(), notice.message);
        self.emit(vec![self.paint(notice.severity.tone(), &text)]);
    }

    fn clear_notice(&self) {
        debug!("Notice dismissed");
    }

    fn render_tasks(&self, rows: &[TaskRow]) {
        if rows.is_empty() {
            self.emit(vec![self.paint(Tone::Muted, "暂无任务")]);
            return;
        }
        let mut lines = vec![format!(
            "{:<38} {:<10} {:<8} {:<10} {:<22} {}",
            "ID", "状态", "平台", "类型", "目标", "创建时间"
        )];
        for row in rows {
            let status = format!("{} {}", row.badge.icon, row.badge.label);
            lines.push(format!(
                "{:<38} {} {:<8} {:<10} {:<22} {}",
                row.id,
                self.paint(row.badge.tone, &format!("{status:<10}")),
                row.platform,
                row.mode,
                truncate_text(&row.target, 20),
                row.created
            ));
        }
        self.emit(lines);
    }

    fn open_modal(&self, modal: &Modal) {
        let mut lines = vec![String::new()];
        match modal {
            Modal::TaskDetail(detail) => {
                lines.push(format!(
                    "┌─ 任务详情 {} {}",
                    detail.badge.icon,
                    self.paint(detail.badge.tone, detail.badge.label)
                ));
                for (label, value) in &detail.fields {
                    lines.push(format!("│ {label}: {value}"));
                }
                if let Some(message) = &detail.message {
                    lines.push(format!("│ 状态信息: {message}"));
                }
                if let Some(error) = &detail.error {
                    lines.push(format!("│ {}", self.paint(Tone::Negative, &format!("错误: {error}"))));
                }
                if !detail.output_files.is_empty() {
                    lines.push("│ 输出文件:".to_string());
                    for link in &detail.output_files {
                        lines.push(format!("│   {} → {}", link.name, link.url));
                    }
                }
                if detail.can_stop {
                    lines.push(format!("│ 输入 `stop {}` 停止任务", detail.id));
                }
            }
            Modal::Preview(preview) => {
                lines.push(format!("┌─ 预览 {} ({})", preview.name, preview.file_type));
                for line in preview.body.lines() {
                    lines.push(format!("│ {line}"));
                }
            }
        }
        lines.push("└─ 输入 `close` 关闭".to_string());
        self.emit(lines);
    }

    fn close_modal(&self) {
        debug!("Modal closed");
    }

    fn render_files(&self, listing: &FileListing) {
        match listing {
            FileListing::Empty => {
                self.emit(vec![self.paint(Tone::Muted, "📭 暂无数据文件，完成爬取任务后会出现在这里")]);
            }
            FileListing::Rows(rows) => {
                let mut lines = vec![format!(
                    "   {:<40} {:>12} {:<20} {}",
                    "文件名", "大小", "修改时间", "下载"
                )];
                for row in rows {
                    lines.push(format!(
                        "{} {:<40} {:>12} {:<20} {}",
                        row.kind.icon(),
                        row.name,
                        row.size,
                        row.modified,
                        row.download_url
                    ));
                }
                self.emit(lines);
            }
        }
    }
}
