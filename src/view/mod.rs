//! 视图层
//!
//! 控制器只和 [`Renderer`] 打交道：它们先把后端数据转换为这里定义的视图模型
//! （纯数据，可直接断言），再交给渲染器画出来。渲染器本身不做任何决策。

pub mod format;
pub mod terminal;

use crate::api::types::{DataFile, FilePreview, Task, TaskStatus};
use crate::form::CrawlForm;
use format::{
    Badge, FileKind, Tone, escape_inline, escape_text, format_file_size, format_timestamp,
    status_badge, yes_no,
};

/// 页面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// 任务表单
    Home,
    /// 任务列表
    Tasks,
    /// 数据文件
    Data,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "新建爬取任务",
            Page::Tasks => "任务列表",
            Page::Data => "数据文件",
        }
    }
}

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✅",
            Severity::Error => "❌",
            Severity::Warning => "⚠️",
            Severity::Info => "ℹ️",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Severity::Success => Tone::Positive,
            Severity::Error => Tone::Negative,
            Severity::Warning => Tone::Caution,
            Severity::Info => Tone::Active,
        }
    }
}

/// 通知横幅
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// 单调递增的序号，用于判断自动消失的计时器是否已过期
    pub id: u64,
    pub severity: Severity,
    pub message: String,
}

/// 任务列表中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: String,
    pub badge: Badge,
    pub platform: &'static str,
    pub mode: &'static str,
    pub target: String,
    pub created: String,
    pub can_stop: bool,
}

impl TaskRow {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: escape_inline(&task.id),
            badge: status_badge(task.status),
            platform: task.platform.label(),
            mode: task.crawler_type.label(),
            target: task.target().map(escape_inline).unwrap_or_else(|| "-".to_string()),
            created: format_timestamp(task.created_at),
            can_stop: task.status.is_stoppable(),
        }
    }
}

/// 下载链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLink {
    pub name: String,
    pub url: String,
}

/// 任务详情弹窗
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetail {
    pub id: String,
    pub status: TaskStatus,
    pub badge: Badge,
    /// 依次展示的（标签, 值）
    pub fields: Vec<(&'static str, String)>,
    pub message: Option<String>,
    /// 仅在任务失败时存在
    pub error: Option<String>,
    pub output_files: Vec<FileLink>,
    pub can_stop: bool,
}

impl TaskDetail {
    pub fn from_task(task: &Task, link: impl Fn(&str) -> String) -> Self {
        let mut fields = vec![
            ("任务ID", escape_inline(&task.id)),
            ("平台", task.platform.label().to_string()),
            ("爬取类型", task.crawler_type.label().to_string()),
        ];
        if let Some(target) = task.target() {
            let label = match task.crawler_type {
                crate::api::types::CrawlerType::Creator => "创作者ID",
                _ => "关键词",
            };
            fields.push((label, escape_inline(target)));
        }
        if let Some(login) = task.login_type {
            fields.push(("登录方式", login.label().to_string()));
        }
        fields.push(("起始页", task.start_page.to_string()));
        fields.push((
            "最大数量",
            task.max_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
        fields.push(("保存方式", task.save_data_option.label().to_string()));
        fields.push(("爬取评论", yes_no(task.get_comment).to_string()));
        fields.push(("爬取二级评论", yes_no(task.get_sub_comment).to_string()));
        fields.push(("创建时间", format_timestamp(task.created_at)));
        if let Some(done) = task.completed_at {
            fields.push(("完成时间", format_timestamp(done)));
        }

        let error = match task.status {
            TaskStatus::Failed => Some(
                task.error_message
                    .as_deref()
                    .map(escape_text)
                    .unwrap_or_else(|| "未知错误".to_string()),
            ),
            _ => None,
        };

        Self {
            id: task.id.clone(),
            status: task.status,
            badge: status_badge(task.status),
            fields,
            message: task.message.as_deref().map(escape_text),
            error,
            output_files: task
                .output_files
                .iter()
                .map(|name| FileLink {
                    name: escape_inline(name),
                    url: link(name),
                })
                .collect(),
            can_stop: task.status.is_stoppable(),
        }
    }
}

/// 文件预览弹窗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub name: String,
    pub file_type: String,
    /// 已转义的内容
    pub body: String,
}

impl PreviewView {
    pub fn new(name: &str, preview: &FilePreview) -> Self {
        let file_type = preview
            .file_type
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| {
                name.rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .unwrap_or_else(|| "text".to_string())
            });
        Self {
            name: escape_inline(name),
            file_type: escape_inline(&file_type),
            body: escape_text(&preview.content),
        }
    }
}

/// 弹窗，同一时刻最多存在一个
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    TaskDetail(TaskDetail),
    Preview(PreviewView),
}

/// 数据文件列表中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub name: String,
    pub kind: FileKind,
    pub size: String,
    pub modified: String,
    pub download_url: String,
}

impl FileRow {
    pub fn from_file(file: &DataFile, download_url: String) -> Self {
        Self {
            name: escape_inline(&file.name),
            kind: FileKind::from_name(&file.name),
            size: format_file_size(file.size),
            modified: format_timestamp(file.modified_time),
            download_url,
        }
    }
}

/// 数据文件列表：为空时显示占位提示而不是空表格
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileListing {
    Empty,
    Rows(Vec<FileRow>),
}

/// 渲染适配层
///
/// 方法均为同步且只读 `&self`，实现者自行处理内部可变性，
/// 以便在轮询任务与交互命令之间共享同一个渲染器。
pub trait Renderer: Send + Sync {
    fn navigate(&self, page: Page);

    fn render_form(&self, form: &CrawlForm);

    /// 提交按钮的忙碌状态
    fn set_submitting(&self, busy: bool);

    fn show_notice(&self, notice: &Notice);

    fn clear_notice(&self);

    /// 整体替换任务列表
    fn render_tasks(&self, rows: &[TaskRow]);

    fn open_modal(&self, modal: &Modal);

    fn close_modal(&self);

    fn render_files(&self, listing: &FileListing);
}
