//! 后端 API 的数据结构

use serde::{Deserialize, Serialize};
use tracing::warn;

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// 等待中
    Pending,
    /// 运行中
    Running,
    /// 已完成
    Completed,
    /// 失败
    Failed,
    /// 已停止
    Stopped,
}

impl TaskStatus {
    /// 只有运行中的任务可以被停止
    pub fn is_stoppable(self) -> bool {
        matches!(self, TaskStatus::Running)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Stopped
        )
    }
}

/// 支持的平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Xhs,
    Dy,
    Ks,
    Bili,
    Wb,
    Tieba,
    Zhihu,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Xhs,
        Platform::Dy,
        Platform::Ks,
        Platform::Bili,
        Platform::Wb,
        Platform::Tieba,
        Platform::Zhihu,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Platform::Xhs => "xhs",
            Platform::Dy => "dy",
            Platform::Ks => "ks",
            Platform::Bili => "bili",
            Platform::Wb => "wb",
            Platform::Tieba => "tieba",
            Platform::Zhihu => "zhihu",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Xhs => "小红书",
            Platform::Dy => "抖音",
            Platform::Ks => "快手",
            Platform::Bili => "哔哩哔哩",
            Platform::Wb => "微博",
            Platform::Tieba => "百度贴吧",
            Platform::Zhihu => "知乎",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

/// 爬取类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlerType {
    /// 关键词搜索
    Search,
    /// 帖子详情
    Detail,
    /// 创作者主页
    Creator,
}

impl CrawlerType {
    pub const ALL: [CrawlerType; 3] = [CrawlerType::Search, CrawlerType::Detail, CrawlerType::Creator];

    pub fn code(self) -> &'static str {
        match self {
            CrawlerType::Search => "search",
            CrawlerType::Detail => "detail",
            CrawlerType::Creator => "creator",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CrawlerType::Search => "关键词搜索",
            CrawlerType::Detail => "帖子详情",
            CrawlerType::Creator => "创作者主页",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// 登录方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    Qrcode,
    Phone,
    Cookie,
}

impl LoginType {
    pub const ALL: [LoginType; 3] = [LoginType::Qrcode, LoginType::Phone, LoginType::Cookie];

    pub fn code(self) -> &'static str {
        match self {
            LoginType::Qrcode => "qrcode",
            LoginType::Phone => "phone",
            LoginType::Cookie => "cookie",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoginType::Qrcode => "二维码登录",
            LoginType::Phone => "手机号登录",
            LoginType::Cookie => "Cookie登录",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// 数据保存方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveDataOption {
    Json,
    Csv,
    Sqlite,
    Db,
}

impl SaveDataOption {
    pub const ALL: [SaveDataOption; 4] = [
        SaveDataOption::Json,
        SaveDataOption::Csv,
        SaveDataOption::Sqlite,
        SaveDataOption::Db,
    ];

    pub fn code(self) -> &'static str {
        match self {
            SaveDataOption::Json => "json",
            SaveDataOption::Csv => "csv",
            SaveDataOption::Sqlite => "sqlite",
            SaveDataOption::Db => "db",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SaveDataOption::Json => "JSON文件",
            SaveDataOption::Csv => "CSV文件",
            SaveDataOption::Sqlite => "SQLite数据库",
            SaveDataOption::Db => "MySQL数据库",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.code() == code)
    }
}

/// 后端维护的爬取任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    pub platform: Platform,
    pub crawler_type: CrawlerType,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
    /// 创建时间（Unix 秒，可带小数）
    pub created_at: f64,
    #[serde(default)]
    pub completed_at: Option<f64>,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    #[serde(default)]
    pub max_count: Option<u32>,
    pub save_data_option: SaveDataOption,
    #[serde(default)]
    pub get_comment: bool,
    #[serde(default)]
    pub get_sub_comment: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub output_files: Vec<String>,
    /// 后端给出的进度说明
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub login_type: Option<LoginType>,
}

fn default_start_page() -> u32 {
    1
}

impl Task {
    /// 任务的爬取目标：搜索模式为关键词，创作者模式为用户 ID
    pub fn target(&self) -> Option<&str> {
        let target = match self.crawler_type {
            CrawlerType::Search => self.keywords.as_deref(),
            CrawlerType::Creator => self.creator_id.as_deref(),
            CrawlerType::Detail => None,
        };
        target.filter(|t| !t.trim().is_empty())
    }
}

/// 数据目录中的输出文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFile {
    pub name: String,
    /// 字节数
    pub size: u64,
    /// 修改时间（Unix 秒）
    pub modified_time: f64,
}

/// 文件预览内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePreview {
    pub content: String,
    #[serde(default)]
    pub file_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartTaskPayload {
    pub task_id: String,
}

/// 任务列表逐条解码，单条任务格式不符不影响其余任务
#[derive(Debug, Deserialize)]
pub(crate) struct TaskListPayload {
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
}

impl TaskListPayload {
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
            .into_iter()
            .filter_map(|raw| {
                let id = raw.get("id").and_then(serde_json::Value::as_str).map(str::to_string);
                match serde_json::from_value::<Task>(raw) {
                    Ok(task) => Some(task),
                    Err(e) => {
                        warn!(task_id = ?id, error = %e, "Skipping undecodable task");
                        None
                    }
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskPayload {
    pub task: Task,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileListPayload {
    #[serde(default)]
    pub files: Vec<DataFile>,
}

/// 只关心 `message` 的确认类响应
#[derive(Debug, Deserialize)]
pub(crate) struct AckPayload {
    #[serde(default)]
    pub message: Option<String>,
}

/// 提交到 `/start_task` 的表单内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub platform: String,
    pub login_type: String,
    pub crawler_type: String,
    pub keywords: String,
    pub creator_id: String,
    pub start_page: u32,
    pub max_notes_count: u32,
    pub get_comments: bool,
    pub get_sub_comments: bool,
    pub save_data_option: String,
    pub cookies: String,
}

impl TaskRequest {
    /// `application/x-www-form-urlencoded` 字段，未勾选的复选框不提交
    pub fn form_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("platform", self.platform.clone()),
            ("login_type", self.login_type.clone()),
            ("crawler_type", self.crawler_type.clone()),
            ("keywords", self.keywords.clone()),
            ("creator_id", self.creator_id.clone()),
            ("start_page", self.start_page.to_string()),
            ("max_notes_count", self.max_notes_count.to_string()),
            ("save_data_option", self.save_data_option.clone()),
            ("cookies", self.cookies.clone()),
        ];
        if self.get_comments {
            pairs.push(("get_comments", "on".to_string()));
        }
        if self.get_sub_comments {
            pairs.push(("get_sub_comments", "on".to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_deserializes_with_optional_fields_missing() {
        let task: Task = serde_json::from_value(json!({
            "id": "t-1",
            "status": "running",
            "platform": "xhs",
            "crawler_type": "search",
            "keywords": "咖啡",
            "created_at": 1700000000.25,
            "save_data_option": "json"
        }))
        .unwrap();

        assert_eq!(task.status, TaskStatus::Running);
        assert_eq!(task.start_page, 1);
        assert!(task.output_files.is_empty());
        assert_eq!(task.target(), Some("咖啡"));
        assert!(task.status.is_stoppable());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: std::result::Result<Task, _> = serde_json::from_value(json!({
            "id": "t-1",
            "status": "paused",
            "platform": "xhs",
            "crawler_type": "search",
            "created_at": 0,
            "save_data_option": "json"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_form_pairs_omit_unchecked_boxes() {
        let request = TaskRequest {
            platform: "dy".to_string(),
            login_type: "qrcode".to_string(),
            crawler_type: "creator".to_string(),
            keywords: String::new(),
            creator_id: "u42".to_string(),
            start_page: 1,
            max_notes_count: 20,
            get_comments: true,
            get_sub_comments: false,
            save_data_option: "csv".to_string(),
            cookies: String::new(),
        };
        let pairs = request.form_pairs();
        assert!(pairs.contains(&("get_comments", "on".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "get_sub_comments"));
        assert!(pairs.contains(&("creator_id", "u42".to_string())));
    }

    #[test]
    fn test_option_codes_round_trip_through_lookup() {
        for platform in Platform::ALL {
            assert_eq!(Platform::from_code(platform.code()), Some(platform));
        }
        assert_eq!(CrawlerType::from_code("detail"), Some(CrawlerType::Detail));
        assert_eq!(SaveDataOption::from_code("parquet"), None);
    }
}
