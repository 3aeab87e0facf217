use std::fmt;

use crate::form::FieldId;

/// 控制台的统一错误类型
#[derive(Debug)]
pub enum DashboardError {
    /// 后端 API 相关错误
    Api(ApiError),
    /// 表单校验失败
    Validation(ValidationError),
    /// 视图 / 表单元素错误
    View(ViewError),
    /// 配置错误
    Config(ConfigError),
    /// IO 错误
    Io(std::io::Error),
    /// 其他错误
    Other(String),
}

/// 后端 API 相关错误
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败（连接失败、连接被重置等）
    Network(String),
    /// 请求超时
    Timeout,
    /// 后端返回 `success: false`（或未返回 `success: true`）
    Rejected(String),
    /// 非 2xx 状态码且响应体不是约定的 JSON
    Http { status: u16, message: String },
    /// 响应格式无效
    InvalidResponse(String),
}

/// 表单校验错误，每个变体都对应一个需要聚焦的字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 未选择平台
    MissingPlatform,
    /// 未选择爬取类型
    MissingCrawlerType,
    /// 搜索模式下关键词为空
    MissingKeywords,
    /// 创作者模式下用户 ID 为空
    MissingCreatorId,
    /// 数值字段无法解析
    InvalidNumber { field: FieldId, value: String },
}

/// 视图错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// 表单模型中缺少预期的字段
    MissingElement(FieldId),
    /// 字段存在但不接受该操作（例如对文本框执行 toggle）
    UnsupportedInput { field: FieldId, action: &'static str },
    /// 下拉框不包含该选项
    InvalidOption { field: FieldId, value: String },
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),
    /// 配置解析失败
    ParseFailed(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// 校验失败时应获得焦点的字段
    pub fn field(&self) -> FieldId {
        match self {
            ValidationError::MissingPlatform => FieldId::Platform,
            ValidationError::MissingCrawlerType => FieldId::CrawlerType,
            ValidationError::MissingKeywords => FieldId::Keywords,
            ValidationError::MissingCreatorId => FieldId::CreatorId,
            ValidationError::InvalidNumber { field, .. } => *field,
        }
    }
}

impl DashboardError {
    /// 适合直接展示在通知横幅上的文本
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Api(ApiError::Rejected(message)) => message.clone(),
            DashboardError::Api(ApiError::Network(_)) | DashboardError::Api(ApiError::Timeout) => {
                "网络错误，请检查连接后重试".to_string()
            }
            DashboardError::Api(ApiError::Http { message, .. }) => message.clone(),
            DashboardError::Api(ApiError::InvalidResponse(_)) => "服务器响应格式错误".to_string(),
            DashboardError::Validation(e) => e.to_string(),
            other => other.to_string(),
        }
    }

    /// 是否为传输层错误（网络不通或超时）
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DashboardError::Api(ApiError::Network(_)) | DashboardError::Api(ApiError::Timeout)
        )
    }
}

// 实现 Display trait
impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Api(e) => write!(f, "API Error: {}", e),
            DashboardError::Validation(e) => write!(f, "{}", e),
            DashboardError::View(e) => write!(f, "View Error: {}", e),
            DashboardError::Config(e) => write!(f, "Config Error: {}", e),
            DashboardError::Io(e) => write!(f, "IO Error: {}", e),
            DashboardError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Timeout => write!(f, "Request timeout"),
            ApiError::Rejected(msg) => write!(f, "Rejected by server: {}", msg),
            ApiError::Http { status, message } => {
                write!(f, "HTTP error (status {}): {}", status, message)
            }
            ApiError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingPlatform => write!(f, "请选择平台"),
            ValidationError::MissingCrawlerType => write!(f, "请选择爬取类型"),
            ValidationError::MissingKeywords => write!(f, "搜索模式下必须输入关键词！"),
            ValidationError::MissingCreatorId => write!(f, "创作者模式下必须输入用户ID！"),
            ValidationError::InvalidNumber { field, value } => {
                write!(f, "{} 必须是正整数，当前值: '{}'", field.label(), value)
            }
        }
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::MissingElement(field) => write!(f, "Missing form element: {}", field),
            ViewError::UnsupportedInput { field, action } => {
                write!(f, "Field '{}' does not support '{}'", field, action)
            }
            ViewError::InvalidOption { field, value } => {
                write!(f, "'{}' is not a valid option for '{}'", value, field)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
        }
    }
}

// 实现 std::error::Error trait
impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ApiError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for ViewError {}
impl std::error::Error for ConfigError {}

// From 转换实现
impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::Io(err)
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DashboardError::Api(ApiError::Timeout)
        } else if err.is_connect() {
            DashboardError::Api(ApiError::Network(format!("Connection failed: {}", err)))
        } else if err.is_decode() {
            DashboardError::Api(ApiError::InvalidResponse(err.to_string()))
        } else {
            DashboardError::Api(ApiError::Network(err.to_string()))
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Api(ApiError::InvalidResponse(err.to_string()))
    }
}

impl From<serde_yaml::Error> for DashboardError {
    fn from(err: serde_yaml::Error) -> Self {
        DashboardError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<ApiError> for DashboardError {
    fn from(err: ApiError) -> Self {
        DashboardError::Api(err)
    }
}

impl From<ValidationError> for DashboardError {
    fn from(err: ValidationError) -> Self {
        DashboardError::Validation(err)
    }
}

impl From<ViewError> for DashboardError {
    fn from(err: ViewError) -> Self {
        DashboardError::View(err)
    }
}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        DashboardError::Config(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err: DashboardError = ApiError::Rejected("任务未在运行中".to_string()).into();
        assert_eq!(err.user_message(), "任务未在运行中");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_errors_use_generic_text() {
        let timeout: DashboardError = ApiError::Timeout.into();
        let network: DashboardError = ApiError::Network("reset".to_string()).into();
        assert_eq!(timeout.user_message(), network.user_message());
        assert!(timeout.is_transport());
        assert!(network.is_transport());
    }

    #[test]
    fn test_validation_error_focus_field() {
        assert_eq!(ValidationError::MissingKeywords.field(), FieldId::Keywords);
        assert_eq!(ValidationError::MissingCreatorId.field(), FieldId::CreatorId);
        assert_eq!(ValidationError::MissingPlatform.field(), FieldId::Platform);
    }
}
