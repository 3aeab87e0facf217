//! 爬取任务表单
//!
//! [`CrawlForm`] 是表单的内存模型：每个字段记录当前值、是否可见、是否必填
//! 以及行内错误提示。界面层（终端或测试中的记录器）只负责把它画出来。
//!
//! 字段之间唯一的联动由 [`mode`] 负责：切换爬取类型时，关键词与创作者 ID
//! 两个输入框的显示 / 必填状态随之切换。

pub mod mode;
pub mod validation;

use std::collections::BTreeMap;
use std::fmt;

use crate::api::types::{CrawlerType, LoginType, Platform, SaveDataOption, TaskRequest};
use crate::error::{Result, ValidationError, ViewError};

pub use mode::{CrawlerMode, FieldRule, ModeConfig, apply_mode};
pub use validation::{check_field, validate};

/// 表单字段标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    Platform,
    LoginType,
    CrawlerType,
    Keywords,
    CreatorId,
    StartPage,
    MaxNotesCount,
    GetComments,
    GetSubComments,
    SaveDataOption,
    Cookies,
}

impl FieldId {
    pub const ALL: [FieldId; 11] = [
        FieldId::Platform,
        FieldId::LoginType,
        FieldId::CrawlerType,
        FieldId::Keywords,
        FieldId::CreatorId,
        FieldId::StartPage,
        FieldId::MaxNotesCount,
        FieldId::GetComments,
        FieldId::GetSubComments,
        FieldId::SaveDataOption,
        FieldId::Cookies,
    ];

    /// 提交时使用的表单字段名
    pub fn name(self) -> &'static str {
        match self {
            FieldId::Platform => "platform",
            FieldId::LoginType => "login_type",
            FieldId::CrawlerType => "crawler_type",
            FieldId::Keywords => "keywords",
            FieldId::CreatorId => "creator_id",
            FieldId::StartPage => "start_page",
            FieldId::MaxNotesCount => "max_notes_count",
            FieldId::GetComments => "get_comments",
            FieldId::GetSubComments => "get_sub_comments",
            FieldId::SaveDataOption => "save_data_option",
            FieldId::Cookies => "cookies",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::Platform => "平台",
            FieldId::LoginType => "登录方式",
            FieldId::CrawlerType => "爬取类型",
            FieldId::Keywords => "关键词",
            FieldId::CreatorId => "创作者ID",
            FieldId::StartPage => "起始页",
            FieldId::MaxNotesCount => "最大爬取数量",
            FieldId::GetComments => "爬取评论",
            FieldId::GetSubComments => "爬取二级评论",
            FieldId::SaveDataOption => "保存方式",
            FieldId::Cookies => "Cookies",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::Platform | FieldId::LoginType | FieldId::CrawlerType | FieldId::SaveDataOption => {
                FieldKind::Select
            }
            FieldId::StartPage | FieldId::MaxNotesCount => FieldKind::Number,
            FieldId::GetComments | FieldId::GetSubComments => FieldKind::Checkbox,
            FieldId::Keywords | FieldId::CreatorId | FieldId::Cookies => FieldKind::Text,
        }
    }

    /// 下拉框可选值（`code`, 显示名），非下拉框返回空
    pub fn options(self) -> Vec<(&'static str, &'static str)> {
        match self {
            FieldId::Platform => Platform::ALL.iter().map(|p| (p.code(), p.label())).collect(),
            FieldId::LoginType => LoginType::ALL.iter().map(|t| (t.code(), t.label())).collect(),
            FieldId::CrawlerType => CrawlerType::ALL
                .iter()
                .map(|t| (t.code(), t.label()))
                .collect(),
            FieldId::SaveDataOption => SaveDataOption::ALL
                .iter()
                .map(|o| (o.code(), o.label()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Select,
    Text,
    Number,
    Checkbox,
}

/// 单个表单字段的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub id: FieldId,
    pub value: String,
    pub checked: bool,
    pub visible: bool,
    pub required: bool,
    /// 行内错误提示，下一次输入时清除
    pub error: Option<String>,
}

impl FormField {
    fn new(id: FieldId, value: &str) -> Self {
        Self {
            id,
            value: value.to_string(),
            checked: false,
            visible: true,
            required: false,
            error: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// 用于校验和模式切换的表单快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub platform: String,
    pub crawler_mode: String,
    pub keywords: String,
    pub creator_id: String,
}

/// 爬取任务表单
#[derive(Debug, Clone)]
pub struct CrawlForm {
    fields: BTreeMap<FieldId, FormField>,
    focused: Option<FieldId>,
}

impl Default for CrawlForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlForm {
    /// 完整表单，默认值与后端 `/start_task` 的缺省值一致；平台和爬取类型需要用户选择
    pub fn new() -> Self {
        let fields = vec![
            FormField::new(FieldId::Platform, "").required(),
            FormField::new(FieldId::LoginType, LoginType::Qrcode.code()),
            FormField::new(FieldId::CrawlerType, "").required(),
            FormField::new(FieldId::Keywords, "").hidden(),
            FormField::new(FieldId::CreatorId, "").hidden(),
            FormField::new(FieldId::StartPage, "1"),
            FormField::new(FieldId::MaxNotesCount, "20"),
            FormField::new(FieldId::GetComments, ""),
            FormField::new(FieldId::GetSubComments, ""),
            FormField::new(FieldId::SaveDataOption, SaveDataOption::Json.code()),
            FormField::new(FieldId::Cookies, ""),
        ];
        Self::from_fields(fields)
    }

    fn from_fields(fields: Vec<FormField>) -> Self {
        Self {
            fields: fields.into_iter().map(|f| (f.id, f)).collect(),
            focused: None,
        }
    }

    /// 移除一个字段（模拟页面模板缺失某个元素）
    pub fn remove_field(&mut self, id: FieldId) -> Option<FormField> {
        self.fields.remove(&id)
    }

    pub fn has(&self, id: FieldId) -> bool {
        self.fields.contains_key(&id)
    }

    pub fn field(&self, id: FieldId) -> Option<&FormField> {
        self.fields.get(&id)
    }

    pub(crate) fn field_mut(&mut self, id: FieldId) -> Option<&mut FormField> {
        self.fields.get_mut(&id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.values()
    }

    /// 字段当前值，缺失的字段视为空
    pub fn value(&self, id: FieldId) -> &str {
        self.fields.get(&id).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn is_checked(&self, id: FieldId) -> bool {
        self.fields.get(&id).is_some_and(|f| f.checked)
    }

    pub fn focused(&self) -> Option<FieldId> {
        self.focused
    }

    pub fn focus(&mut self, id: FieldId) {
        if self.has(id) {
            self.focused = Some(id);
        }
    }

    /// 输入事件：写入新值并清除该字段的行内错误。
    ///
    /// 修改爬取类型时会立即执行模式联动。
    pub fn input(&mut self, id: FieldId, value: &str) -> Result<()> {
        let field = self
            .fields
            .get_mut(&id)
            .ok_or(ViewError::MissingElement(id))?;

        if !field.visible {
            return Err(ViewError::UnsupportedInput { field: id, action: "set" }.into());
        }

        match id.kind() {
            FieldKind::Checkbox => {
                return Err(ViewError::UnsupportedInput { field: id, action: "set" }.into());
            }
            FieldKind::Select if !value.is_empty() => {
                if !id.options().iter().any(|(code, _)| *code == value) {
                    return Err(ViewError::InvalidOption {
                        field: id,
                        value: value.to_string(),
                    }
                    .into());
                }
            }
            _ => {}
        }

        field.value = value.to_string();
        field.error = None;

        if id == FieldId::CrawlerType {
            apply_mode(self)?;
        }
        Ok(())
    }

    /// 切换复选框，返回切换后的状态
    pub fn toggle(&mut self, id: FieldId) -> Result<bool> {
        let field = self
            .fields
            .get_mut(&id)
            .ok_or(ViewError::MissingElement(id))?;
        if id.kind() != FieldKind::Checkbox {
            return Err(ViewError::UnsupportedInput { field: id, action: "toggle" }.into());
        }
        field.checked = !field.checked;
        Ok(field.checked)
    }

    /// 失焦事件：必填字段为空时写入行内错误
    pub fn blur(&mut self, id: FieldId) -> Option<String> {
        let field = self.fields.get_mut(&id)?;
        field.error = check_field(field).map(str::to_string);
        field.error.clone()
    }

    pub fn state(&self) -> FormState {
        FormState {
            platform: self.value(FieldId::Platform).to_string(),
            crawler_mode: self.value(FieldId::CrawlerType).to_string(),
            keywords: self.value(FieldId::Keywords).to_string(),
            creator_id: self.value(FieldId::CreatorId).to_string(),
        }
    }

    /// 提交前校验：失败时聚焦出错字段并给出行内提示
    pub fn validate_for_submit(&mut self) -> std::result::Result<TaskRequest, ValidationError> {
        let outcome = validate(&self.state()).and_then(|_| self.to_request());
        if let Err(e) = &outcome {
            let id = e.field();
            self.focus(id);
            if let Some(field) = self.fields.get_mut(&id) {
                field.error = Some(e.to_string());
            }
        }
        outcome
    }

    fn to_request(&self) -> std::result::Result<TaskRequest, ValidationError> {
        Ok(TaskRequest {
            platform: self.value(FieldId::Platform).to_string(),
            login_type: self.value(FieldId::LoginType).to_string(),
            crawler_type: self.value(FieldId::CrawlerType).to_string(),
            keywords: self.submitted_text(FieldId::Keywords),
            creator_id: self.submitted_text(FieldId::CreatorId),
            start_page: self.number(FieldId::StartPage, 1)?,
            max_notes_count: self.number(FieldId::MaxNotesCount, 20)?,
            get_comments: self.is_checked(FieldId::GetComments),
            get_sub_comments: self.is_checked(FieldId::GetSubComments),
            save_data_option: self.value(FieldId::SaveDataOption).to_string(),
            cookies: self.value(FieldId::Cookies).to_string(),
        })
    }

    /// 隐藏字段一律按空值提交
    fn submitted_text(&self, id: FieldId) -> String {
        match self.fields.get(&id) {
            Some(field) if field.visible => field.value.trim().to_string(),
            _ => String::new(),
        }
    }

    fn number(&self, id: FieldId, default: u32) -> std::result::Result<u32, ValidationError> {
        let raw = self.value(id).trim();
        if raw.is_empty() {
            return Ok(default);
        }
        match raw.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ValidationError::InvalidNumber {
                field: id,
                value: raw.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    #[test]
    fn test_new_form_hides_dependent_fields() {
        let form = CrawlForm::new();
        assert!(!form.field(FieldId::Keywords).unwrap().visible);
        assert!(!form.field(FieldId::CreatorId).unwrap().visible);
        assert_eq!(form.value(FieldId::StartPage), "1");
        assert_eq!(form.value(FieldId::SaveDataOption), "json");
    }

    #[test]
    fn test_input_clears_inline_error() {
        let mut form = CrawlForm::new();
        form.input(FieldId::CrawlerType, "search").unwrap();
        assert!(form.blur(FieldId::Keywords).is_some());

        form.input(FieldId::Keywords, "咖啡").unwrap();
        assert_eq!(form.field(FieldId::Keywords).unwrap().error, None);
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let mut form = CrawlForm::new();
        let err = form.input(FieldId::Platform, "myspace").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::View(ViewError::InvalidOption { field: FieldId::Platform, .. })
        ));
        assert_eq!(form.value(FieldId::Platform), "");
    }

    #[test]
    fn test_toggle_only_applies_to_checkboxes() {
        let mut form = CrawlForm::new();
        assert!(form.toggle(FieldId::GetComments).unwrap());
        assert!(!form.toggle(FieldId::GetComments).unwrap());
        assert!(form.toggle(FieldId::Keywords).is_err());
        assert!(form.input(FieldId::GetComments, "on").is_err());
    }

    #[test]
    fn test_validate_for_submit_builds_request() {
        let mut form = CrawlForm::new();
        form.input(FieldId::Platform, "bili").unwrap();
        form.input(FieldId::CrawlerType, "search").unwrap();
        form.input(FieldId::Keywords, "  rust  ").unwrap();
        form.input(FieldId::MaxNotesCount, "50").unwrap();
        form.toggle(FieldId::GetSubComments).unwrap();

        let request = form.validate_for_submit().unwrap();
        assert_eq!(request.platform, "bili");
        assert_eq!(request.keywords, "rust");
        assert_eq!(request.max_notes_count, 50);
        assert!(request.get_sub_comments);
        assert!(!request.get_comments);
    }

    #[test]
    fn test_hidden_field_is_never_submitted() {
        let mut form = CrawlForm::new();
        form.input(FieldId::Platform, "xhs").unwrap();
        form.input(FieldId::CrawlerType, "detail").unwrap();

        let err = form.input(FieldId::Keywords, "stale").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::View(ViewError::UnsupportedInput { field: FieldId::Keywords, .. })
        ));

        // 绕过输入事件直接写入的值也不会被提交
        form.field_mut(FieldId::CreatorId).unwrap().value = "stale".to_string();
        let request = form.validate_for_submit().unwrap();
        assert_eq!(request.keywords, "");
        assert_eq!(request.creator_id, "");
    }

    #[test]
    fn test_invalid_number_focuses_field() {
        let mut form = CrawlForm::new();
        form.input(FieldId::Platform, "xhs").unwrap();
        form.input(FieldId::CrawlerType, "detail").unwrap();
        form.input(FieldId::StartPage, "zero").unwrap();

        let err = form.validate_for_submit().unwrap_err();
        assert_eq!(err.field(), FieldId::StartPage);
        assert_eq!(form.focused(), Some(FieldId::StartPage));
    }
}
