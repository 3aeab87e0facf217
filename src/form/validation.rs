//! 表单校验。服务端仍会重新校验，这里只负责在提交前拦截明显的错误。

use super::{CrawlerMode, FormField, FormState};
use crate::error::ValidationError;

const REQUIRED_MESSAGE: &str = "此字段为必填项";

/// 提交前校验，按平台 → 爬取类型 → 依赖字段的顺序检查
pub fn validate(state: &FormState) -> Result<(), ValidationError> {
    if state.platform.trim().is_empty() {
        return Err(ValidationError::MissingPlatform);
    }
    if state.crawler_mode.trim().is_empty() {
        return Err(ValidationError::MissingCrawlerType);
    }
    match CrawlerMode::from_selection(&state.crawler_mode) {
        CrawlerMode::Search if state.keywords.trim().is_empty() => {
            Err(ValidationError::MissingKeywords)
        }
        CrawlerMode::Creator if state.creator_id.trim().is_empty() => {
            Err(ValidationError::MissingCreatorId)
        }
        _ => Ok(()),
    }
}

/// 失焦校验：可见的必填字段不能为空
pub fn check_field(field: &FormField) -> Option<&'static str> {
    if field.visible && field.required && field.value.trim().is_empty() {
        Some(REQUIRED_MESSAGE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{CrawlForm, FieldId};

    fn state(platform: &str, mode: &str, keywords: &str, creator_id: &str) -> FormState {
        FormState {
            platform: platform.to_string(),
            crawler_mode: mode.to_string(),
            keywords: keywords.to_string(),
            creator_id: creator_id.to_string(),
        }
    }

    #[test]
    fn test_platform_checked_first() {
        assert_eq!(
            validate(&state("", "", "", "")),
            Err(ValidationError::MissingPlatform)
        );
        assert_eq!(
            validate(&state("xhs", "", "", "")),
            Err(ValidationError::MissingCrawlerType)
        );
    }

    #[test]
    fn test_search_requires_non_blank_keywords() {
        assert_eq!(
            validate(&state("xhs", "search", "   ", "")),
            Err(ValidationError::MissingKeywords)
        );
        assert!(validate(&state("xhs", "search", "露营", "")).is_ok());
    }

    #[test]
    fn test_creator_requires_creator_id() {
        assert_eq!(
            validate(&state("dy", "creator", "ignored", "")),
            Err(ValidationError::MissingCreatorId)
        );
        assert!(validate(&state("dy", "creator", "", "MS4wLjAB")).is_ok());
    }

    #[test]
    fn test_detail_needs_neither_field() {
        assert!(validate(&state("wb", "detail", "", "")).is_ok());
    }

    #[test]
    fn test_blur_only_flags_visible_required_fields() {
        let mut form = CrawlForm::new();
        // 尚未选择模式时关键词处于隐藏状态
        assert_eq!(form.blur(FieldId::Keywords), None);

        form.input(FieldId::CrawlerType, "creator").unwrap();
        assert_eq!(form.blur(FieldId::CreatorId).as_deref(), Some(REQUIRED_MESSAGE));
        assert_eq!(form.blur(FieldId::Cookies), None);
    }

    #[test]
    fn test_submit_failure_focuses_keywords() {
        let mut form = CrawlForm::new();
        form.input(FieldId::Platform, "xhs").unwrap();
        form.input(FieldId::CrawlerType, "search").unwrap();

        let err = form.validate_for_submit().unwrap_err();
        assert_eq!(err, ValidationError::MissingKeywords);
        assert_eq!(form.focused(), Some(FieldId::Keywords));
        assert!(form.field(FieldId::Keywords).unwrap().error.is_some());
    }
}
