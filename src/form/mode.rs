//! 爬取类型联动
//!
//! 关键词与创作者 ID 同一时刻最多只有一个是必填项，完全由爬取类型决定：
//!
//! | 爬取类型 | 关键词 | 创作者 ID |
//! |----------|--------|-----------|
//! | search   | 显示 + 必填 | 隐藏 + 清空 |
//! | creator  | 隐藏 + 清空 | 显示 + 必填 |
//! | 其他     | 隐藏 + 清空 | 隐藏 + 清空 |

use tracing::{debug, warn};

use super::{CrawlForm, FieldId};
use crate::api::types::CrawlerType;
use crate::error::{Result, ViewError};

/// 决定依赖字段配置的三种模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlerMode {
    Search,
    Creator,
    /// 帖子详情或尚未选择
    Other,
}

impl CrawlerMode {
    pub fn from_selection(value: &str) -> Self {
        match CrawlerType::from_code(value.trim()) {
            Some(CrawlerType::Search) => CrawlerMode::Search,
            Some(CrawlerType::Creator) => CrawlerMode::Creator,
            Some(CrawlerType::Detail) | None => CrawlerMode::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub visible: bool,
    pub required: bool,
}

impl FieldRule {
    const SHOWN: FieldRule = FieldRule {
        visible: true,
        required: true,
    };
    const HIDDEN: FieldRule = FieldRule {
        visible: false,
        required: false,
    };
}

/// 某一模式下两个依赖字段的目标配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    pub keywords: FieldRule,
    pub creator_id: FieldRule,
}

impl ModeConfig {
    pub fn for_mode(mode: CrawlerMode) -> Self {
        match mode {
            CrawlerMode::Search => ModeConfig {
                keywords: FieldRule::SHOWN,
                creator_id: FieldRule::HIDDEN,
            },
            CrawlerMode::Creator => ModeConfig {
                keywords: FieldRule::HIDDEN,
                creator_id: FieldRule::SHOWN,
            },
            CrawlerMode::Other => ModeConfig {
                keywords: FieldRule::HIDDEN,
                creator_id: FieldRule::HIDDEN,
            },
        }
    }
}

/// 按当前爬取类型更新依赖字段。
///
/// 两个字段必须同时存在才会修改，缺少任意一个时不做任何改动。
pub fn apply_mode(form: &mut CrawlForm) -> Result<CrawlerMode> {
    let mode = CrawlerMode::from_selection(form.value(FieldId::CrawlerType));

    for id in [FieldId::Keywords, FieldId::CreatorId] {
        if !form.has(id) {
            warn!(field = %id, ?mode, "Form element missing, mode switch aborted");
            return Err(ViewError::MissingElement(id).into());
        }
    }

    let config = ModeConfig::for_mode(mode);
    for (id, rule) in [
        (FieldId::Keywords, config.keywords),
        (FieldId::CreatorId, config.creator_id),
    ] {
        if let Some(field) = form.field_mut(id) {
            field.visible = rule.visible;
            field.required = rule.required;
            if !rule.visible {
                field.value.clear();
                field.error = None;
            }
        }
    }

    debug!(?mode, "Crawler mode applied");
    Ok(mode)
}
