//! 测试基础设施
//!
//! 提供在不依赖真实后端和终端的情况下测试控制台各组件的工具集。
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockDashboardApi`] | 替代真实后端，按接口排队预设响应 |
//! | [`RecordingRenderer`] | 记录所有渲染调用，断言横幅、弹窗、列表 |
//! | [`FixedConfirmer`] | 总是给出同一个确认答案 |
//!
//! 所有 Mock 完全在内存中运行，内部使用 `Mutex`，可以在轮询任务与测试之间共享。

mod mock_api;
mod recording;

pub use mock_api::{ApiCall, MockDashboardApi};
pub use recording::RecordingRenderer;

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::types::{CrawlerType, Platform, SaveDataOption, Task, TaskStatus};
use crate::confirm::Confirmer;
use crate::error::Result;

/// 总是返回固定答案的确认器，并记录收到的提示
pub struct FixedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl FixedConfirmer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.answer)
    }
}

/// 小红书搜索任务样例
pub fn sample_task(id: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        status,
        platform: Platform::Xhs,
        crawler_type: CrawlerType::Search,
        keywords: Some("露营".to_string()),
        creator_id: None,
        created_at: 1_700_000_000.0,
        completed_at: status.is_terminal().then_some(1_700_000_600.0),
        start_page: 1,
        max_count: Some(20),
        save_data_option: SaveDataOption::Json,
        get_comment: false,
        get_sub_comment: false,
        error_message: (status == TaskStatus::Failed).then(|| "登录失败".to_string()),
        output_files: Vec::new(),
        message: None,
        login_type: None,
    }
}
