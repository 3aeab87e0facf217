//! 控制台页面编排
//!
//! 持有表单、提交流程、任务监控和文件浏览器，负责页面切换时的资源收放：
//! 离开任务列表页会停止轮询，离开任何页面都会关闭弹窗。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

use crate::api::DashboardApi;
use crate::config::DashboardConfig;
use crate::confirm::Confirmer;
use crate::error::{DashboardError, Result};
use crate::files::DataFileBrowser;
use crate::form::{CrawlForm, FieldId, apply_mode};
use crate::monitor::{StopOutcome, TaskMonitor};
use crate::notify::Notifier;
use crate::submission::{SubmissionFlow, SubmitOutcome};
use crate::view::{Page, Renderer};

pub struct Dashboard {
    renderer: Arc<dyn Renderer>,
    notifier: Notifier,
    form: CrawlForm,
    submission: SubmissionFlow,
    monitor: TaskMonitor,
    files: DataFileBrowser,
    page: Option<Page>,
}

impl Dashboard {
    /// 返回控制台和导航通道的接收端，延迟跳转会从该通道送达
    pub fn new(
        config: &DashboardConfig,
        api: Arc<dyn DashboardApi>,
        renderer: Arc<dyn Renderer>,
        confirmer: Arc<dyn Confirmer>,
    ) -> (Self, UnboundedReceiver<Page>) {
        let (nav_tx, nav_rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new(Arc::clone(&renderer), config.notice_ttl());

        let submission = SubmissionFlow::new(
            Arc::clone(&api),
            Arc::clone(&renderer),
            notifier.clone(),
            nav_tx,
        )
        .redirect_delay(config.redirect_delay())
        .request_timeout(config.request_timeout());

        let monitor = TaskMonitor::new(
            Arc::clone(&api),
            Arc::clone(&renderer),
            notifier.clone(),
            confirmer,
        )
        .interval(config.poll_interval());

        let files = DataFileBrowser::new(api, Arc::clone(&renderer), notifier.clone());

        let dashboard = Self {
            renderer,
            notifier,
            form: CrawlForm::new(),
            submission,
            monitor,
            files,
            page: None,
        };
        (dashboard, nav_rx)
    }

    pub fn page(&self) -> Option<Page> {
        self.page
    }

    pub fn form(&self) -> &CrawlForm {
        &self.form
    }

    pub fn is_polling(&self) -> bool {
        self.monitor.is_polling()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// 切换页面：先释放当前页面的资源，再初始化新页面
    pub async fn enter(&mut self, page: Page) -> Result<()> {
        self.leave();
        info!(page = ?page, "Entering page");
        self.page = Some(page);
        self.renderer.navigate(page);

        match page {
            Page::Home => {
                // 缺少联动字段时降级为静态表单，警告已在 apply_mode 中记录
                let _ = apply_mode(&mut self.form);
                self.renderer.render_form(&self.form);
                Ok(())
            }
            Page::Tasks => {
                self.monitor.start();
                Ok(())
            }
            Page::Data => self.files.load().await,
        }
    }

    fn leave(&mut self) {
        if let Some(page) = self.page {
            debug!(page = ?page, "Leaving page");
        }
        self.monitor.stop();
        self.close_modal();
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        let id = field_id(name)?;
        self.form.input(id, value)?;
        self.renderer.render_form(&self.form);
        Ok(())
    }

    /// 失焦校验，返回该字段的行内错误
    pub fn check_field(&mut self, name: &str) -> Result<Option<String>> {
        let id = field_id(name)?;
        let error = self.form.blur(id);
        self.renderer.render_form(&self.form);
        Ok(error)
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<()> {
        self.form.input(FieldId::CrawlerType, mode)?;
        self.renderer.render_form(&self.form);
        Ok(())
    }

    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        let checked = self.form.toggle(field_id(name)?)?;
        self.renderer.render_form(&self.form);
        Ok(checked)
    }

    pub fn show_form(&self) {
        self.renderer.render_form(&self.form);
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        self.submission.submit(&mut self.form).await
    }

    pub async fn refresh_tasks(&self) -> Result<()> {
        self.monitor.refresh().await
    }

    pub async fn show_detail(&mut self, id: &str) -> Result<()> {
        self.files.close_preview();
        self.monitor.show_detail(id).await
    }

    pub async fn stop_task(&mut self, id: &str) -> Result<StopOutcome> {
        self.monitor.stop_task(id).await
    }

    pub async fn preview(&mut self, name: &str) -> Result<()> {
        self.monitor.close_detail();
        self.files.preview(name).await
    }

    pub async fn download(&self, name: &str, dir: &Path) -> Result<PathBuf> {
        self.files.download_to(name, dir).await
    }

    pub fn download_link(&self, name: &str) -> String {
        self.files.download_link(name)
    }

    pub fn close_modal(&mut self) {
        self.monitor.close_detail();
        self.files.close_preview();
    }

    /// 把命令层面的错误显示为通知；后端错误已由各控制器通知过，不再重复
    pub fn report(&self, err: &DashboardError) {
        if !matches!(err, DashboardError::Api(_)) {
            self.notifier.error(err.to_string());
        }
    }

    /// 退出前释放所有计时器
    pub fn shutdown(&mut self) {
        self.monitor.stop();
        self.submission.cancel_redirect();
        self.notifier.dismiss();
        info!("Dashboard shut down");
    }
}

fn field_id(name: &str) -> Result<FieldId> {
    FieldId::from_name(name).ok_or_else(|| DashboardError::Other(format!("未知字段: {}", name)))
}
