//! 任务提交流程
//!
//! 两个状态：`Idle` 与 `Submitting`。校验失败不会离开 `Idle`，也不会发起请求；
//! 请求无论成功、失败还是超时，结束后都会回到 `Idle`。
//! 成功后的页面跳转由独立的计时器负责，与回到 `Idle` 互不影响。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::DashboardApi;
use crate::error::{ApiError, DashboardError, ValidationError};
use crate::form::CrawlForm;
use crate::notify::Notifier;
use crate::view::{Page, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
}

/// 一次提交的结果
#[derive(Debug)]
pub enum SubmitOutcome {
    /// 客户端校验未通过，没有发起请求
    Invalid(ValidationError),
    /// 后端已接受，跳转已排期
    Submitted { task_id: String },
    /// 后端拒绝或网络失败
    Failed(DashboardError),
}

pub struct SubmissionFlow {
    api: Arc<dyn DashboardApi>,
    renderer: Arc<dyn Renderer>,
    notifier: Notifier,
    navigator: UnboundedSender<Page>,
    redirect_delay: Duration,
    request_timeout: Duration,
    state: SubmitState,
    last_task_id: Option<String>,
    redirect: Option<JoinHandle<()>>,
}

impl SubmissionFlow {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        renderer: Arc<dyn Renderer>,
        notifier: Notifier,
        navigator: UnboundedSender<Page>,
    ) -> Self {
        Self {
            api,
            renderer,
            notifier,
            navigator,
            redirect_delay: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
            state: SubmitState::Idle,
            last_task_id: None,
            redirect: None,
        }
    }

    pub fn redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// 最近一次成功提交得到的任务 ID
    pub fn last_task_id(&self) -> Option<&str> {
        self.last_task_id.as_deref()
    }

    pub async fn submit(&mut self, form: &mut CrawlForm) -> SubmitOutcome {
        let request = match form.validate_for_submit() {
            Ok(request) => request,
            Err(e) => {
                self.notifier.warning(e.to_string());
                self.renderer.render_form(form);
                return SubmitOutcome::Invalid(e);
            }
        };

        self.transition(SubmitState::Submitting);
        let result = match tokio::time::timeout(self.request_timeout, self.api.start_task(&request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout.into()),
        };

        let outcome = match result {
            Ok(task_id) => {
                info!(task_id = %task_id, platform = %request.platform, "🚀 Task submitted");
                self.notifier
                    .success(format!("任务已启动！任务ID: {}", task_id));
                self.last_task_id = Some(task_id.clone());
                self.schedule_redirect();
                SubmitOutcome::Submitted { task_id }
            }
            Err(e) => {
                warn!(error = %e, "Task submission failed");
                self.notifier.error(e.user_message());
                SubmitOutcome::Failed(e)
            }
        };

        self.transition(SubmitState::Idle);
        outcome
    }

    /// 取消尚未触发的跳转
    pub fn cancel_redirect(&mut self) {
        if let Some(timer) = self.redirect.take() {
            timer.abort();
        }
    }

    fn transition(&mut self, next: SubmitState) {
        self.state = next;
        self.renderer.set_submitting(next == SubmitState::Submitting);
    }

    fn schedule_redirect(&mut self) {
        self.cancel_redirect();
        let navigator = self.navigator.clone();
        let delay = self.redirect_delay;
        self.redirect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = navigator.send(Page::Tasks);
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldId;
    use crate::testing::{ApiCall, MockDashboardApi, RecordingRenderer};
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::Instant;

    struct Harness {
        flow: SubmissionFlow,
        api: Arc<MockDashboardApi>,
        renderer: Arc<RecordingRenderer>,
        nav: mpsc::UnboundedReceiver<Page>,
    }

    fn harness(api: MockDashboardApi) -> Harness {
        let api = Arc::new(api);
        let renderer = Arc::new(RecordingRenderer::new());
        let notifier = Notifier::new(renderer.clone(), Duration::from_secs(3));
        let (tx, nav) = mpsc::unbounded_channel();
        let flow = SubmissionFlow::new(api.clone(), renderer.clone(), notifier, tx);
        Harness {
            flow,
            api,
            renderer,
            nav,
        }
    }

    fn search_form(keywords: &str) -> CrawlForm {
        let mut form = CrawlForm::new();
        form.input(FieldId::Platform, "xhs").unwrap();
        form.input(FieldId::CrawlerType, "search").unwrap();
        form.input(FieldId::Keywords, keywords).unwrap();
        form
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_keywords_never_reach_network() {
        let mut h = harness(MockDashboardApi::new());
        let mut form = search_form("");

        let outcome = h.flow.submit(&mut form).await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Invalid(ValidationError::MissingKeywords)
        ));
        assert_eq!(h.api.count(ApiCall::StartTask), 0);
        assert!(h.renderer.busy_history().is_empty());
        assert_eq!(h.flow.state(), SubmitState::Idle);
        assert_eq!(form.focused(), Some(FieldId::Keywords));
        assert_eq!(h.renderer.form_renders(), 1);
        assert_eq!(h.renderer.notices()[0].message, "搜索模式下必须输入关键词！");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_creator_id_never_reaches_network() {
        let mut h = harness(MockDashboardApi::new());
        let mut form = CrawlForm::new();
        form.input(FieldId::Platform, "dy").unwrap();
        form.input(FieldId::CrawlerType, "creator").unwrap();

        let outcome = h.flow.submit(&mut form).await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Invalid(ValidationError::MissingCreatorId)
        ));
        assert_eq!(h.api.count(ApiCall::StartTask), 0);
        assert_eq!(form.focused(), Some(FieldId::CreatorId));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_schedules_single_redirect_after_delay() {
        let mut h = harness(MockDashboardApi::new().with_task_id("task-1"));
        let mut form = search_form("露营");

        let outcome = h.flow.submit(&mut form).await;
        let submitted_at = Instant::now();

        assert!(matches!(outcome, SubmitOutcome::Submitted { ref task_id } if task_id == "task-1"));
        assert_eq!(h.renderer.busy_history(), vec![true, false]);
        assert_eq!(h.flow.state(), SubmitState::Idle);
        assert_eq!(h.flow.last_task_id(), Some("task-1"));
        assert_eq!(h.nav.try_recv(), Err(TryRecvError::Empty));

        let page = h.nav.recv().await;
        assert_eq!(page, Some(Page::Tasks));
        assert_eq!(submitted_at.elapsed(), Duration::from_millis(3_000));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.nav.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_rejection_shows_message_and_returns_idle() {
        let mut h = harness(MockDashboardApi::new().with_rejection(ApiCall::StartTask, "启动任务失败: 磁盘已满"));
        let mut form = search_form("露营");

        let outcome = h.flow.submit(&mut form).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(h.renderer.busy_history(), vec![true, false]);
        let banners = h.renderer.notices();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].message, "启动任务失败: 磁盘已满");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.nav.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_request_times_out_back_to_idle() {
        let mut h = harness(MockDashboardApi::new().with_hang(ApiCall::StartTask));
        h.flow = h.flow.request_timeout(Duration::from_secs(10));
        let mut form = search_form("露营");

        let outcome = h.flow.submit(&mut form).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(ref e) if e.is_transport()));
        assert_eq!(h.flow.state(), SubmitState::Idle);
        assert_eq!(h.renderer.busy_history(), vec![true, false]);
        assert_eq!(h.renderer.notices()[0].message, "网络错误，请检查连接后重试");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submitted_form_is_serialized_from_fields() {
        let mut h = harness(MockDashboardApi::new().with_task_id("task-2"));
        let mut form = search_form("咖啡");
        form.toggle(FieldId::GetComments).unwrap();

        h.flow.submit(&mut form).await;

        let request = h.api.last_request().unwrap();
        assert_eq!(request.keywords, "咖啡");
        assert_eq!(request.crawler_type, "search");
        assert!(request.get_comments);
        assert_eq!(request.creator_id, "");
    }
}
