//! 任务监控
//!
//! 进入任务列表页时立即拉取一次，之后按固定间隔轮询，离开页面时停止。
//! 轮询计时器由 [`TaskMonitor`] 持有，`stop()` 之后不会再有任何请求发出。
//!
//! 后台轮询失败只记录日志、不弹通知，避免瞬时网络抖动导致横幅闪烁；
//! 用户主动触发的刷新、详情和停止操作失败时才会通知。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::DashboardApi;
use crate::api::types::Task;
use crate::confirm::Confirmer;
use crate::error::Result;
use crate::notify::Notifier;
use crate::view::{Modal, Renderer, TaskDetail, TaskRow};

/// 停止操作的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// 用户取消了确认，没有发起请求
    Declined,
    Stopped,
    /// 后端拒绝或网络失败，附带展示给用户的原因
    Failed(String),
}

struct Poller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct TaskMonitor {
    api: Arc<dyn DashboardApi>,
    renderer: Arc<dyn Renderer>,
    notifier: Notifier,
    confirmer: Arc<dyn Confirmer>,
    interval: Duration,
    poller: Option<Poller>,
    /// 当前打开的详情弹窗对应的任务
    open_detail: Option<String>,
}

impl TaskMonitor {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        renderer: Arc<dyn Renderer>,
        notifier: Notifier,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            api,
            renderer,
            notifier,
            confirmer,
            interval: Duration::from_secs(5),
            poller: None,
            open_detail: None,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// 启动轮询：立即拉取一次，之后每个间隔拉取一次。已在轮询时先停止旧的。
    pub fn start(&mut self) {
        self.stop();

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let api = Arc::clone(&self.api);
        let renderer = Arc::clone(&self.renderer);
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let fetched = tokio::select! {
                            _ = token.cancelled() => break,
                            fetched = api.list_tasks() => fetched,
                        };
                        // stop() 与请求完成可能同时发生，已取消就不再渲染
                        if token.is_cancelled() {
                            break;
                        }
                        match fetched {
                            Ok(tasks) => render_list(renderer.as_ref(), &tasks),
                            Err(e) => warn!(error = %e, "Task list poll failed"),
                        }
                    }
                }
            }
            debug!("Task poller exited");
        });

        info!(interval_ms = period.as_millis() as u64, "Task poller started");
        self.poller = Some(Poller { cancel, handle });
    }

    /// 停止轮询，正在进行的请求也会被丢弃
    pub fn stop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel.cancel();
            poller.handle.abort();
            info!("Task poller stopped");
        }
    }

    /// 手动刷新，失败时通知用户
    pub async fn refresh(&self) -> Result<()> {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                render_list(self.renderer.as_ref(), &tasks);
                Ok(())
            }
            Err(e) => {
                self.notifier.error(format!("获取任务列表失败: {}", e.user_message()));
                Err(e)
            }
        }
    }

    /// 打开任务详情弹窗，已有弹窗会先被关闭
    pub async fn show_detail(&mut self, id: &str) -> Result<()> {
        let task = match self.api.get_task(id).await {
            Ok(task) => task,
            Err(e) => {
                self.notifier.error(format!("获取任务详情失败: {}", e.user_message()));
                return Err(e);
            }
        };

        let api = Arc::clone(&self.api);
        let detail = TaskDetail::from_task(&task, |name| api.download_url(name));
        self.close_detail();
        self.renderer.open_modal(&Modal::TaskDetail(detail));
        self.open_detail = Some(task.id);
        Ok(())
    }

    pub fn close_detail(&mut self) {
        if self.open_detail.take().is_some() {
            self.renderer.close_modal();
        }
    }

    pub fn open_detail(&self) -> Option<&str> {
        self.open_detail.as_deref()
    }

    /// 停止任务：先征得用户确认，成功后关闭详情弹窗；正在轮询时立即刷新列表
    pub async fn stop_task(&mut self, id: &str) -> Result<StopOutcome> {
        let prompt = format!("确定要停止任务 {} 吗？", id);
        if !self.confirmer.confirm(&prompt).await? {
            debug!(task_id = %id, "Stop declined");
            return Ok(StopOutcome::Declined);
        }

        match self.api.stop_task(id).await {
            Ok(message) => {
                info!(task_id = %id, "⏹ Task stop requested");
                self.notifier
                    .success(message.unwrap_or_else(|| "停止请求已发送".to_string()));
                self.close_detail();
                if self.is_polling() {
                    // 列表刷新失败已在 refresh 中通知
                    let _ = self.refresh().await;
                }
                Ok(StopOutcome::Stopped)
            }
            Err(e) => {
                let reason = e.user_message();
                warn!(task_id = %id, error = %e, "Task stop failed");
                self.notifier.error(format!("停止任务失败: {}", reason));
                Ok(StopOutcome::Failed(reason))
            }
        }
    }
}

impl Drop for TaskMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 整体替换列表，顺序与后端一致
fn render_list(renderer: &dyn Renderer, tasks: &[Task]) {
    let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from_task).collect();
    renderer.render_tasks(&rows);
}
