//! Mock 后端，用于在不发起真实 HTTP 请求的情况下测试依赖 [`DashboardApi`] 的控制器。
//!
//! # 示例
//!
//! ```rust
//! use crawl_console::api::DashboardApi;
//! use crawl_console::testing::{ApiCall, MockDashboardApi};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let api = MockDashboardApi::new()
//!     .with_stop_ack(Some("停止请求已发送"))
//!     .with_rejection(ApiCall::StopTask, "任务未在运行中");
//!
//! assert!(api.stop_task("a").await.is_ok());
//! assert!(api.stop_task("a").await.is_err());
//! assert_eq!(api.count(ApiCall::StopTask), 2);
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::types::{DataFile, FilePreview, Task, TaskRequest};
use crate::api::{DashboardApi, download_path};
use crate::error::{ApiError, DashboardError, Result};

/// 后端接口，用于按接口分别排队预设响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiCall {
    StartTask,
    ListTasks,
    GetTask,
    StopTask,
    ListFiles,
    Preview,
    Download,
}

enum Reply {
    TaskId(String),
    Tasks(Vec<Task>),
    Task(Task),
    Ack(Option<String>),
    Files(Vec<DataFile>),
    Preview(FilePreview),
    Bytes(Vec<u8>),
    Err(DashboardError),
    /// 永不返回，模拟挂起的请求
    Hang,
    /// 等待一段时间后再给出内层响应
    Delayed(Duration, Box<Reply>),
}

/// 可脚本化的 Mock 后端。
///
/// 每个接口各有一个响应队列，按顺序消费；队列耗尽后返回 `InvalidResponse`，
/// 唯一例外是 `list_tasks`：设置了 [`with_default_tasks`](MockDashboardApi::with_default_tasks)
/// 时会一直返回该列表，便于测试轮询。
#[derive(Default)]
pub struct MockDashboardApi {
    replies: Arc<Mutex<HashMap<ApiCall, VecDeque<Reply>>>>,
    default_tasks: Option<Vec<Task>>,
    /// 按时序记录的调用及其参数
    calls: Arc<Mutex<Vec<(ApiCall, String)>>>,
    requests: Arc<Mutex<Vec<TaskRequest>>>,
}

impl MockDashboardApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, call: ApiCall, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(call)
            .or_default()
            .push_back(reply);
        self
    }

    pub fn with_task_id(self, id: impl Into<String>) -> Self {
        self.push(ApiCall::StartTask, Reply::TaskId(id.into()))
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        self.push(ApiCall::ListTasks, Reply::Tasks(tasks))
    }

    /// 队列耗尽后 `list_tasks` 一直返回的列表
    pub fn with_default_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.default_tasks = Some(tasks);
        self
    }

    pub fn with_task(self, task: Task) -> Self {
        self.push(ApiCall::GetTask, Reply::Task(task))
    }

    pub fn with_stop_ack(self, message: Option<&str>) -> Self {
        self.push(ApiCall::StopTask, Reply::Ack(message.map(str::to_string)))
    }

    pub fn with_files(self, files: Vec<DataFile>) -> Self {
        self.push(ApiCall::ListFiles, Reply::Files(files))
    }

    pub fn with_preview(self, preview: FilePreview) -> Self {
        self.push(ApiCall::Preview, Reply::Preview(preview))
    }

    pub fn with_download(self, bytes: Vec<u8>) -> Self {
        self.push(ApiCall::Download, Reply::Bytes(bytes))
    }

    pub fn with_error(self, call: ApiCall, err: DashboardError) -> Self {
        self.push(call, Reply::Err(err))
    }

    /// 后端返回 `success: false` 及给定消息
    pub fn with_rejection(self, call: ApiCall, message: impl Into<String>) -> Self {
        self.with_error(call, ApiError::Rejected(message.into()).into())
    }

    pub fn with_network_error(self, call: ApiCall) -> Self {
        self.with_error(call, ApiError::Network("connection refused".to_string()).into())
    }

    pub fn with_hang(self, call: ApiCall) -> Self {
        self.push(call, Reply::Hang)
    }

    /// `list_tasks` 在 `delay` 之后才返回
    pub fn with_delayed_tasks(self, delay: Duration, tasks: Vec<Task>) -> Self {
        self.push(
            ApiCall::ListTasks,
            Reply::Delayed(delay, Box::new(Reply::Tasks(tasks))),
        )
    }

    /// 某个接口被调用的次数
    pub fn count(&self, call: ApiCall) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == call)
            .count()
    }

    /// 所有调用及参数（按时序排列）
    pub fn calls(&self) -> Vec<(ApiCall, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// 最近一次提交的任务表单
    pub fn last_request(&self) -> Option<TaskRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// 记录调用并取出下一条预设响应；取出后立即释放锁，挂起时不阻塞其他调用
    async fn next(&self, call: ApiCall, arg: &str) -> Result<Reply> {
        self.calls.lock().unwrap().push((call, arg.to_string()));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&call)
            .and_then(VecDeque::pop_front);

        let reply = match reply {
            Some(Reply::Delayed(delay, inner)) => {
                tokio::time::sleep(delay).await;
                Some(*inner)
            }
            other => other,
        };

        match reply {
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Err(e)) => Err(e),
            Some(reply) => Ok(reply),
            None => match (&self.default_tasks, call) {
                (Some(tasks), ApiCall::ListTasks) => Ok(Reply::Tasks(tasks.clone())),
                _ => Err(unscripted(call)),
            },
        }
    }
}

fn unscripted(call: ApiCall) -> DashboardError {
    ApiError::InvalidResponse(format!("no scripted reply for {:?}", call)).into()
}

#[async_trait]
impl DashboardApi for MockDashboardApi {
    async fn start_task(&self, request: &TaskRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        match self.next(ApiCall::StartTask, &request.platform).await? {
            Reply::TaskId(id) => Ok(id),
            _ => Err(unscripted(ApiCall::StartTask)),
        }
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        match self.next(ApiCall::ListTasks, "").await? {
            Reply::Tasks(tasks) => Ok(tasks),
            _ => Err(unscripted(ApiCall::ListTasks)),
        }
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        match self.next(ApiCall::GetTask, id).await? {
            Reply::Task(task) => Ok(task),
            _ => Err(unscripted(ApiCall::GetTask)),
        }
    }

    async fn stop_task(&self, id: &str) -> Result<Option<String>> {
        match self.next(ApiCall::StopTask, id).await? {
            Reply::Ack(message) => Ok(message),
            _ => Err(unscripted(ApiCall::StopTask)),
        }
    }

    async fn list_files(&self) -> Result<Vec<DataFile>> {
        match self.next(ApiCall::ListFiles, "").await? {
            Reply::Files(files) => Ok(files),
            _ => Err(unscripted(ApiCall::ListFiles)),
        }
    }

    async fn preview_file(&self, name: &str) -> Result<FilePreview> {
        match self.next(ApiCall::Preview, name).await? {
            Reply::Preview(preview) => Ok(preview),
            _ => Err(unscripted(ApiCall::Preview)),
        }
    }

    async fn download_file(&self, name: &str) -> Result<Vec<u8>> {
        match self.next(ApiCall::Download, name).await? {
            Reply::Bytes(bytes) => Ok(bytes),
            _ => Err(unscripted(ApiCall::Download)),
        }
    }

    fn download_url(&self, name: &str) -> String {
        download_path(name)
    }
}
