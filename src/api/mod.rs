mod client;
pub mod types;

use crate::api::client::{read_envelope, read_failure};
use crate::api::types::{
    AckPayload, DataFile, FileListPayload, FilePreview, StartTaskPayload, Task, TaskListPayload,
    TaskPayload, TaskRequest,
};
use crate::config::DashboardConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// 爬虫后端 HTTP API
///
/// 控制台的所有组件只通过这个 trait 访问后端，测试中用
/// [`MockDashboardApi`](crate::testing::MockDashboardApi) 替换。
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `POST /start_task`，返回新任务 ID
    async fn start_task(&self, request: &TaskRequest) -> Result<String>;

    /// `GET /api/tasks`，保持后端给出的顺序
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// `GET /api/tasks/{id}`
    async fn get_task(&self, id: &str) -> Result<Task>;

    /// `POST /api/tasks/{id}/stop`，返回后端的提示信息（若有）
    async fn stop_task(&self, id: &str) -> Result<Option<String>>;

    /// `GET /api/data/files`
    async fn list_files(&self) -> Result<Vec<DataFile>>;

    /// `GET /api/data/preview/{name}`
    async fn preview_file(&self, name: &str) -> Result<FilePreview>;

    /// `GET /download/{name}`，返回文件原始字节
    async fn download_file(&self, name: &str) -> Result<Vec<u8>>;

    /// 文件的直接下载链接
    fn download_url(&self, name: &str) -> String;
}

/// 相对于后端根地址的下载路径，文件名经过百分号编码
pub fn download_path(name: &str) -> String {
    format!("/download/{}", urlencoding::encode(name))
}

/// 基于 reqwest 的默认实现
pub struct HttpDashboardApi {
    client: Client,
    base_url: String,
}

impl HttpDashboardApi {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(method = "GET", url = %url, "API request");
        let response = self.client.get(&url).send().await?;
        read_envelope(response).await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: Option<&[(&'static str, String)]>,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(method = "POST", url = %url, "API request");
        let mut builder = self.client.post(&url);
        if let Some(form) = form {
            builder = builder.form(form);
        }
        let response = builder.send().await?;
        read_envelope(response).await
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn start_task(&self, request: &TaskRequest) -> Result<String> {
        let pairs = request.form_pairs();
        let payload: StartTaskPayload = self.post("/start_task", Some(pairs.as_slice())).await?;
        Ok(payload.task_id)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let payload: TaskListPayload = self.get("/api/tasks").await?;
        Ok(payload.into_tasks())
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        let payload: TaskPayload = self
            .get(&format!("/api/tasks/{}", urlencoding::encode(id)))
            .await?;
        Ok(payload.task)
    }

    async fn stop_task(&self, id: &str) -> Result<Option<String>> {
        let payload: AckPayload = self
            .post(&format!("/api/tasks/{}/stop", urlencoding::encode(id)), None)
            .await?;
        Ok(payload.message)
    }

    async fn list_files(&self) -> Result<Vec<DataFile>> {
        let payload: FileListPayload = self.get("/api/data/files").await?;
        Ok(payload.files)
    }

    async fn preview_file(&self, name: &str) -> Result<FilePreview> {
        self.get(&format!("/api/data/preview/{}", urlencoding::encode(name)))
            .await
    }

    async fn download_file(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.download_url(name);
        debug!(method = "GET", url = %url, "Download request");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn download_url(&self, name: &str) -> String {
        self.url(&download_path(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_path_percent_encodes_name() {
        assert_eq!(
            download_path("xhs search 2024/01.json"),
            "/download/xhs%20search%202024%2F01.json"
        );
    }

    #[test]
    fn test_download_url_joins_base_without_double_slash() {
        let api = HttpDashboardApi::with_client(Client::new(), "http://localhost:5000/");
        assert_eq!(
            api.download_url("a.csv"),
            "http://localhost:5000/download/a.csv"
        );
    }
}
