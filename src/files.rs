//! 数据文件浏览：进入页面时拉取一次列表（不轮询），按需预览或下载。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::DashboardApi;
use crate::api::types::DataFile;
use crate::error::{DashboardError, Result};
use crate::notify::Notifier;
use crate::view::{FileListing, FileRow, Modal, PreviewView, Renderer};

pub struct DataFileBrowser {
    api: Arc<dyn DashboardApi>,
    renderer: Arc<dyn Renderer>,
    notifier: Notifier,
    files: Vec<DataFile>,
    preview_open: bool,
}

impl DataFileBrowser {
    pub fn new(api: Arc<dyn DashboardApi>, renderer: Arc<dyn Renderer>, notifier: Notifier) -> Self {
        Self {
            api,
            renderer,
            notifier,
            files: Vec::new(),
            preview_open: false,
        }
    }

    /// 最近一次加载的文件列表
    pub fn files(&self) -> &[DataFile] {
        &self.files
    }

    pub async fn load(&mut self) -> Result<()> {
        let files = match self.api.list_files().await {
            Ok(files) => files,
            Err(e) => {
                self.notifier
                    .error(format!("加载文件列表失败: {}", e.user_message()));
                return Err(e);
            }
        };

        let listing = if files.is_empty() {
            FileListing::Empty
        } else {
            FileListing::Rows(
                files
                    .iter()
                    .map(|f| FileRow::from_file(f, self.api.download_url(&f.name)))
                    .collect(),
            )
        };
        self.renderer.render_files(&listing);
        self.files = files;
        Ok(())
    }

    /// 在弹窗中预览文件内容，内容已转义
    pub async fn preview(&mut self, name: &str) -> Result<()> {
        let preview = match self.api.preview_file(name).await {
            Ok(preview) => preview,
            Err(e) => {
                self.notifier.error(format!("预览失败: {}", e.user_message()));
                return Err(e);
            }
        };
        self.close_preview();
        self.renderer
            .open_modal(&Modal::Preview(PreviewView::new(name, &preview)));
        self.preview_open = true;
        Ok(())
    }

    pub fn close_preview(&mut self) {
        if self.preview_open {
            self.preview_open = false;
            self.renderer.close_modal();
        }
    }

    pub fn download_link(&self, name: &str) -> String {
        self.api.download_url(name)
    }

    /// 下载文件并写入 `dir`，返回写入的路径
    pub async fn download_to(&self, name: &str, dir: &Path) -> Result<PathBuf> {
        let target = dir.join(local_file_name(name)?);
        let bytes = match self.api.download_file(name).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %name, error = %e, "Download failed");
                self.notifier.error(format!("下载失败: {}", e.user_message()));
                return Err(e);
            }
        };
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&target, &bytes).await?;
        info!(file = %name, bytes = bytes.len(), path = %target.display(), "📥 File downloaded");
        self.notifier
            .success(format!("已保存到 {}", target.display()));
        Ok(target)
    }
}

/// 只接受单层文件名，拒绝路径穿越
fn local_file_name(name: &str) -> Result<&str> {
    let valid = !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\');
    if valid {
        Ok(name)
    } else {
        Err(DashboardError::Other(format!("非法文件名: {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::FilePreview;
    use crate::testing::{ApiCall, MockDashboardApi, RecordingRenderer};
    use crate::view::format::FileKind;
    use std::time::Duration;

    fn browser(api: MockDashboardApi) -> (DataFileBrowser, Arc<MockDashboardApi>, Arc<RecordingRenderer>) {
        let api = Arc::new(api);
        let renderer = Arc::new(RecordingRenderer::new());
        let notifier = Notifier::new(renderer.clone(), Duration::from_secs(3));
        (
            DataFileBrowser::new(api.clone(), renderer.clone(), notifier),
            api,
            renderer,
        )
    }

    fn file(name: &str, size: u64) -> DataFile {
        DataFile {
            name: name.to_string(),
            size,
            modified_time: 1_700_000_000.0,
        }
    }

    #[tokio::test]
    async fn test_empty_listing_renders_placeholder() {
        let (mut browser, _, renderer) = browser(MockDashboardApi::new().with_files(vec![]));
        browser.load().await.unwrap();
        assert_eq!(renderer.file_listing(), Some(FileListing::Empty));
    }

    #[tokio::test]
    async fn test_rows_carry_icon_size_and_encoded_link() {
        let (mut browser, _, renderer) = browser(MockDashboardApi::new().with_files(vec![
            file("xhs notes.json", 2048),
            file("comments.csv", 0),
        ]));
        browser.load().await.unwrap();

        let Some(FileListing::Rows(rows)) = renderer.file_listing() else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, FileKind::Code);
        assert_eq!(rows[0].size, "2.00 KB");
        assert_eq!(rows[0].download_url, "/download/xhs%20notes.json");
        assert_eq!(rows[1].kind, FileKind::Table);
        assert_eq!(rows[1].size, "0 B");
        assert_eq!(browser.files().len(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_notifies() {
        let (mut browser, _, renderer) =
            browser(MockDashboardApi::new().with_rejection(ApiCall::ListFiles, "目录不可读"));
        assert!(browser.load().await.is_err());
        assert!(renderer.notices()[0].message.contains("目录不可读"));
        assert_eq!(renderer.file_listing(), None);
    }

    #[tokio::test]
    async fn test_preview_escapes_and_replaces_modal() {
        let (mut browser, _, renderer) = browser(
            MockDashboardApi::new()
                .with_preview(FilePreview {
                    content: "{\"a\": 1}".to_string(),
                    file_type: Some("json".to_string()),
                })
                .with_preview(FilePreview {
                    content: "\x1b]0;pwned\x07".to_string(),
                    file_type: None,
                }),
        );

        browser.preview("a.json").await.unwrap();
        browser.preview("b.txt").await.unwrap();

        let modals = renderer.modals();
        assert_eq!(modals.len(), 1);
        let Modal::Preview(view) = &modals[0] else {
            panic!("expected preview modal");
        };
        assert_eq!(view.name, "b.txt");
        assert!(!view.body.contains('\x1b'));
        assert!(!view.body.contains('\x07'));
    }

    #[tokio::test]
    async fn test_download_rejects_path_traversal() {
        let (browser, api, _) = browser(MockDashboardApi::new());
        let dir = std::env::temp_dir();
        assert!(browser.download_to("../etc/passwd", &dir).await.is_err());
        assert_eq!(api.count(ApiCall::Download), 0);
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let (browser, api, _) = browser(MockDashboardApi::new().with_download(b"a,b\n1,2\n".to_vec()));
        let dir = std::env::temp_dir().join(format!("crawl_console_dl_{}", std::process::id()));

        let path = browser.download_to("out.csv", &dir).await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"a,b\n1,2\n");
        assert_eq!(api.count(ApiCall::Download), 1);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
