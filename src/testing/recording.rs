//! 记录型渲染器：把控制器的每次渲染调用记在内存里，供测试断言。
//!
//! 横幅和弹窗按"可叠加"的方式记录（显示即追加，清除即清空），
//! 控制器若忘记先清除旧的，断言中就会看到两条。

use std::sync::Mutex;

use crate::form::CrawlForm;
use crate::view::{FileListing, Modal, Notice, Page, Renderer, TaskRow};

#[derive(Default)]
struct Screen {
    pages: Vec<Page>,
    forms: Vec<CrawlForm>,
    busy: Vec<bool>,
    notices: Vec<Notice>,
    notice_log: Vec<Notice>,
    task_rows: Vec<TaskRow>,
    task_renders: usize,
    modals: Vec<Modal>,
    files: Option<FileListing>,
}

#[derive(Default)]
pub struct RecordingRenderer {
    screen: Mutex<Screen>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&Screen) -> T) -> T {
        f(&self.screen.lock().unwrap())
    }

    /// 导航历史
    pub fn pages(&self) -> Vec<Page> {
        self.with(|s| s.pages.clone())
    }

    /// 最近一次渲染的表单
    pub fn last_form(&self) -> Option<CrawlForm> {
        self.with(|s| s.forms.last().cloned())
    }

    pub fn form_renders(&self) -> usize {
        self.with(|s| s.forms.len())
    }

    /// 每次 `set_submitting` 的参数
    pub fn busy_history(&self) -> Vec<bool> {
        self.with(|s| s.busy.clone())
    }

    /// 当前可见的横幅
    pub fn notices(&self) -> Vec<Notice> {
        self.with(|s| s.notices.clone())
    }

    /// 曾经显示过的全部横幅
    pub fn notice_log(&self) -> Vec<Notice> {
        self.with(|s| s.notice_log.clone())
    }

    /// 当前显示的任务列表
    pub fn task_rows(&self) -> Vec<TaskRow> {
        self.with(|s| s.task_rows.clone())
    }

    pub fn task_renders(&self) -> usize {
        self.with(|s| s.task_renders)
    }

    /// 当前打开的弹窗
    pub fn modals(&self) -> Vec<Modal> {
        self.with(|s| s.modals.clone())
    }

    pub fn file_listing(&self) -> Option<FileListing> {
        self.with(|s| s.files.clone())
    }
}

impl Renderer for RecordingRenderer {
    fn navigate(&self, page: Page) {
        self.screen.lock().unwrap().pages.push(page);
    }

    fn render_form(&self, form: &CrawlForm) {
        self.screen.lock().unwrap().forms.push(form.clone());
    }

    fn set_submitting(&self, busy: bool) {
        self.screen.lock().unwrap().busy.push(busy);
    }

    fn show_notice(&self, notice: &Notice) {
        let mut screen = self.screen.lock().unwrap();
        screen.notices.push(notice.clone());
        screen.notice_log.push(notice.clone());
    }

    fn clear_notice(&self) {
        self.screen.lock().unwrap().notices.clear();
    }

    fn render_tasks(&self, rows: &[TaskRow]) {
        let mut screen = self.screen.lock().unwrap();
        screen.task_rows = rows.to_vec();
        screen.task_renders += 1;
    }

    fn open_modal(&self, modal: &Modal) {
        self.screen.lock().unwrap().modals.push(modal.clone());
    }

    fn close_modal(&self) {
        self.screen.lock().unwrap().modals.clear();
    }

    fn render_files(&self, listing: &FileListing) {
        self.screen.lock().unwrap().files = Some(listing.clone());
    }
}
