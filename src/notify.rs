//! 单槽通知横幅
//!
//! 任意时刻最多显示一条通知：发布新通知前会先移除当前通知并取消它的
//! 自动消失计时器。计时器到期时只有序号仍匹配才会清除，过期计时器
//! 不会误删更新的通知。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::view::{Notice, Renderer, Severity};

#[derive(Default)]
struct Slot {
    seq: u64,
    current: Option<Notice>,
    dismiss: Option<JoinHandle<()>>,
}

/// 通知横幅控制器，克隆后共享同一个槽位
#[derive(Clone)]
pub struct Notifier {
    renderer: Arc<dyn Renderer>,
    ttl: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl Notifier {
    pub fn new(renderer: Arc<dyn Renderer>, ttl: Duration) -> Self {
        Self {
            renderer,
            ttl,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// 发布通知，必须在 tokio 运行时中调用
    pub fn post(&self, severity: Severity, message: impl Into<String>) -> u64 {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = slot.dismiss.take() {
            timer.abort();
        }
        if slot.current.take().is_some() {
            self.renderer.clear_notice();
        }

        slot.seq += 1;
        let notice = Notice {
            id: slot.seq,
            severity,
            message: message.into(),
        };
        self.renderer.show_notice(&notice);
        let id = notice.id;
        slot.current = Some(notice);

        let renderer = Arc::clone(&self.renderer);
        let shared = Arc::clone(&self.slot);
        let ttl = self.ttl;
        slot.dismiss = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut slot = shared.lock().unwrap_or_else(|e| e.into_inner());
            if slot.seq == id && slot.current.take().is_some() {
                renderer.clear_notice();
                slot.dismiss = None;
                debug!(notice = id, "Notice auto-dismissed");
            }
        }));
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.post(Severity::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.post(Severity::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.post(Severity::Warning, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.post(Severity::Info, message)
    }

    /// 当前显示的通知
    pub fn current(&self) -> Option<Notice> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .clone()
    }

    /// 移除当前通知并取消计时器
    pub fn dismiss(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = slot.dismiss.take() {
            timer.abort();
        }
        if slot.current.take().is_some() {
            self.renderer.clear_notice();
        }
    }
}
