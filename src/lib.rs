pub mod api;
pub mod config;
pub mod confirm;
pub mod dashboard;
pub mod error;
pub mod files;
pub mod form;
pub mod monitor;
pub mod notify;
pub mod repl;
pub mod submission;
pub mod testing;
pub mod view;

pub mod prelude {
    pub use crate::api::{DashboardApi, HttpDashboardApi};
    pub use crate::config::DashboardConfig;
    pub use crate::dashboard::Dashboard;
    pub use crate::error::{DashboardError, Result};
    pub use crate::form::{CrawlForm, FieldId};
    pub use crate::view::{Page, Renderer};
}
