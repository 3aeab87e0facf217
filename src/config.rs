//! 控制台配置加载
//!
//! 先从 YAML 文件读取（可缺省），再用环境变量覆盖，格式：
//! ```text
//! CRAWL_CONSOLE_BASE_URL=http://localhost:5000
//! CRAWL_CONSOLE_POLL_INTERVAL_MS=5000
//! CRAWL_CONSOLE_NOTICE_TTL_MS=3000
//! CRAWL_CONSOLE_REDIRECT_DELAY_MS=3000
//! CRAWL_CONSOLE_REQUEST_TIMEOUT_SECS=30
//! ```

use crate::error::{ConfigError, Result};
use dotenv::dotenv;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

const ENV_PREFIX: &str = "CRAWL_CONSOLE_";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// 后端根地址（不含结尾的 `/`）
    pub base_url: String,
    /// 任务列表轮询间隔
    pub poll_interval_ms: u64,
    /// 通知横幅自动消失时间
    pub notice_ttl_ms: u64,
    /// 提交成功后跳转到任务列表前的等待时间
    pub redirect_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            poll_interval_ms: 5_000,
            notice_ttl_ms: 3_000,
            redirect_delay_ms: 3_000,
            request_timeout_secs: 30,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|_| ConfigError::FileNotFound(path.to_string()))?;
        let config: DashboardConfig = serde_yaml::from_reader(file)?;
        config.validated()
    }

    /// 读取 `.env` 并应用 `CRAWL_CONSOLE_*` 环境变量
    pub fn apply_env(self) -> Result<Self> {
        dotenv().ok();
        self.apply_vars(std::env::vars())
    }

    /// 用给定的键值对覆盖配置，未知的 `CRAWL_CONSOLE_*` 键会被忽略
    pub fn apply_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        for (key, value) in vars {
            let Some(suffix) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match suffix {
                "BASE_URL" => self.base_url = value,
                "POLL_INTERVAL_MS" => self.poll_interval_ms = parse_number(&key, &value)?,
                "NOTICE_TTL_MS" => self.notice_ttl_ms = parse_number(&key, &value)?,
                "REDIRECT_DELAY_MS" => self.redirect_delay_ms = parse_number(&key, &value)?,
                "REQUEST_TIMEOUT_SECS" => self.request_timeout_secs = parse_number(&key, &value)?,
                _ => {}
            }
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if self.base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms".to_string(),
                message: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|e| {
        ConfigError::InvalidValue {
            field: key.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_match_dashboard_timings() {
        let config = DashboardConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.notice_ttl(), Duration::from_secs(3));
        assert_eq!(config.redirect_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_env_overrides_and_trailing_slash() {
        let config = DashboardConfig::default()
            .apply_vars(vars(&[
                ("CRAWL_CONSOLE_BASE_URL", "http://crawler:8080/"),
                ("CRAWL_CONSOLE_POLL_INTERVAL_MS", "1500"),
                ("PATH", "/usr/bin"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "http://crawler:8080");
        assert_eq!(config.poll_interval_ms, 1500);
    }

    #[test]
    fn test_non_numeric_override_is_rejected() {
        let err = DashboardConfig::default()
            .apply_vars(vars(&[("CRAWL_CONSOLE_NOTICE_TTL_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_yaml_partial_document_uses_defaults() {
        let config: DashboardConfig =
            serde_yaml::from_str("base_url: http://10.0.0.2:5000\nrequest_timeout_secs: 5\n")
                .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.poll_interval_ms, 5_000);
    }

    #[test]
    fn test_zero_poll_interval_is_invalid() {
        assert!(
            DashboardConfig::default()
                .apply_vars(vars(&[("CRAWL_CONSOLE_POLL_INTERVAL_MS", "0")]))
                .is_err()
        );
    }
}
