use crate::error::{ApiError, DashboardError, Result};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

const DEFAULT_FAILURE_MESSAGE: &str = "操作失败";

/// 读取响应体并按 `{success, message, ...}` 约定解码
pub(crate) async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status().as_u16();
    let text = response.text().await?;
    debug!(status, bytes = text.len(), "Received API response");
    decode_body(status, &text)
}

/// 把非 2xx 的响应转换成错误，保留后端给出的 `message`
pub(crate) async fn read_failure(response: Response) -> DashboardError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    match decode_body::<Value>(status, &text) {
        Err(e) => e,
        Ok(_) => ApiError::Http {
            status,
            message: format!("HTTP {}", status),
        }
        .into(),
    }
}

/// 不依赖网络的解码逻辑：缺少 `success: true` 一律视为失败
pub(crate) fn decode_body<T: DeserializeOwned>(status: u16, text: &str) -> Result<T> {
    let body: Value = match serde_json::from_str(text) {
        Ok(body) => body,
        Err(e) if (200..300).contains(&status) => {
            return Err(ApiError::InvalidResponse(e.to_string()).into());
        }
        Err(_) => {
            let message = if text.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                text.trim().to_string()
            };
            return Err(ApiError::Http { status, message }.into());
        }
    };

    let success = body.get("success").and_then(Value::as_bool) == Some(true);
    if !success {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_FAILURE_MESSAGE)
            .to_string();
        return Err(ApiError::Rejected(message).into());
    }

    Ok(serde_json::from_value(body)?)
}
