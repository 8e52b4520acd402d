use axum::http::StatusCode;
use serde::Deserialize;

use crate::{
    config::Config,
    error::AppError,
    utils::{http_date, vws_authorization_header},
};

pub const VWS_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
pub struct UpdateTargetRequest {
    pub id: String,
    #[serde(default)]
    pub metadata: String,
}

// 目标ID会拼进签名路径，只允许字母和数字
pub fn is_valid_target_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// 调用 Vuforia Web Services 更新识别目标的 application_metadata
///
/// 返回 VWS 的状态码和响应体，由调用方原样转发。
pub async fn send_target_metadata(
    client: &reqwest::Client,
    config: &Config,
    target_id: &str,
    metadata_b64: &str,
) -> Result<(StatusCode, String), AppError> {
    let method = "PUT";
    let path = format!("/targets/{}", target_id);
    let body = format!(r#"{{"application_metadata" : "{}"}}"#, metadata_b64);
    let date = http_date();

    let authorization = vws_authorization_header(
        &config.vuforia_access_key,
        &config.vuforia_secret_key,
        method,
        body.as_bytes(),
        VWS_CONTENT_TYPE,
        &date,
        &path,
    )
    .map_err(|e| AppError::Signing(e.to_string()))?;

    let url = format!("{}{}", config.vuforia_base_url.trim_end_matches('/'), path);
    tracing::debug!("updating target metadata: {}", url);

    let response = client
        .put(&url)
        .header("Accept", "application/json")
        .header("Authorization", authorization)
        .header("Content-Type", VWS_CONTENT_TYPE)
        .header("Date", date)
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    Ok((status, text))
}
