use axum::{Json, extract::State, http::StatusCode};

use crate::{AppState, error::AppError, utils::encode_base64};

use super::model::{UpdateTargetRequest, is_valid_target_id, send_target_metadata};

// 更新 Vuforia 识别目标的元数据，metadata 经 base64 编码后提交
#[axum::debug_handler]
pub async fn update_target(
    State(state): State<AppState>,
    Json(req): Json<UpdateTargetRequest>,
) -> Result<(StatusCode, String), AppError> {
    if !is_valid_target_id(&req.id) {
        tracing::warn!("识别目标ID无效: {:?}", req.id);
        return Err(AppError::InvalidTargetId(req.id));
    }

    if req.metadata.is_empty() {
        return Err(AppError::MissingMetadata);
    }

    let new_metadata = encode_base64(req.metadata.as_bytes());
    send_target_metadata(&state.http, &state.config, &req.id, &new_metadata)
        .await
        .inspect_err(|err| tracing::error!("更新识别目标失败: {:?}", err))
}
