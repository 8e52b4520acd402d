use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::database::StorageError;
use crate::models::{NearbyPost, PostId};

/// 附近帖子查询的错误
#[derive(Debug, thiserror::Error)]
pub enum NearbyError {
    #[error("radius configuration unavailable: {0}")]
    ConfigUnavailable(String),
    #[error("post snapshot unavailable: {0}")]
    StorageUnavailable(String),
    #[error("post {id} has a missing or malformed location")]
    MalformedLocation { id: PostId },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid query point: {0}")]
    InvalidPoint(String),
    #[error(transparent)]
    Query(#[from] NearbyError),
    #[error("failed to store post: {0}")]
    StorePost(#[from] StorageError),
    #[error("No new metadata passed")]
    MissingMetadata,
    #[error("Invalid target id")]
    InvalidTargetId(String),
    #[error("failed to sign request: {0}")]
    Signing(String),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // 查询失败统一返回 400 和空数组，不区分错误类型
            AppError::InvalidPoint(_) | AppError::Query(_) => {
                (StatusCode::BAD_REQUEST, Json(Vec::<NearbyPost>::new())).into_response()
            }
            AppError::StorePost(_) | AppError::Signing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error").into_response()
            }
            AppError::MissingMetadata => {
                (StatusCode::BAD_REQUEST, "No new metadata passed").into_response()
            }
            AppError::InvalidTargetId(_) => {
                (StatusCode::BAD_REQUEST, "Invalid target id").into_response()
            }
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "Error").into_response(),
        }
    }
}
