use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    error::AppError,
    models::{NearbyPost, NewPost},
    utils::now_millis,
};

use super::model::parse_point;

// 创建帖子，time 由服务端设置
#[axum::debug_handler]
pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<NewPost>,
) -> Result<&'static str, AppError> {
    let post = req.into_post(now_millis());

    match state.store.append_post(&post).await {
        Ok(id) => {
            tracing::debug!("stored post {}", id);
            Ok("Ok")
        }
        Err(err) => {
            tracing::error!("写入帖子失败: {:?}", err);
            Err(err.into())
        }
    }
}

// 获取附近帖子
#[axum::debug_handler]
pub async fn find_nearby_posts(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(String, String)>,
) -> Result<Json<Vec<NearbyPost>>, AppError> {
    let point = parse_point(&lat, &lon).map_err(|msg| {
        tracing::warn!("查询坐标无效: {}", msg);
        AppError::InvalidPoint(msg)
    })?;

    match state.nearby.find_nearby(point).await {
        Ok(posts) => Ok(Json(posts)),
        Err(err) => {
            tracing::error!("查找附近帖子错误: {:?}", err);
            Err(err.into())
        }
    }
}
